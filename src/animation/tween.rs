use std::time::Duration;

use crate::animation::ease::Ease;

/// A scalar animating from `from` to `to` over `duration`.
///
/// Time is supplied by the caller (seconds on any monotonic clock), so sampling is pure.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tween {
    pub from: f64,
    pub to: f64,
    pub start_s: f64,
    pub duration: Duration,
    pub ease: Ease,
}

impl Tween {
    pub fn new(from: f64, to: f64, start_s: f64, duration: Duration, ease: Ease) -> Self {
        Self {
            from,
            to,
            start_s,
            duration,
            ease,
        }
    }

    pub fn sample(&self, now_s: f64) -> f64 {
        let d = self.duration.as_secs_f64();
        if d <= 0.0 {
            return self.to;
        }
        let t = ((now_s - self.start_s) / d).clamp(0.0, 1.0);
        self.from + (self.to - self.from) * self.ease.apply(t)
    }

    pub fn is_finished(&self, now_s: f64) -> bool {
        now_s - self.start_s >= self.duration.as_secs_f64()
    }
}

/// A value that is always either at rest or tweening toward its latest target.
///
/// Retargeting restarts from the currently displayed value, so reversing direction mid-tween
/// never jumps.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Animated {
    value: f64,
    tween: Option<Tween>,
}

impl Animated {
    pub fn new(value: f64) -> Self {
        Self { value, tween: None }
    }

    pub fn value_at(&self, now_s: f64) -> f64 {
        self.tween.map(|t| t.sample(now_s)).unwrap_or(self.value)
    }

    pub fn target(&self) -> f64 {
        self.tween.map(|t| t.to).unwrap_or(self.value)
    }

    /// Start tweening to `to`. A repeated identical target keeps the running tween.
    pub fn retarget(&mut self, to: f64, now_s: f64, duration: Duration, ease: Ease) {
        if self.target() == to {
            return;
        }
        let from = self.value_at(now_s);
        self.value = from;
        self.tween = Some(Tween::new(from, to, now_s, duration, ease));
    }

    /// Advance to `now_s`, settling finished tweens. Returns the current value.
    pub fn tick(&mut self, now_s: f64) -> f64 {
        if let Some(t) = self.tween {
            self.value = t.sample(now_s);
            if t.is_finished(now_s) {
                self.value = t.to;
                self.tween = None;
            }
        }
        self.value
    }

    pub fn is_animating(&self) -> bool {
        self.tween.is_some()
    }

    /// Drop any running tween, freezing at the last settled value.
    pub fn cancel(&mut self) {
        self.tween = None;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/tween.rs"]
mod tests;
