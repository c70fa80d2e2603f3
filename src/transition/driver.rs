use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::{
    animation::{ease::Ease, tween::Animated},
    transition::state::{BUTTON_HIDDEN_OFFSET_PX, VisualState},
};

/// Style properties written into a host element.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct VisualProps {
    pub opacity: f64,
    pub offset_y: f64,
}

impl VisualProps {
    pub const HIDDEN: Self = Self {
        opacity: 0.0,
        offset_y: 0.0,
    };
}

impl Default for VisualProps {
    fn default() -> Self {
        Self::HIDDEN
    }
}

/// Host element the transition writes into (overlay, call-to-action).
pub trait VisualTarget {
    fn apply(&mut self, props: VisualProps);
}

/// Shareable target that just remembers the last applied props.
#[derive(Clone, Debug, Default)]
pub struct SharedVisual(Arc<Mutex<VisualProps>>);

impl SharedVisual {
    pub fn new(initial: VisualProps) -> Self {
        Self(Arc::new(Mutex::new(initial)))
    }

    pub fn get(&self) -> VisualProps {
        *self.0.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl VisualTarget for SharedVisual {
    fn apply(&mut self, props: VisualProps) {
        *self.0.lock().unwrap_or_else(|e| e.into_inner()) = props;
    }
}

/// Tween durations and curves used when chasing a new visual target.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransitionTimings {
    pub overlay: Duration,
    pub overlay_ease: Ease,
    pub button: Duration,
    pub button_ease: Ease,
}

impl Default for TransitionTimings {
    fn default() -> Self {
        Self {
            overlay: Duration::from_millis(100),
            overlay_ease: Ease::OutQuad,
            button: Duration::from_millis(300),
            button_ease: Ease::OutQuad,
        }
    }
}

impl TransitionTimings {
    /// No smoothing: targets apply on the next tick.
    pub fn immediate() -> Self {
        Self {
            overlay: Duration::ZERO,
            button: Duration::ZERO,
            ..Self::default()
        }
    }
}

/// Values last written to the host elements.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct AppliedVisuals {
    pub overlay: VisualProps,
    pub button: VisualProps,
}

/// Smooths derived [`VisualState`] targets into the overlay and call-to-action elements.
pub struct OverlayDriver {
    timings: TransitionTimings,
    overlay_opacity: Animated,
    button_opacity: Animated,
    button_offset: Animated,
    overlay: Box<dyn VisualTarget>,
    button: Box<dyn VisualTarget>,
    detached: bool,
}

impl std::fmt::Debug for OverlayDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlayDriver")
            .field("timings", &self.timings)
            .field("overlay_opacity", &self.overlay_opacity)
            .field("button_opacity", &self.button_opacity)
            .field("button_offset", &self.button_offset)
            .field("detached", &self.detached)
            .finish()
    }
}

impl OverlayDriver {
    pub fn new(
        overlay: Box<dyn VisualTarget>,
        button: Box<dyn VisualTarget>,
        timings: TransitionTimings,
    ) -> Self {
        let mut out = Self {
            timings,
            overlay_opacity: Animated::new(0.0),
            button_opacity: Animated::new(0.0),
            button_offset: Animated::new(BUTTON_HIDDEN_OFFSET_PX),
            overlay,
            button,
            detached: false,
        };
        out.write(out.current(0.0));
        out
    }

    /// Retarget toward `state`. No-op once detached.
    pub fn set_target(&mut self, state: &VisualState, now_s: f64) {
        if self.detached {
            return;
        }
        let t = self.timings;
        self.overlay_opacity
            .retarget(state.overlay_opacity, now_s, t.overlay, t.overlay_ease);
        self.button_opacity
            .retarget(state.button_opacity, now_s, t.button, t.button_ease);
        self.button_offset
            .retarget(state.button_offset_y, now_s, t.button, t.button_ease);
    }

    /// Advance tweens to `now_s` and write the result into the host elements.
    pub fn tick(&mut self, now_s: f64) -> Option<AppliedVisuals> {
        if self.detached {
            return None;
        }
        self.overlay_opacity.tick(now_s);
        self.button_opacity.tick(now_s);
        self.button_offset.tick(now_s);
        let applied = self.current(now_s);
        self.write(applied);
        Some(applied)
    }

    pub fn is_settled(&self) -> bool {
        !(self.overlay_opacity.is_animating()
            || self.button_opacity.is_animating()
            || self.button_offset.is_animating())
    }

    /// Stop all tweens and stop writing to the host elements.
    pub fn detach(&mut self) {
        self.overlay_opacity.cancel();
        self.button_opacity.cancel();
        self.button_offset.cancel();
        self.detached = true;
    }

    pub fn is_detached(&self) -> bool {
        self.detached
    }

    fn current(&self, now_s: f64) -> AppliedVisuals {
        AppliedVisuals {
            overlay: VisualProps {
                opacity: self.overlay_opacity.value_at(now_s),
                offset_y: 0.0,
            },
            button: VisualProps {
                opacity: self.button_opacity.value_at(now_s),
                offset_y: self.button_offset.value_at(now_s),
            },
        }
    }

    fn write(&mut self, v: AppliedVisuals) {
        self.overlay.apply(v.overlay);
        self.button.apply(v.button);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/transition/driver.rs"]
mod tests;
