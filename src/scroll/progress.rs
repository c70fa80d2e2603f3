use crate::{
    config::length::CssLength,
    foundation::core::Viewport,
    scroll::events::{Subscription, ViewportEvent, ViewportEvents},
};

/// Scroll distance each frame gets in the reference layout.
pub const DEFAULT_PIXELS_PER_FRAME: f64 = 20.0;

/// Reports where the pinned container sits in the document.
pub trait LayoutProbe {
    /// Document offset of the container's top edge, or `None` before layout.
    fn container_top(&self, viewport: Viewport) -> Option<f64>;
}

/// Container at a fixed document offset (or not laid out at all).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FixedLayout(pub Option<f64>);

impl LayoutProbe for FixedLayout {
    fn container_top(&self, _viewport: Viewport) -> Option<f64> {
        self.0
    }
}

impl<F> LayoutProbe for F
where
    F: Fn(Viewport) -> Option<f64>,
{
    fn container_top(&self, viewport: Viewport) -> Option<f64> {
        self(viewport)
    }
}

/// How long the container stays pinned.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ScrollSpan {
    /// `frame_count * px` of scroll travel.
    PerFrame(f64),
    /// A CSS length resolved against the current viewport.
    Length(CssLength),
}

impl Default for ScrollSpan {
    fn default() -> Self {
        Self::PerFrame(DEFAULT_PIXELS_PER_FRAME)
    }
}

impl ScrollSpan {
    pub fn resolve(self, frame_count: u32, viewport: Viewport) -> f64 {
        let px = match self {
            Self::PerFrame(px) => f64::from(frame_count) * px,
            Self::Length(len) => len.resolve(viewport),
        };
        if px.is_finite() { px.max(0.0) } else { 0.0 }
    }
}

/// Latest scroll position mapped into the pinned range.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct ScrollProgress {
    /// Distance scrolled into the pinned range over its length. May exceed 1 past the end.
    pub progress: f64,
    pub raw_scroll_offset: i64,
}

impl ScrollProgress {
    pub fn zero() -> Self {
        Self {
            progress: 0.0,
            raw_scroll_offset: 0,
        }
    }

    pub fn clamped(self) -> f64 {
        crate::foundation::math::clamp01(self.progress)
    }
}

/// Resolved pinned range in document pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PinGeometry {
    pub start: f64,
    pub span: f64,
}

impl PinGeometry {
    /// Progress at `scroll_y`: 0 before the start, unbounded above.
    pub fn progress_at(self, scroll_y: f64) -> f64 {
        let into = scroll_y - self.start;
        if self.span <= 0.0 {
            return if into >= 0.0 { 1.0 } else { 0.0 };
        }
        (into / self.span).max(0.0)
    }

    pub fn end(self) -> f64 {
        self.start + self.span
    }
}

/// Turns window scroll/resize into progress through a pinned container.
///
/// Owns its [`Subscription`]; dropping the source releases the window listener.
pub struct ScrollProgressSource {
    subscription: Subscription,
    layout: Box<dyn LayoutProbe>,
    frame_count: u32,
    span: ScrollSpan,
    viewport: Viewport,
    scroll_y: f64,
    geometry: Option<PinGeometry>,
    current: ScrollProgress,
}

impl std::fmt::Debug for ScrollProgressSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrollProgressSource")
            .field("frame_count", &self.frame_count)
            .field("span", &self.span)
            .field("viewport", &self.viewport)
            .field("geometry", &self.geometry)
            .field("current", &self.current)
            .finish()
    }
}

impl ScrollProgressSource {
    pub fn attach(
        events: &ViewportEvents,
        layout: Box<dyn LayoutProbe>,
        frame_count: u32,
        span: ScrollSpan,
    ) -> Self {
        let subscription = events.subscribe();
        let mut out = Self {
            subscription,
            layout,
            frame_count,
            span,
            viewport: events.viewport(),
            scroll_y: events.scroll_y(),
            geometry: None,
            current: ScrollProgress::zero(),
        };
        out.measure();
        out.recompute();
        out
    }

    /// Apply pending window events. Returns the new progress if anything arrived.
    ///
    /// Bursts of scroll events collapse to the last one; a resize re-measures the pinned range.
    pub fn poll(&mut self) -> Option<ScrollProgress> {
        let events = self.subscription.drain();
        if events.is_empty() {
            return None;
        }
        let mut resized = false;
        for ev in events {
            match ev {
                ViewportEvent::Scroll { offset_y } => self.scroll_y = offset_y,
                ViewportEvent::Resize(vp) => {
                    self.viewport = vp;
                    resized = true;
                }
            }
        }
        if resized {
            self.measure();
        }
        self.recompute();
        tracing::trace!(progress = self.current.progress, "scroll progress");
        Some(self.current)
    }

    /// Re-read container geometry, e.g. after the host changed layout.
    pub fn measure(&mut self) {
        self.geometry = self.layout.container_top(self.viewport).map(|start| PinGeometry {
            start,
            span: self.span.resolve(self.frame_count, self.viewport),
        });
        if self.geometry.is_none() {
            tracing::debug!("pinned container not laid out; progress held at 0");
        }
    }

    fn recompute(&mut self) {
        let progress = self
            .geometry
            .map(|g| g.progress_at(self.scroll_y))
            .unwrap_or(0.0);
        self.current = ScrollProgress {
            progress,
            raw_scroll_offset: self.scroll_y.round() as i64,
        };
    }

    pub fn progress(&self) -> ScrollProgress {
        self.current
    }

    pub fn geometry(&self) -> Option<PinGeometry> {
        self.geometry
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// True while the scroll position is inside the pinned range.
    pub fn is_pinned(&self) -> bool {
        self.geometry
            .is_some_and(|g| self.scroll_y >= g.start && self.scroll_y <= g.end())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scroll/progress.rs"]
mod tests;
