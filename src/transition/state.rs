//! Progress -> visual properties for the scroll-out transition.
//!
//! Everything here is a pure function of scroll progress, so scrolling back up replays the
//! same values in reverse.

use crate::{
    foundation::{core::FrameIndex, math::clamp01},
    render::compositor::frame_index_for_progress,
};

/// Progress at which frame playback starts handing over to the overlay.
pub const COLLAPSE_START: f64 = 0.5;
/// Progress length of the collapse.
pub const COLLAPSE_LEN: f64 = 0.3;
/// Collapse fraction after which the overlay starts fading in.
pub const OVERLAY_REVEAL_AT: f64 = 0.7;
/// Progress strictly above which the call-to-action is shown.
pub const BUTTON_THRESHOLD: f64 = 0.9;
/// Downward offset of the hidden call-to-action, in pixels.
pub const BUTTON_HIDDEN_OFFSET_PX: f64 = 50.0;

/// Coarse label for where in the transition a progress value falls.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum Phase {
    /// `[0, 0.5]`: frames only.
    Playing,
    /// `(0.5, 0.8]`: host fading, overlay starting to show.
    Collapsing,
    /// `(0.8, 0.9]`: overlay fully shown while frames keep following progress.
    OverlayRevealed,
    /// `(0.9, 1]`: call-to-action visible.
    CallToAction,
    /// `> 1`: container unpinned; end state held.
    Released,
}

/// Target visual properties for one progress value.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct VisualState {
    pub phase: Phase,
    /// Frame to draw; `None` for an empty sequence.
    pub frame_index: Option<FrameIndex>,
    /// Opacity hosts may apply to the frame surface (1 while playing, 0 once collapsed).
    pub host_fade: f64,
    pub overlay_opacity: f64,
    pub button_opacity: f64,
    pub button_offset_y: f64,
}

impl VisualState {
    pub fn button_visible(&self) -> bool {
        self.button_opacity > 0.0
    }
}

pub fn phase_for(progress: f64) -> Phase {
    let p = sanitize(progress);
    if p > 1.0 {
        Phase::Released
    } else if p > BUTTON_THRESHOLD {
        Phase::CallToAction
    } else if p > COLLAPSE_START + COLLAPSE_LEN {
        Phase::OverlayRevealed
    } else if p > COLLAPSE_START {
        Phase::Collapsing
    } else {
        Phase::Playing
    }
}

/// Fraction of the collapse completed at `progress`, in `[0, 1]`.
pub fn collapse_fraction(progress: f64) -> f64 {
    clamp01((sanitize(progress) - COLLAPSE_START) / COLLAPSE_LEN)
}

pub fn overlay_opacity(progress: f64) -> f64 {
    if sanitize(progress) > 1.0 {
        return 1.0;
    }
    clamp01((collapse_fraction(progress) - OVERLAY_REVEAL_AT) / (1.0 - OVERLAY_REVEAL_AT))
}

/// Call-to-action `(opacity, offset_y)`. A hard switch at [`BUTTON_THRESHOLD`].
pub fn button_props(progress: f64) -> (f64, f64) {
    if sanitize(progress) > BUTTON_THRESHOLD {
        (1.0, 0.0)
    } else {
        (0.0, BUTTON_HIDDEN_OFFSET_PX)
    }
}

pub fn visual_state(progress: f64, frame_count: u32) -> VisualState {
    let p = sanitize(progress);
    let (button_opacity, button_offset_y) = button_props(p);
    VisualState {
        phase: phase_for(p),
        frame_index: frame_index_for_progress(p, frame_count),
        host_fade: 1.0 - collapse_fraction(p),
        overlay_opacity: overlay_opacity(p),
        button_opacity,
        button_offset_y,
    }
}

fn sanitize(progress: f64) -> f64 {
    if progress.is_nan() {
        0.0
    } else {
        progress.max(0.0)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/transition/state.rs"]
mod tests;
