//! Scroll-synchronized image-sequence playback.
//!
//! A sequence is a folder of numbered frames (`1.webp ..= N.webp`). Scrolling through a
//! pinned container scrubs through the frames; near the end of the range the sequence
//! collapses, a black overlay fades in and a call-to-action appears.
//!
//! # Pipeline overview
//!
//! 1. **Preload**: [`preload`] fetches and decodes every frame on a bounded worker pool,
//!    streaming [`LoadProgress`] and resolving to a [`FrameStore`] (missing frames are gaps).
//! 2. **Gate**: [`LoadingGate`] shows an [`IndicatorView`] until the preload resolves.
//! 3. **Scroll**: [`ScrollProgressSource`] turns [`ViewportEvents`] into unbounded progress.
//! 4. **Composite**: [`FrameCompositor`] cover-fits the selected frame onto a CPU surface,
//!    holding the previous frame when the requested one is missing.
//! 5. **Transition**: [`visual_state`] derives phase and overlay targets, which
//!    [`OverlayDriver`] tweens into host elements.
//!
//! [`ScrollSequence`] ties the stages together the way a host page would mount them.
//!
//! Pixels are premultiplied RGBA8 end-to-end and `unsafe` is forbidden in this crate.
#![forbid(unsafe_code)]

mod animation;
mod assets;
mod config;
mod foundation;
mod gate;
mod player;
mod preload;
mod render;
mod scroll;
mod transition;

pub use animation::ease::Ease;
pub use animation::tween::{Animated, Tween};
pub use assets::decode::{MAX_FRAME_DIM, decode_frame};
pub use assets::descriptor::SequenceDescriptor;
pub use assets::source::{DirFrameSource, FrameSource, MemoryFrameSource, normalize_site_path};
pub use assets::store::{DecodeError, Frame, FrameSlot, FrameStore};
pub use config::length::CssLength;
pub use config::props::ScrollImageProps;
pub use foundation::core::{Affine, FrameIndex, Rect, Rgba8Premul, Vec2, Viewport};
pub use foundation::error::{ScrollSeqError, ScrollSeqResult};
pub use foundation::math::clamp01;
pub use gate::loading::{GateState, LoadingGate};
pub use player::scroll_sequence::{
    HostBindings, PlaybackFrame, Presentation, ScrollSequence, ScrollSequenceOpts,
};
pub use preload::orchestrator::{
    CancelToken, LoadEvent, LoadProgress, PreloadOpts, PreloadTask, preload,
};
pub use render::compositor::{
    DrawOutcome, FrameCompositor, PAINT_CACHE_CAPACITY, Placement, cover_fit,
    frame_index_for_progress,
};
pub use render::flatten::{apply_black_overlay, flatten_onto_black, write_png};
pub use render::indicator::IndicatorView;
pub use scroll::events::{Subscription, ViewportEvent, ViewportEvents};
pub use scroll::progress::{
    DEFAULT_PIXELS_PER_FRAME, FixedLayout, LayoutProbe, PinGeometry, ScrollProgress,
    ScrollProgressSource, ScrollSpan,
};
pub use transition::driver::{
    AppliedVisuals, OverlayDriver, SharedVisual, TransitionTimings, VisualProps, VisualTarget,
};
pub use transition::state::{
    BUTTON_HIDDEN_OFFSET_PX, BUTTON_THRESHOLD, COLLAPSE_LEN, COLLAPSE_START, OVERLAY_REVEAL_AT,
    Phase, VisualState, button_props, collapse_fraction, overlay_opacity, phase_for, visual_state,
};
