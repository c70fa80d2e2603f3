use std::sync::Arc;
use std::time::Duration;

use crate::{
    assets::{descriptor::SequenceDescriptor, source::FrameSource, store::FrameStore},
    config::{length::CssLength, props::ScrollImageProps},
    foundation::error::ScrollSeqResult,
    gate::loading::LoadingGate,
    preload::orchestrator::{PreloadOpts, preload},
    render::{
        compositor::{DrawOutcome, FrameCompositor},
        indicator::IndicatorView,
    },
    scroll::{
        events::ViewportEvents,
        progress::{LayoutProbe, ScrollProgress, ScrollProgressSource, ScrollSpan},
    },
    transition::{
        driver::{AppliedVisuals, OverlayDriver, TransitionTimings, VisualProps, VisualTarget},
        state::{VisualState, visual_state},
    },
};

/// Tunables for a mounted sequence.
#[derive(Clone, Debug)]
pub struct ScrollSequenceOpts {
    pub preload: PreloadOpts,
    /// File extension of the frames.
    pub extension: String,
    pub span: ScrollSpan,
    pub timings: TransitionTimings,
}

impl Default for ScrollSequenceOpts {
    fn default() -> Self {
        Self {
            preload: PreloadOpts::default(),
            extension: "webp".to_string(),
            span: ScrollSpan::default(),
            timings: TransitionTimings::default(),
        }
    }
}

/// What the host page supplies to a mounted sequence.
pub struct HostBindings {
    pub events: ViewportEvents,
    pub layout: Box<dyn LayoutProbe>,
    pub overlay: Box<dyn VisualTarget>,
    pub button: Box<dyn VisualTarget>,
}

/// One playback update.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlaybackFrame {
    pub progress: ScrollProgress,
    pub state: VisualState,
    pub draw: DrawOutcome,
    pub visuals: AppliedVisuals,
}

/// What the sequence presents after a tick.
#[derive(Clone, Debug, PartialEq)]
pub enum Presentation {
    Loading(IndicatorView),
    Playing(PlaybackFrame),
    Unmounted,
}

struct Pending {
    layout: Box<dyn LayoutProbe>,
    overlay: Box<dyn VisualTarget>,
    button: Box<dyn VisualTarget>,
}

struct Playback {
    store: FrameStore,
    compositor: FrameCompositor,
    scroll: ScrollProgressSource,
    driver: OverlayDriver,
}

/// A mounted scroll-driven image sequence.
///
/// Mounting starts the preload behind a [`LoadingGate`]. Once the gate opens, the scroll
/// listener, compositor and overlay driver are attached and every [`tick`](Self::tick)
/// maps the latest scroll position to a frame and overlay state. Dropping the sequence
/// cancels the preload, stops tweens and releases the scroll listener.
pub struct ScrollSequence {
    props: ScrollImageProps,
    descriptor: SequenceDescriptor,
    container_height: CssLength,
    opts: ScrollSequenceOpts,
    events: ViewportEvents,
    gate: LoadingGate,
    pending: Option<Pending>,
    loaded: Option<FrameStore>,
    playback: Option<Playback>,
    unmounted: bool,
}

impl std::fmt::Debug for ScrollSequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrollSequence")
            .field("descriptor", &self.descriptor)
            .field("gate", &self.gate.state())
            .field("awaiting_surface", &self.loaded.is_some())
            .field("playing", &self.playback.is_some())
            .field("unmounted", &self.unmounted)
            .finish()
    }
}

impl ScrollSequence {
    #[tracing::instrument(skip_all, fields(folder = %props.image_folder, frames = props.total_frames))]
    pub fn mount(
        props: ScrollImageProps,
        source: Arc<dyn FrameSource>,
        host: HostBindings,
        opts: ScrollSequenceOpts,
    ) -> ScrollSeqResult<Self> {
        props.validate()?;
        let container_height = props.container_height_length()?;
        let descriptor = props.descriptor(&opts.extension);
        let task = preload(&descriptor, source, &opts.preload)?;

        Ok(Self {
            props,
            descriptor,
            container_height,
            opts,
            events: host.events,
            gate: LoadingGate::new(task),
            pending: Some(Pending {
                layout: host.layout,
                overlay: host.overlay,
                button: host.button,
            }),
            loaded: None,
            playback: None,
            unmounted: false,
        })
    }

    pub fn props(&self) -> &ScrollImageProps {
        &self.props
    }

    pub fn descriptor(&self) -> &SequenceDescriptor {
        &self.descriptor
    }

    pub fn gate(&self) -> &LoadingGate {
        &self.gate
    }

    pub fn is_playing(&self) -> bool {
        self.playback.is_some()
    }

    /// Laid-out height of the pinned container for the current viewport.
    pub fn container_height_px(&self) -> f64 {
        self.container_height.resolve(self.events.viewport())
    }

    pub fn store(&self) -> Option<&FrameStore> {
        self.playback
            .as_ref()
            .map(|p| &p.store)
            .or(self.loaded.as_ref())
    }

    pub fn compositor(&self) -> Option<&FrameCompositor> {
        self.playback.as_ref().map(|p| &p.compositor)
    }

    pub fn scroll(&self) -> Option<&ScrollProgressSource> {
        self.playback.as_ref().map(|p| &p.scroll)
    }

    /// Block until the preload resolves and playback is attached.
    pub fn wait_loaded(&mut self, per_event_timeout: Duration) -> ScrollSeqResult<()> {
        if self.playback.is_some() || self.unmounted {
            return Ok(());
        }
        if self.loaded.is_none() {
            self.loaded = Some(self.gate.wait_open(per_event_timeout)?);
        }
        self.attach()
    }

    /// Advance one animation frame at `now_s` seconds.
    pub fn tick(&mut self, now_s: f64) -> ScrollSeqResult<Presentation> {
        if self.unmounted {
            return Ok(Presentation::Unmounted);
        }
        if self.playback.is_none() {
            if self.loaded.is_none() {
                match self.gate.poll() {
                    Some(store) => self.loaded = Some(store),
                    None => {
                        return Ok(match self.gate.indicator() {
                            Some(view) => Presentation::Loading(view),
                            None => Presentation::Unmounted,
                        });
                    }
                }
            }
            self.attach()?;
        }

        let frame_count = self.descriptor.frame_count();
        let Some(pb) = self.playback.as_mut() else {
            return Ok(Presentation::Unmounted);
        };

        pb.scroll.poll();
        pb.compositor.resize(pb.scroll.viewport())?;

        let progress = pb.scroll.progress();
        let state = visual_state(progress.progress, frame_count);
        let draw = match state.frame_index {
            Some(index) => pb.compositor.draw_index(&pb.store, index)?,
            None => DrawOutcome::Empty,
        };
        pb.driver.set_target(&state, now_s);
        let visuals = pb.driver.tick(now_s).unwrap_or(AppliedVisuals {
            overlay: VisualProps::HIDDEN,
            button: VisualProps::HIDDEN,
        });

        Ok(Presentation::Playing(PlaybackFrame {
            progress,
            state,
            draw,
            visuals,
        }))
    }

    /// Tear down: cancel loading, stop tweens, release the scroll listener and frames.
    pub fn unmount(&mut self) {
        if self.unmounted {
            return;
        }
        self.unmounted = true;
        self.gate.close();
        self.pending = None;
        self.loaded = None;
        if let Some(mut pb) = self.playback.take() {
            pb.driver.detach();
            pb.compositor.release();
        }
        tracing::debug!(folder = self.descriptor.folder(), "scroll sequence unmounted");
    }

    /// Wire playback once frames are loaded. A failure leaves the store and host
    /// bindings in place so the next tick can retry.
    fn attach(&mut self) -> ScrollSeqResult<()> {
        if self.pending.is_none() || self.loaded.is_none() {
            return Ok(());
        }
        let compositor = FrameCompositor::new(self.events.viewport())?;
        let (Some(pending), Some(store)) = (self.pending.take(), self.loaded.take()) else {
            return Ok(());
        };
        let scroll = ScrollProgressSource::attach(
            &self.events,
            pending.layout,
            self.descriptor.frame_count(),
            self.opts.span,
        );
        let driver = OverlayDriver::new(pending.overlay, pending.button, self.opts.timings);
        self.playback = Some(Playback {
            store,
            compositor,
            scroll,
            driver,
        });
        Ok(())
    }
}

impl Drop for ScrollSequence {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/player/scroll_sequence.rs"]
mod tests;
