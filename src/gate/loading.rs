use std::time::Duration;

use crate::{
    assets::store::FrameStore,
    foundation::error::{ScrollSeqError, ScrollSeqResult},
    preload::orchestrator::{LoadEvent, LoadProgress, PreloadTask},
    render::indicator::IndicatorView,
};

/// Whether playback may be presented yet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateState {
    /// Frames are still arriving; show the indicator.
    Loading(LoadProgress),
    /// The preload resolved (possibly with missing frames).
    Open,
    /// The gate was closed before the preload resolved.
    Closed,
}

/// Holds presentation back until a preload resolves.
///
/// "Resolved" means every frame was attempted; missing frames do not keep the gate shut.
#[derive(Debug)]
pub struct LoadingGate {
    task: Option<PreloadTask>,
    state: GateState,
}

impl LoadingGate {
    pub fn new(task: PreloadTask) -> Self {
        let state = GateState::Loading(LoadProgress::started(task.total()));
        Self {
            task: Some(task),
            state,
        }
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == GateState::Open
    }

    pub fn progress(&self) -> Option<LoadProgress> {
        match self.state {
            GateState::Loading(p) => Some(p),
            _ => None,
        }
    }

    /// Indicator to show while loading; `None` once open or closed.
    pub fn indicator(&self) -> Option<IndicatorView> {
        self.progress().map(|p| IndicatorView::from_progress(&p))
    }

    /// Apply ready preload events without blocking.
    ///
    /// Returns the store exactly once, on the call that opens the gate.
    pub fn poll(&mut self) -> Option<FrameStore> {
        loop {
            let ev = self.task.as_ref()?.try_next()?;
            if let Some(store) = self.apply(ev) {
                return Some(store);
            }
        }
    }

    /// Block until the gate opens, waiting at most `timeout` per event.
    pub fn wait_open(&mut self, timeout: Duration) -> ScrollSeqResult<FrameStore> {
        loop {
            let task = self
                .task
                .as_ref()
                .ok_or_else(|| ScrollSeqError::load("loading gate is not waiting on a preload"))?;
            let ev = task.recv_timeout(timeout).ok_or_else(|| {
                ScrollSeqError::load(format!(
                    "no preload progress within {} ms",
                    timeout.as_millis()
                ))
            })?;
            if let Some(store) = self.apply(ev) {
                return Ok(store);
            }
        }
    }

    /// Cancel a pending preload. Later events are ignored.
    pub fn close(&mut self) {
        if let Some(task) = self.task.take() {
            task.cancel();
        }
        if self.state != GateState::Open {
            self.state = GateState::Closed;
        }
    }

    fn apply(&mut self, ev: LoadEvent) -> Option<FrameStore> {
        match ev {
            LoadEvent::Progress(p) => {
                if let GateState::Loading(prev) = self.state
                    && p.loaded_count >= prev.loaded_count
                {
                    self.state = GateState::Loading(p);
                }
                None
            }
            LoadEvent::Resolved(store) => {
                self.task = None;
                self.state = GateState::Open;
                tracing::debug!(
                    frames = store.len(),
                    missing = store.missing_count(),
                    "loading gate opened"
                );
                Some(store)
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/gate/loading.rs"]
mod tests;
