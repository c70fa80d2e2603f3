use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
    mpsc,
};
use std::time::Duration;

use crate::{
    assets::{
        decode::decode_frame,
        descriptor::SequenceDescriptor,
        source::FrameSource,
        store::{DecodeError, FrameSlot, FrameStore},
    },
    foundation::core::FrameIndex,
    foundation::error::{ScrollSeqError, ScrollSeqResult},
};

/// Aggregate load progress for one sequence.
///
/// Failed frames count toward `loaded_count` exactly like decoded ones.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct LoadProgress {
    pub loaded_count: u32,
    pub total: u32,
    /// `floor(loaded_count / total * 100)`; 100 for an empty sequence.
    pub percent: u8,
    pub is_complete: bool,
}

impl LoadProgress {
    pub fn new(loaded_count: u32, total: u32) -> Self {
        let loaded_count = loaded_count.min(total);
        let percent = if total == 0 {
            100
        } else {
            ((u64::from(loaded_count) * 100) / u64::from(total)) as u8
        };
        Self {
            loaded_count,
            total,
            percent,
            is_complete: loaded_count == total,
        }
    }

    pub fn started(total: u32) -> Self {
        Self::new(0, total)
    }
}

/// Events emitted by a running preload, in order.
///
/// Every stream ends with exactly one [`LoadEvent::Resolved`], preceded by the
/// progress event that has `is_complete == true`.
#[derive(Debug)]
pub enum LoadEvent {
    Progress(LoadProgress),
    Resolved(FrameStore),
}

/// Preload tuning.
#[derive(Clone, Debug, Default)]
pub struct PreloadOpts {
    /// Maximum number of frames fetched and decoded at once.
    ///
    /// `None` uses one worker per available core.
    pub max_in_flight: Option<usize>,
}

/// Shared cancellation flag between a [`PreloadTask`] and its workers.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Handle to a running preload.
///
/// Dropping the handle cancels the load: queued fetches are skipped and results that
/// arrive afterwards are discarded without emitting events.
pub struct PreloadTask {
    total: u32,
    events: mpsc::Receiver<LoadEvent>,
    cancel: CancelToken,
    coordinator: Option<std::thread::JoinHandle<()>>,
}

impl std::fmt::Debug for PreloadTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreloadTask")
            .field("total", &self.total)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish()
    }
}

impl PreloadTask {
    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Next event if one is ready. Never yields anything once cancelled.
    pub fn try_next(&self) -> Option<LoadEvent> {
        if self.cancel.is_cancelled() {
            return None;
        }
        self.events.try_recv().ok()
    }

    /// Block until the next event; `None` once the stream ended or was cancelled.
    pub fn recv(&self) -> Option<LoadEvent> {
        if self.cancel.is_cancelled() {
            return None;
        }
        let ev = self.events.recv().ok()?;
        (!self.cancel.is_cancelled()).then_some(ev)
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<LoadEvent> {
        if self.cancel.is_cancelled() {
            return None;
        }
        let ev = self.events.recv_timeout(timeout).ok()?;
        (!self.cancel.is_cancelled()).then_some(ev)
    }

    /// Drain the stream, calling `on_progress` for each update, and return the store.
    pub fn wait_with(
        mut self,
        mut on_progress: impl FnMut(LoadProgress),
    ) -> ScrollSeqResult<FrameStore> {
        while let Some(ev) = self.recv() {
            match ev {
                LoadEvent::Progress(p) => on_progress(p),
                LoadEvent::Resolved(store) => {
                    if let Some(h) = self.coordinator.take() {
                        h.join()
                            .map_err(|_| ScrollSeqError::load("preload coordinator panicked"))?;
                    }
                    return Ok(store);
                }
            }
        }
        Err(ScrollSeqError::load(
            "preload ended without resolving (cancelled)",
        ))
    }

    pub fn wait(self) -> ScrollSeqResult<FrameStore> {
        self.wait_with(|_| {})
    }
}

impl Iterator for PreloadTask {
    type Item = LoadEvent;

    fn next(&mut self) -> Option<Self::Item> {
        self.recv()
    }
}

impl Drop for PreloadTask {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Start loading every frame of `descriptor` from `source`.
///
/// Fetch+decode runs on a dedicated worker pool bounded by `opts.max_in_flight`. A failed
/// frame never aborts the batch; its slot holds a [`DecodeError`] and it still counts toward
/// progress. A descriptor with zero frames resolves immediately with an empty store.
#[tracing::instrument(skip(source, opts), fields(folder = descriptor.folder(), frames = descriptor.frame_count()))]
pub fn preload(
    descriptor: &SequenceDescriptor,
    source: Arc<dyn FrameSource>,
    opts: &PreloadOpts,
) -> ScrollSeqResult<PreloadTask> {
    let total = descriptor.frame_count();
    let cancel = CancelToken::new();
    let (tx, rx) = mpsc::channel::<LoadEvent>();

    if total == 0 {
        let _ = tx.send(LoadEvent::Progress(LoadProgress::new(0, 0)));
        let _ = tx.send(LoadEvent::Resolved(FrameStore::empty()));
        return Ok(PreloadTask {
            total,
            events: rx,
            cancel,
            coordinator: None,
        });
    }

    let pool = build_worker_pool(opts.max_in_flight)?;
    let descriptor = descriptor.clone();
    let worker_cancel = cancel.clone();

    let coordinator = std::thread::Builder::new()
        .name("scrollseq-preload".to_string())
        .spawn(move || run_coordinator(pool, descriptor, source, worker_cancel, tx))
        .map_err(|e| ScrollSeqError::load(format!("spawn preload coordinator: {e}")))?;

    Ok(PreloadTask {
        total,
        events: rx,
        cancel,
        coordinator: Some(coordinator),
    })
}

fn build_worker_pool(max_in_flight: Option<usize>) -> ScrollSeqResult<rayon::ThreadPool> {
    if let Some(n) = max_in_flight
        && n == 0
    {
        return Err(ScrollSeqError::validation(
            "preload 'max_in_flight' must be >= 1 when set",
        ));
    }

    let mut builder =
        rayon::ThreadPoolBuilder::new().thread_name(|i| format!("scrollseq-decode-{i}"));
    if let Some(n) = max_in_flight {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| ScrollSeqError::load(format!("failed to build preload worker pool: {e}")))
}

fn run_coordinator(
    pool: rayon::ThreadPool,
    descriptor: SequenceDescriptor,
    source: Arc<dyn FrameSource>,
    cancel: CancelToken,
    events: mpsc::Sender<LoadEvent>,
) {
    let total = descriptor.frame_count();
    let (res_tx, res_rx) = mpsc::channel::<(FrameIndex, FrameSlot)>();

    for index in descriptor.indices() {
        let res_tx = res_tx.clone();
        let source = Arc::clone(&source);
        let cancel = cancel.clone();
        let path = descriptor.path_for(index);
        pool.spawn(move || {
            let slot = load_one(source.as_ref(), &path, &cancel);
            // Receiver is gone when the load was cancelled.
            let _ = res_tx.send((index, slot));
        });
    }
    drop(res_tx);

    let mut slots: Vec<Option<FrameSlot>> = (0..total).map(|_| None).collect();
    let mut loaded = 0u32;

    for (index, slot) in res_rx.iter() {
        if cancel.is_cancelled() {
            tracing::debug!(loaded, total, "preload cancelled; discarding late results");
            return;
        }
        if let Err(e) = &slot {
            tracing::debug!(index = index.0, error = %e, "frame unavailable");
        }
        slots[index.0 as usize] = Some(slot);
        loaded += 1;
        if events
            .send(LoadEvent::Progress(LoadProgress::new(loaded, total)))
            .is_err()
        {
            return;
        }
        if loaded == total {
            break;
        }
    }

    if loaded != total || cancel.is_cancelled() {
        return;
    }

    let store = FrameStore::from_slots(
        slots
            .into_iter()
            .zip(descriptor.indices())
            .map(|(slot, index)| {
                slot.unwrap_or_else(|| {
                    Err(DecodeError::Cancelled {
                        path: descriptor.path_for(index),
                    })
                })
            })
            .collect(),
    );

    let missing = store.missing_count();
    if store.all_missing() {
        tracing::warn!(
            folder = descriptor.folder(),
            total,
            "no frame of the sequence could be loaded; playback will stay blank"
        );
    } else {
        tracing::info!(total, missing, "sequence preloaded");
    }
    let _ = events.send(LoadEvent::Resolved(store));
}

fn load_one(source: &dyn FrameSource, path: &str, cancel: &CancelToken) -> FrameSlot {
    if cancel.is_cancelled() {
        return Err(DecodeError::Cancelled {
            path: path.to_string(),
        });
    }
    let bytes = source.fetch(path).map_err(|e| DecodeError::Fetch {
        path: path.to_string(),
        reason: format!("{e:#}"),
    })?;
    decode_frame(path, &bytes)
}

#[cfg(test)]
#[path = "../../tests/unit/preload/orchestrator.rs"]
mod tests;
