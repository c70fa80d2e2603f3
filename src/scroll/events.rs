use std::sync::{Arc, Mutex, MutexGuard, Weak, mpsc};

use crate::foundation::core::Viewport;

/// Input the host window reports.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ViewportEvent {
    /// Document scrolled to `offset_y` pixels from the top.
    Scroll { offset_y: f64 },
    /// Viewport changed size.
    Resize(Viewport),
}

struct HubState {
    next_id: u64,
    listeners: Vec<(u64, mpsc::Sender<ViewportEvent>)>,
    scroll_y: f64,
    viewport: Viewport,
}

/// Window-level scroll/resize source.
///
/// Listeners are explicit [`Subscription`] handles; dropping a handle unregisters it, so no
/// observer outlives the component that created it.
#[derive(Clone)]
pub struct ViewportEvents {
    state: Arc<Mutex<HubState>>,
}

impl std::fmt::Debug for ViewportEvents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let st = lock(&self.state);
        f.debug_struct("ViewportEvents")
            .field("listeners", &st.listeners.len())
            .field("scroll_y", &st.scroll_y)
            .field("viewport", &st.viewport)
            .finish()
    }
}

impl ViewportEvents {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            state: Arc::new(Mutex::new(HubState {
                next_id: 0,
                listeners: Vec::new(),
                scroll_y: 0.0,
                viewport,
            })),
        }
    }

    pub fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::channel();
        let mut st = lock(&self.state);
        let id = st.next_id;
        st.next_id += 1;
        st.listeners.push((id, tx));
        tracing::trace!(id, listeners = st.listeners.len(), "viewport listener added");
        Subscription {
            id,
            hub: Arc::downgrade(&self.state),
            rx,
        }
    }

    /// Scroll the document; negative offsets clamp to 0.
    pub fn scroll_to(&self, offset_y: f64) {
        let offset_y = if offset_y.is_finite() {
            offset_y.max(0.0)
        } else {
            0.0
        };
        let mut st = lock(&self.state);
        st.scroll_y = offset_y;
        dispatch(&mut st, ViewportEvent::Scroll { offset_y });
    }

    pub fn scroll_by(&self, delta_y: f64) {
        let y = self.scroll_y() + delta_y;
        self.scroll_to(y);
    }

    pub fn resize(&self, viewport: Viewport) {
        let mut st = lock(&self.state);
        st.viewport = viewport;
        dispatch(&mut st, ViewportEvent::Resize(viewport));
    }

    pub fn scroll_y(&self) -> f64 {
        lock(&self.state).scroll_y
    }

    pub fn viewport(&self) -> Viewport {
        lock(&self.state).viewport
    }

    pub fn listener_count(&self) -> usize {
        lock(&self.state).listeners.len()
    }
}

fn dispatch(st: &mut HubState, ev: ViewportEvent) {
    st.listeners.retain(|(_, tx)| tx.send(ev).is_ok());
}

fn lock(state: &Mutex<HubState>) -> MutexGuard<'_, HubState> {
    state.lock().unwrap_or_else(|e| e.into_inner())
}

/// Registered scroll/resize observation. Unregisters on drop.
pub struct Subscription {
    id: u64,
    hub: Weak<Mutex<HubState>>,
    rx: mpsc::Receiver<ViewportEvent>,
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

impl Subscription {
    /// Events received since the last call, oldest first.
    pub fn drain(&self) -> Vec<ViewportEvent> {
        self.rx.try_iter().collect()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(state) = self.hub.upgrade() {
            let mut st = lock(&state);
            st.listeners.retain(|(id, _)| *id != self.id);
            tracing::trace!(
                id = self.id,
                listeners = st.listeners.len(),
                "viewport listener removed"
            );
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scroll/events.rs"]
mod tests;
