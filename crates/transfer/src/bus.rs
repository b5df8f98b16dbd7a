//! Process-wide event bus shared by every upload.
//!
//! Listeners register for one [`EventKind`] and receive every event of that
//! kind, whatever upload it belongs to. Filtering by [`UploadId`] is the
//! listener's job.
//!
//! [`UploadId`]: tuskit_protocol::UploadId

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, Weak};

use tracing::{trace, warn};
use tuskit_protocol::{EngineEvent, EventKind};

/// Callback invoked for every event of the kind it was registered for.
pub type Listener = Arc<dyn Fn(&EngineEvent) + Send + Sync>;

struct Registration {
    id: u64,
    kind: EventKind,
    listener: Listener,
}

#[derive(Default)]
struct BusInner {
    next_id: AtomicU64,
    listeners: RwLock<Vec<Registration>>,
}

impl BusInner {
    fn remove(&self, id: u64) -> bool {
        let mut listeners = self
            .listeners
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let before = listeners.len();
        listeners.retain(|r| r.id != id);
        listeners.len() != before
    }
}

/// Handle to the shared event bus. Clones refer to the same bus.
#[derive(Clone, Default)]
pub struct EventBus {
    inner: Arc<BusInner>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.total_listeners())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `listener` for events of `kind`.
    ///
    /// The listener stays registered until the returned [`Subscription`]
    /// is removed or dropped.
    pub fn add_listener<F>(&self, kind: EventKind, listener: F) -> Subscription
    where
        F: Fn(&EngineEvent) + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner
            .listeners
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(Registration {
                id,
                kind,
                listener: Arc::new(listener),
            });
        trace!(listener = id, kind = kind.name(), "listener added");
        Subscription {
            id,
            kind,
            bus: Arc::downgrade(&self.inner),
        }
    }

    /// Delivers `event` to every listener of its kind and returns how many ran.
    ///
    /// Listeners run outside the registry lock, so they may add or remove
    /// subscriptions (including their own) while being dispatched.
    pub fn emit(&self, event: &EngineEvent) -> usize {
        let kind = event.kind();
        let targets: Vec<Listener> = {
            let listeners = self
                .inner
                .listeners
                .read()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            listeners
                .iter()
                .filter(|r| r.kind == kind)
                .map(|r| Arc::clone(&r.listener))
                .collect()
        };
        trace!(
            kind = kind.name(),
            upload_id = %event.upload_id(),
            listeners = targets.len(),
            "emitting event"
        );
        for listener in &targets {
            listener(event);
        }
        targets.len()
    }

    /// Decodes one bridge frame and emits it.
    ///
    /// Malformed frames are logged and dropped; they never reach listeners.
    pub fn emit_json(&self, frame: &str) -> usize {
        match serde_json::from_str::<EngineEvent>(frame) {
            Ok(event) => self.emit(&event),
            Err(e) => {
                warn!("dropping malformed engine event: {e}");
                0
            }
        }
    }

    /// Number of live listeners registered for `kind`.
    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.inner
            .listeners
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .filter(|r| r.kind == kind)
            .count()
    }

    fn total_listeners(&self) -> usize {
        self.inner
            .listeners
            .read()
            .map(|l| l.len())
            .unwrap_or_default()
    }
}

/// A live listener registration. Removing it twice is harmless.
pub struct Subscription {
    id: u64,
    kind: EventKind,
    bus: Weak<BusInner>,
}

impl Subscription {
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// Unregisters the listener. Returns `false` if it was already gone.
    pub fn remove(&self) -> bool {
        match self.bus.upgrade() {
            Some(bus) => {
                let removed = bus.remove(self.id);
                if removed {
                    trace!(listener = self.id, kind = self.kind.name(), "listener removed");
                }
                removed
            }
            None => false,
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.remove();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .finish()
    }
}
