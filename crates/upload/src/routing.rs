//! Event subscription and demultiplexing.
//!
//! The engine's bus carries the events of every upload in the process. Each
//! session registers one listener per [`EventKind`]; every listener drops
//! events whose tag is not the session's own identifier before touching any
//! state.

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, info, warn};
use tuskit_protocol::{
    EngineEvent, ErrorPayload, EventKind, ProgressPayload, SuccessPayload, UploadId,
};
use tuskit_transfer::{EventBus, Subscription};

use crate::error::UploadError;
use crate::options::{Callbacks, UploadConfig};
use crate::state::{UploadProgress, UploadState};

/// Locks `m`, recovering the data if a callback panicked while holding it.
pub(crate) fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// State shared between a session and its bus listeners.
pub(crate) struct Shared {
    pub(crate) config: UploadConfig,
    pub(crate) callbacks: Callbacks,
    pub(crate) state: Mutex<UploadState>,
    pub(crate) progress: Mutex<UploadProgress>,
    subscriptions: Mutex<Vec<Subscription>>,
}

impl Shared {
    pub(crate) fn new(config: UploadConfig, callbacks: Callbacks) -> Self {
        Self {
            config,
            callbacks,
            state: Mutex::new(UploadState::Unstarted),
            progress: Mutex::new(UploadProgress::default()),
            subscriptions: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn is_subscribed(&self) -> bool {
        !lock(&self.subscriptions).is_empty()
    }

    /// Registers the success, error and progress listeners for `id`.
    ///
    /// Does nothing if this session already holds its listeners.
    pub(crate) fn subscribe(self: &Arc<Self>, bus: &EventBus, id: &UploadId) {
        let mut subscriptions = lock(&self.subscriptions);
        if !subscriptions.is_empty() {
            return;
        }
        for kind in EventKind::ALL {
            // Weak: the bus must not keep a dropped session alive.
            let shared = Arc::downgrade(self);
            let own_id = id.clone();
            subscriptions.push(bus.add_listener(kind, move |event| {
                if event.upload_id() != &own_id {
                    return;
                }
                if let Some(shared) = shared.upgrade() {
                    shared.route(event);
                }
            }));
        }
        debug!(upload_id = %id, "subscribed to engine events");
    }

    /// Releases every listener this session registered. Safe to call repeatedly.
    pub(crate) fn unsubscribe(&self) {
        let released: Vec<Subscription> = lock(&self.subscriptions).drain(..).collect();
        if released.is_empty() {
            return;
        }
        for subscription in &released {
            subscription.remove();
        }
        debug!(listeners = released.len(), "unsubscribed from engine events");
    }

    fn route(&self, event: &EngineEvent) {
        match event {
            EngineEvent::Success(payload) => self.on_success(payload),
            EngineEvent::Progress(payload) => self.on_progress(payload),
            EngineEvent::Error(payload) => self.on_transfer_error(payload),
        }
    }

    fn on_success(&self, payload: &SuccessPayload) {
        {
            let mut state = lock(&self.state);
            if state.is_succeeded() {
                debug!(upload_id = %payload.upload_id, "duplicate success event ignored");
                return;
            }
            *state = UploadState::Succeeded {
                id: payload.upload_id.clone(),
                url: payload.upload_url.clone(),
            };
        }
        info!(upload_id = %payload.upload_id, url = %payload.upload_url, "upload finished");
        if let Some(on_success) = &self.callbacks.on_success {
            on_success();
        }
        self.unsubscribe();
    }

    fn on_progress(&self, payload: &ProgressPayload) {
        *lock(&self.progress) = UploadProgress {
            bytes_uploaded: payload.bytes_written,
            bytes_total: payload.bytes_total,
        };
        if let Some(on_progress) = &self.callbacks.on_progress {
            on_progress(payload.bytes_written, payload.bytes_total);
        }
    }

    fn on_transfer_error(&self, payload: &ErrorPayload) {
        let error = UploadError::Transfer(payload.error.clone());
        warn!(upload_id = %payload.upload_id, error = %payload.error, "transfer failed");
        self.record_failure(&error);
        // No caller is waiting on a bus event, so there is nothing to return to.
        if let Err(error) = self.deliver_error(error) {
            warn!(
                upload_id = %payload.upload_id,
                "no error handler configured, dropping transfer error: {error}"
            );
        }
    }

    /// Moves the upload to `Failed`, keeping its identifier. Success is final.
    pub(crate) fn record_failure(&self, error: &UploadError) {
        let mut state = lock(&self.state);
        if state.is_succeeded() {
            return;
        }
        let id = state.upload_id().cloned();
        *state = UploadState::Failed {
            id,
            error: error.to_string(),
        };
    }

    /// Hands `error` to the configured handler, or back to the caller if there is none.
    pub(crate) fn deliver_error(&self, error: UploadError) -> Result<(), UploadError> {
        match &self.callbacks.on_error {
            Some(on_error) => {
                on_error(error);
                Ok(())
            }
            None => Err(error),
        }
    }

    /// Records the failure, then delivers it.
    pub(crate) fn fail(&self, error: UploadError) -> Result<(), UploadError> {
        self.record_failure(&error);
        self.deliver_error(error)
    }
}
