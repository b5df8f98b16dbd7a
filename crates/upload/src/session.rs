//! The per-upload state machine.
//!
//! An [`UploadSession`] creates its upload on the engine the first time it is
//! started, resumes it on every later start, and routes the engine's events
//! for its own identifier to the caller's callbacks.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};
use tuskit_protocol::{UploadId, UploadSettings};
use tuskit_transfer::{EventBus, TransferEngine};

use crate::error::UploadError;
use crate::options::UploadOptions;
use crate::routing::{Shared, lock};
use crate::state::{UploadProgress, UploadState};
use crate::validation::validate_start;

/// What `start` has to do, decided atomically against the current state.
enum StartPlan {
    Create,
    Resume(UploadId),
}

/// Puts a `start` or `resume` whose future was dropped before the engine
/// answered back into a state `start` can retry from.
///
/// An abandoned creation returns to the state it started from. An abandoned
/// resumption keeps its identifier and becomes `Paused`.
struct StartGuard<'a> {
    shared: &'a Shared,
    before: Option<UploadState>,
}

impl<'a> StartGuard<'a> {
    fn new(shared: &'a Shared, before: UploadState) -> Self {
        Self {
            shared,
            before: Some(before),
        }
    }

    fn disarm(mut self) {
        self.before = None;
    }
}

impl Drop for StartGuard<'_> {
    fn drop(&mut self) {
        let Some(before) = self.before.take() else {
            return;
        };
        let mut state = lock(&self.shared.state);
        let next = match &*state {
            UploadState::Creating => before,
            UploadState::Resuming { id } => UploadState::Paused { id: id.clone() },
            // Already settled by an engine event or an abort.
            _ => return,
        };
        debug!(from = ?*state, to = ?next, "start cancelled before the engine answered");
        *state = next;
    }
}

/// One resumable upload.
///
/// Commands complete as soon as the engine acknowledges them; the transfer
/// itself runs inside the engine and reports back through the callbacks in
/// [`UploadOptions`].
///
/// Every command returns `Ok(())` when an error handler is configured, since
/// the handler receives the error instead. Without one, the error is returned.
pub struct UploadSession {
    file: Option<PathBuf>,
    engine: Arc<dyn TransferEngine>,
    bus: EventBus,
    shared: Arc<Shared>,
}

impl UploadSession {
    /// Creates a session for `file`. Nothing is validated until [`start`](Self::start).
    pub fn new(
        file: Option<impl Into<PathBuf>>,
        options: UploadOptions,
        engine: Arc<dyn TransferEngine>,
    ) -> Self {
        let bus = engine.events();
        Self {
            file: file.map(Into::into),
            engine,
            bus,
            shared: Arc::new(Shared::new(options.config, options.callbacks)),
        }
    }

    /// Starts the upload, or resumes it if the engine already knows it.
    ///
    /// The first call creates the upload and subscribes to its events before
    /// resuming. Later calls (after an abort or an error) skip creation.
    pub async fn start(&self) -> Result<(), UploadError> {
        let (file, settings) = match validate_start(self.file.as_deref(), &self.shared.config) {
            Ok(checked) => checked,
            Err(e) => {
                warn!(error = %e, "upload not started");
                return self.shared.fail(e);
            }
        };

        let (plan, before) = {
            let mut state = lock(&self.shared.state);
            if state.is_starting() {
                debug!("start ignored: upload is already starting");
                return Ok(());
            }
            let before = state.clone();
            let plan = match state.upload_id().cloned() {
                Some(id) => {
                    *state = UploadState::Resuming { id: id.clone() };
                    StartPlan::Resume(id)
                }
                None => {
                    *state = UploadState::Creating;
                    StartPlan::Create
                }
            };
            (plan, before)
        };
        let guard = StartGuard::new(&self.shared, before);

        let id = match plan {
            StartPlan::Resume(id) => {
                self.shared.subscribe(&self.bus, &id);
                id
            }
            StartPlan::Create => match self.create_upload(file, &settings).await {
                Ok(id) => id,
                Err(e) => {
                    guard.disarm();
                    return self.shared.fail(e);
                }
            },
        };

        let result = self.resume_upload(id).await;
        guard.disarm();
        result
    }

    /// Resumes an upload that was already created.
    ///
    /// Returns [`UploadError::NotCreated`] if the engine never assigned an
    /// identifier; that is a usage error and never reaches the error handler.
    pub async fn resume(&self) -> Result<(), UploadError> {
        let (id, before) = {
            let mut state = lock(&self.shared.state);
            let id = state.upload_id().cloned().ok_or(UploadError::NotCreated)?;
            let before = std::mem::replace(&mut *state, UploadState::Resuming { id: id.clone() });
            (id, before)
        };
        let guard = StartGuard::new(&self.shared, before);
        self.shared.subscribe(&self.bus, &id);
        let result = self.resume_upload(id).await;
        guard.disarm();
        result
    }

    /// Halts the transfer. The upload keeps its identifier and its
    /// subscriptions, so [`start`](Self::start) picks it up again.
    ///
    /// Does nothing if the upload was never created.
    pub async fn abort(&self) -> Result<(), UploadError> {
        let Some(id) = self.upload_id() else {
            debug!("abort ignored: upload not created");
            return Ok(());
        };

        debug!(upload_id = %id, "aborting upload");
        match self.engine.abort(&id).await {
            Ok(()) => {
                let mut state = lock(&self.shared.state);
                if matches!(
                    *state,
                    UploadState::Resuming { .. } | UploadState::Active { .. }
                ) {
                    *state = UploadState::Paused { id };
                }
                Ok(())
            }
            Err(e) => {
                warn!(upload_id = %id, error = %e, "engine failed to abort upload");
                self.shared.deliver_error(UploadError::Abort(e))
            }
        }
    }

    /// Identifier assigned by the engine, once the upload has been created.
    pub fn upload_id(&self) -> Option<UploadId> {
        lock(&self.shared.state).upload_id().cloned()
    }

    /// URL of the uploaded resource, set once the upload succeeded.
    pub fn result_url(&self) -> Option<String> {
        lock(&self.shared.state).result_url().map(String::from)
    }

    pub fn state(&self) -> UploadState {
        lock(&self.shared.state).clone()
    }

    /// Last progress reported by the engine.
    pub fn progress(&self) -> UploadProgress {
        *lock(&self.shared.progress)
    }

    /// `true` while this session is listening for its engine events.
    pub fn is_subscribed(&self) -> bool {
        self.shared.is_subscribed()
    }

    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    async fn create_upload(
        &self,
        file: &Path,
        settings: &UploadSettings,
    ) -> Result<UploadId, UploadError> {
        debug!(file = %file.display(), endpoint = %settings.endpoint, "creating upload");
        let ack = self.engine.create_upload(file, settings).await;
        match ack.into_result() {
            Ok(id) => {
                debug!(upload_id = %id, "upload created");
                *lock(&self.shared.state) = UploadState::Resuming { id: id.clone() };
                self.shared.subscribe(&self.bus, &id);
                Ok(id)
            }
            Err(Some(message)) => {
                warn!(reason = %message, "engine rejected upload creation");
                Err(UploadError::CreateRejected(message))
            }
            Err(None) => {
                warn!("engine rejected upload creation");
                Err(UploadError::CreateFailed)
            }
        }
    }

    async fn resume_upload(&self, id: UploadId) -> Result<(), UploadError> {
        debug!(upload_id = %id, "resuming upload");
        if !self.engine.resume(&id).await {
            warn!(upload_id = %id, "engine could not resume upload");
            return self.shared.fail(UploadError::ResumeFailed);
        }

        let mut state = lock(&self.shared.state);
        // A fast engine may already have reported success or an error.
        if matches!(&*state, UploadState::Resuming { id: current } if *current == id) {
            *state = UploadState::Active { id };
        }
        Ok(())
    }
}

impl Drop for UploadSession {
    fn drop(&mut self) {
        self.shared.unsubscribe();
    }
}

impl std::fmt::Debug for UploadSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadSession")
            .field("file", &self.file)
            .field("state", &self.state())
            .finish()
    }
}
