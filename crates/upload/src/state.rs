//! Lifecycle state of a single upload.

use tuskit_protocol::UploadId;

/// Where an upload is in its lifecycle.
///
/// The identifier lives inside the states that have one, so an upload that
/// was never created cannot be resumed or aborted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum UploadState {
    /// Constructed, `start` never called.
    #[default]
    Unstarted,
    /// Waiting for the engine to acknowledge `createUpload`.
    Creating,
    /// Waiting for the engine to acknowledge `resume`.
    Resuming { id: UploadId },
    /// The engine is transferring bytes.
    Active { id: UploadId },
    /// Halted by `abort`; `start` resumes it.
    Paused { id: UploadId },
    /// Something went wrong. `start` retries from here.
    Failed { id: Option<UploadId>, error: String },
    /// The server holds the whole file at `url`.
    Succeeded { id: UploadId, url: String },
}

impl UploadState {
    /// The engine-assigned identifier, once there is one.
    pub fn upload_id(&self) -> Option<&UploadId> {
        match self {
            UploadState::Unstarted | UploadState::Creating => None,
            UploadState::Failed { id, .. } => id.as_ref(),
            UploadState::Resuming { id }
            | UploadState::Active { id }
            | UploadState::Paused { id }
            | UploadState::Succeeded { id, .. } => Some(id),
        }
    }

    pub fn result_url(&self) -> Option<&str> {
        match self {
            UploadState::Succeeded { url, .. } => Some(url),
            _ => None,
        }
    }

    /// `true` while a `start` is waiting on the engine.
    pub fn is_starting(&self) -> bool {
        matches!(self, UploadState::Creating | UploadState::Resuming { .. })
    }

    pub fn is_succeeded(&self) -> bool {
        matches!(self, UploadState::Succeeded { .. })
    }
}

/// Last progress figures reported for an upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UploadProgress {
    pub bytes_uploaded: u64,
    pub bytes_total: u64,
}

impl UploadProgress {
    /// Returns the upload progress as a percentage (0-100).
    pub fn percentage(&self) -> f64 {
        if self.bytes_total == 0 {
            return 0.0;
        }
        self.bytes_uploaded as f64 / self.bytes_total as f64 * 100.0
    }
}
