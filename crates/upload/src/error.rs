//! Upload error types.

use tuskit_protocol::constants::{
    MSG_CREATE_FAILED, MSG_NO_ENDPOINT, MSG_NO_FILE, MSG_RESUME_FAILED,
};
use tuskit_transfer::EngineError;

/// Errors produced while driving an upload.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum UploadError {
    #[error("{}", MSG_NO_FILE)]
    NoFile,

    #[error("{}", MSG_NO_ENDPOINT)]
    NoEndpoint,

    /// The engine refused to create the upload and said why.
    #[error("{0}")]
    CreateRejected(String),

    /// The engine refused to create the upload without a reason.
    #[error("{}", MSG_CREATE_FAILED)]
    CreateFailed,

    #[error("{}", MSG_RESUME_FAILED)]
    ResumeFailed,

    #[error("abort failed: {0}")]
    Abort(#[from] EngineError),

    /// Reported asynchronously by the engine for a running transfer.
    #[error("{0}")]
    Transfer(String),

    /// `resume` was called before the engine assigned an identifier.
    #[error("upload has not been created yet")]
    NotCreated,
}

impl UploadError {
    /// `true` for errors detected before any engine command was issued.
    pub fn is_validation(&self) -> bool {
        matches!(self, UploadError::NoFile | UploadError::NoEndpoint)
    }
}

/// Errors produced while loading an [`UploadConfig`](crate::UploadConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
