//! Event names and user-visible error strings shared with the native bridge.

/// Emitted once an upload finished and the server returned its URL.
pub const EVENT_SUCCESS: &str = "onSuccess";

/// Emitted when a running transfer fails.
pub const EVENT_ERROR: &str = "onError";

/// Emitted periodically while bytes are being written.
pub const EVENT_PROGRESS: &str = "onProgress";

pub const MSG_NO_FILE: &str = "tus: no file or stream to upload provided";
pub const MSG_NO_ENDPOINT: &str = "tus: no endpoint provided";
pub const MSG_CREATE_FAILED: &str = "tus: failed to create upload";
pub const MSG_RESUME_FAILED: &str = "Error while resuming the upload";
