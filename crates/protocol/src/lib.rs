//! Wire types shared with the native resumable-upload engine.
//!
//! Everything here crosses the bridge: the options passed to `createUpload`,
//! its acknowledgement, and the tagged events the engine publishes.

pub mod constants;
pub mod events;
pub mod types;

pub use events::{EngineEvent, ErrorPayload, EventKind, ProgressPayload, SuccessPayload};
pub use types::{CreateUploadAck, UploadId, UploadSettings};
