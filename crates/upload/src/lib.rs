//! Client-side control of resumable (tus-style) uploads.
//!
//! This crate owns the **lifecycle of a single upload**. The bytes are moved
//! by a native transfer engine behind [`tuskit_transfer::TransferEngine`];
//! this crate decides when to create the upload, when to resume it, and which
//! of the engine's events belong to it.
//!
//! # Lifecycle
//!
//! 1. **Validate**: a file reference and an endpoint are required
//! 2. **Create**: the engine assigns an identifier (first start only)
//! 3. **Subscribe**: listen on the shared bus, filtered by that identifier
//! 4. **Resume**: the engine starts moving bytes
//! 5. **Finish**: a success event records the URL and ends the subscription
//!
//! ```no_run
//! # use std::sync::Arc;
//! # use tuskit_transfer::TransferEngine;
//! # use tuskit_upload::{UploadOptions, UploadSession};
//! # async fn run(engine: Arc<dyn TransferEngine>) {
//! let options = UploadOptions::new()
//!     .endpoint("https://tus.example.org/files/")
//!     .metadata("filename", "clip.mp4")
//!     .on_progress(|sent, total| println!("{sent}/{total}"))
//!     .on_success(|| println!("done"))
//!     .on_error(|e| eprintln!("upload failed: {e}"));
//!
//! let upload = UploadSession::new(Some("/sdcard/DCIM/clip.mp4"), options, engine);
//! upload.start().await.ok();
//! # }
//! ```

pub mod error;
pub mod options;
mod routing;
pub mod session;
pub mod state;
mod validation;

#[cfg(test)]
mod testing;

pub use error::{ConfigError, UploadError};
pub use options::{
    Callbacks, ErrorCallback, ProgressCallback, SuccessCallback, UploadConfig, UploadOptions,
};
pub use session::UploadSession;
pub use state::{UploadProgress, UploadState};
