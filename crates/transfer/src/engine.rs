//! The native transfer engine, seen from the control layer.
//!
//! Chunked PATCH requests, checksums, retries and disk reads all happen on the
//! other side of this trait. A platform binding implements it on top of its
//! native module; tests implement it with a recording mock.

use std::future::Future;
use std::path::Path;
use std::pin::Pin;

use tuskit_protocol::{CreateUploadAck, UploadId, UploadSettings};

use crate::EngineError;
use crate::bus::EventBus;

/// Boxed future returned by [`TransferEngine`] commands.
pub type EngineFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Asynchronous command interface of the native uploader.
pub trait TransferEngine: Send + Sync {
    /// Registers a new upload for `file` and returns its identifier.
    ///
    /// A refused creation is reported through [`CreateUploadAck::rejected`],
    /// not as a transport error.
    fn create_upload<'a>(
        &'a self,
        file: &'a Path,
        settings: &'a UploadSettings,
    ) -> EngineFuture<'a, CreateUploadAck>;

    /// Starts (or restarts) transferring a previously created upload.
    ///
    /// Resolves to `false` when the engine does not know `id`.
    fn resume<'a>(&'a self, id: &'a UploadId) -> EngineFuture<'a, bool>;

    /// Halts a running transfer. The upload stays resumable.
    fn abort<'a>(&'a self, id: &'a UploadId) -> EngineFuture<'a, Result<(), EngineError>>;

    /// The bus this engine publishes success, error and progress events on.
    fn events(&self) -> EventBus;
}
