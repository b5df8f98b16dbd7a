//! Seam between the upload control layer and the native transfer engine.
//!
//! The engine is a black box reachable through an asynchronous command
//! interface ([`TransferEngine`]) and one process-wide [`EventBus`] on which
//! it publishes the events of every upload it runs.

mod bus;
mod engine;
mod pump;

pub use bus::{EventBus, Listener, Subscription};
pub use engine::{EngineFuture, TransferEngine};
pub use pump::{EventSender, event_channel, run_event_pump, spawn_event_pump};

/// Failure reported by the engine for a command.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct EngineError(pub String);

impl EngineError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}
