//! Event pump: moves events from engine threads onto the bus.
//!
//! Native engines report from their own worker threads. They push into an
//! unbounded channel (never blocking the transfer) and a single task drains
//! it, so listeners see one event at a time in arrival order.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tuskit_protocol::EngineEvent;

use crate::bus::EventBus;

/// Sending half handed to the native engine.
pub type EventSender = mpsc::UnboundedSender<EngineEvent>;

/// Creates the engine-side channel.
pub fn event_channel() -> (EventSender, mpsc::UnboundedReceiver<EngineEvent>) {
    mpsc::unbounded_channel()
}

/// Emits every received event on `bus` until the channel closes or `cancel` fires.
///
/// Returns the number of events delivered.
pub async fn run_event_pump(
    bus: EventBus,
    mut rx: mpsc::UnboundedReceiver<EngineEvent>,
    cancel: CancellationToken,
) -> u64 {
    let mut delivered = 0u64;
    loop {
        tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                debug!(delivered, "event pump cancelled");
                break;
            }

            event = rx.recv() => {
                match event {
                    Some(event) => {
                        bus.emit(&event);
                        delivered += 1;
                    }
                    None => {
                        debug!(delivered, "engine event channel closed");
                        break;
                    }
                }
            }
        }
    }
    delivered
}

/// Runs [`run_event_pump`] on the current tokio runtime.
pub fn spawn_event_pump(
    bus: EventBus,
    rx: mpsc::UnboundedReceiver<EngineEvent>,
    cancel: CancellationToken,
) -> JoinHandle<u64> {
    tokio::spawn(run_event_pump(bus, rx, cancel))
}
