//! Recording engine and callback recorder shared by the unit tests.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::Notify;
use tuskit_protocol::{CreateUploadAck, UploadId, UploadSettings};
use tuskit_transfer::{EngineError, EngineFuture, EventBus, TransferEngine};

use crate::error::UploadError;
use crate::options::UploadOptions;

pub(crate) const ENDPOINT: &str = "https://tus.example/files/";

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Command {
    Create {
        file: PathBuf,
        settings: UploadSettings,
    },
    Resume(UploadId),
    Abort(UploadId),
}

/// Engine double that records every command it receives.
pub(crate) struct MockEngine {
    bus: EventBus,
    commands: Mutex<Vec<Command>>,
    create_acks: Mutex<VecDeque<CreateUploadAck>>,
    create_gate: Option<Arc<Notify>>,
    resume_gate: Option<Arc<Notify>>,
    resume_ok: AtomicBool,
    abort_error: Mutex<Option<EngineError>>,
}

impl MockEngine {
    pub(crate) fn new() -> Arc<Self> {
        Self::on_bus(EventBus::new())
    }

    pub(crate) fn on_bus(bus: EventBus) -> Arc<Self> {
        Arc::new(Self::build(bus, None, None))
    }

    /// An engine whose `create_upload` waits until `gate` is notified.
    pub(crate) fn gated(gate: Arc<Notify>) -> Arc<Self> {
        Arc::new(Self::build(EventBus::new(), Some(gate), None))
    }

    /// An engine whose `resume` waits until `gate` is notified.
    pub(crate) fn gated_resume(gate: Arc<Notify>) -> Arc<Self> {
        Arc::new(Self::build(EventBus::new(), None, Some(gate)))
    }

    fn build(
        bus: EventBus,
        create_gate: Option<Arc<Notify>>,
        resume_gate: Option<Arc<Notify>>,
    ) -> Self {
        Self {
            bus,
            commands: Mutex::new(Vec::new()),
            create_acks: Mutex::new(VecDeque::new()),
            create_gate,
            resume_gate,
            resume_ok: AtomicBool::new(true),
            abort_error: Mutex::new(None),
        }
    }

    /// Queues the answer to the next `create_upload`. Unqueued calls get a fresh UUID.
    pub(crate) fn queue_create(&self, ack: CreateUploadAck) {
        self.create_acks.lock().unwrap().push_back(ack);
    }

    pub(crate) fn set_resume_ok(&self, ok: bool) {
        self.resume_ok.store(ok, Ordering::SeqCst);
    }

    pub(crate) fn fail_abort(&self, message: &str) {
        *self.abort_error.lock().unwrap() = Some(EngineError::new(message));
    }

    pub(crate) fn commands(&self) -> Vec<Command> {
        self.commands.lock().unwrap().clone()
    }

    pub(crate) fn create_count(&self) -> usize {
        self.commands()
            .iter()
            .filter(|c| matches!(c, Command::Create { .. }))
            .count()
    }

    pub(crate) fn resumed(&self) -> Vec<UploadId> {
        self.commands()
            .into_iter()
            .filter_map(|c| match c {
                Command::Resume(id) => Some(id),
                _ => None,
            })
            .collect()
    }
}

impl TransferEngine for MockEngine {
    fn create_upload<'a>(
        &'a self,
        file: &'a Path,
        settings: &'a UploadSettings,
    ) -> EngineFuture<'a, CreateUploadAck> {
        Box::pin(async move {
            self.commands.lock().unwrap().push(Command::Create {
                file: file.to_path_buf(),
                settings: settings.clone(),
            });
            if let Some(gate) = &self.create_gate {
                gate.notified().await;
            }
            let queued = self.create_acks.lock().unwrap().pop_front();
            queued.unwrap_or_else(|| CreateUploadAck::created(uuid::Uuid::new_v4().to_string()))
        })
    }

    fn resume<'a>(&'a self, id: &'a UploadId) -> EngineFuture<'a, bool> {
        Box::pin(async move {
            self.commands.lock().unwrap().push(Command::Resume(id.clone()));
            if let Some(gate) = &self.resume_gate {
                gate.notified().await;
            }
            self.resume_ok.load(Ordering::SeqCst)
        })
    }

    fn abort<'a>(&'a self, id: &'a UploadId) -> EngineFuture<'a, Result<(), EngineError>> {
        Box::pin(async move {
            self.commands.lock().unwrap().push(Command::Abort(id.clone()));
            match self.abort_error.lock().unwrap().clone() {
                Some(e) => Err(e),
                None => Ok(()),
            }
        })
    }

    fn events(&self) -> EventBus {
        self.bus.clone()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Seen {
    Success,
    Progress(u64, u64),
    Error(UploadError),
}

/// Collects every callback invocation in order.
#[derive(Clone, Default)]
pub(crate) struct Recorder {
    seen: Arc<Mutex<Vec<Seen>>>,
}

impl Recorder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Options with all three callbacks wired to this recorder.
    pub(crate) fn options(&self, endpoint: Option<&str>) -> UploadOptions {
        let seen = Arc::clone(&self.seen);
        self.options_without_error_handler(endpoint)
            .on_error(move |e| seen.lock().unwrap().push(Seen::Error(e)))
    }

    /// Options with success and progress callbacks only.
    pub(crate) fn options_without_error_handler(&self, endpoint: Option<&str>) -> UploadOptions {
        let mut options = UploadOptions::new();
        if let Some(endpoint) = endpoint {
            options = options.endpoint(endpoint);
        }
        let on_success = Arc::clone(&self.seen);
        let on_progress = Arc::clone(&self.seen);
        options
            .on_success(move || on_success.lock().unwrap().push(Seen::Success))
            .on_progress(move |sent, total| {
                on_progress.lock().unwrap().push(Seen::Progress(sent, total))
            })
    }

    pub(crate) fn seen(&self) -> Vec<Seen> {
        self.seen.lock().unwrap().clone()
    }

    pub(crate) fn errors(&self) -> Vec<UploadError> {
        self.seen()
            .into_iter()
            .filter_map(|s| match s {
                Seen::Error(e) => Some(e),
                _ => None,
            })
            .collect()
    }
}
