//! Events published by the transfer engine.
//!
//! One bus carries the events of every upload in the process; each payload
//! is tagged with the [`UploadId`] it belongs to so that listeners can pick
//! out their own.

use serde::{Deserialize, Serialize};

use crate::constants::{EVENT_ERROR, EVENT_PROGRESS, EVENT_SUCCESS};
use crate::types::UploadId;

/// The three event topics a listener can register for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Success,
    Error,
    Progress,
}

impl EventKind {
    pub const ALL: [EventKind; 3] = [EventKind::Success, EventKind::Error, EventKind::Progress];

    /// Name of the event as the native bridge emits it.
    pub fn name(self) -> &'static str {
        match self {
            EventKind::Success => EVENT_SUCCESS,
            EventKind::Error => EVENT_ERROR,
            EventKind::Progress => EVENT_PROGRESS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuccessPayload {
    pub upload_id: UploadId,
    pub upload_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPayload {
    pub upload_id: UploadId,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressPayload {
    pub upload_id: UploadId,
    #[serde(with = "byte_count")]
    pub bytes_written: u64,
    #[serde(with = "byte_count")]
    pub bytes_total: u64,
}

/// A single engine event, framed as `{"event": "...", "payload": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload")]
pub enum EngineEvent {
    #[serde(rename = "onSuccess")]
    Success(SuccessPayload),
    #[serde(rename = "onError")]
    Error(ErrorPayload),
    #[serde(rename = "onProgress")]
    Progress(ProgressPayload),
}

impl EngineEvent {
    pub fn success(id: impl Into<UploadId>, upload_url: impl Into<String>) -> Self {
        EngineEvent::Success(SuccessPayload {
            upload_id: id.into(),
            upload_url: upload_url.into(),
        })
    }

    pub fn error(id: impl Into<UploadId>, error: impl Into<String>) -> Self {
        EngineEvent::Error(ErrorPayload {
            upload_id: id.into(),
            error: error.into(),
        })
    }

    pub fn progress(id: impl Into<UploadId>, bytes_written: u64, bytes_total: u64) -> Self {
        EngineEvent::Progress(ProgressPayload {
            upload_id: id.into(),
            bytes_written,
            bytes_total,
        })
    }

    pub fn kind(&self) -> EventKind {
        match self {
            EngineEvent::Success(_) => EventKind::Success,
            EngineEvent::Error(_) => EventKind::Error,
            EngineEvent::Progress(_) => EventKind::Progress,
        }
    }

    /// The correlation tag of this event.
    pub fn upload_id(&self) -> &UploadId {
        match self {
            EngineEvent::Success(p) => &p.upload_id,
            EngineEvent::Error(p) => &p.upload_id,
            EngineEvent::Progress(p) => &p.upload_id,
        }
    }
}

/// Byte counts arrive as JSON doubles from some bridges (`1024.0`).
mod byte_count {
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Count {
        Int(u64),
        Float(f64),
    }

    pub fn serialize<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(*value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        match Count::deserialize(deserializer)? {
            Count::Int(n) => Ok(n),
            Count::Float(f)
                if f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f < u64::MAX as f64 =>
            {
                Ok(f as u64)
            }
            Count::Float(f) => Err(serde::de::Error::custom(format!("invalid byte count: {f}"))),
        }
    }
}
