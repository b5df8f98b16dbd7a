use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identifier the transfer engine assigns to an upload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UploadId(String);

impl UploadId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UploadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for UploadId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for UploadId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for UploadId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Options map handed to the engine's `createUpload` command.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadSettings {
    pub endpoint: String,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

/// Acknowledgement of a `createUpload` command.
///
/// The engine answers with either an identifier or, when it refused to
/// create the upload, an optional human-readable reason.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUploadAck {
    #[serde(default)]
    pub upload_id: Option<UploadId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl CreateUploadAck {
    /// Acknowledges a created upload.
    pub fn created(id: impl Into<UploadId>) -> Self {
        Self {
            upload_id: Some(id.into()),
            error_message: None,
        }
    }

    /// Acknowledges a refused creation, with or without a reason.
    pub fn rejected(message: Option<String>) -> Self {
        Self {
            upload_id: None,
            error_message: message,
        }
    }

    /// `Ok(id)` when an identifier was assigned, otherwise the engine's reason (if any).
    pub fn into_result(self) -> Result<UploadId, Option<String>> {
        match self.upload_id {
            Some(id) => Ok(id),
            None => Err(self.error_message.filter(|m| !m.is_empty())),
        }
    }
}
