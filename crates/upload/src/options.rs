//! Upload configuration and caller callbacks.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tuskit_protocol::UploadSettings;

use crate::error::{ConfigError, UploadError};

/// Called once the server has accepted the last byte.
pub type SuccessCallback = Arc<dyn Fn() + Send + Sync>;

/// Called with `(bytes_uploaded, bytes_total)`.
pub type ProgressCallback = Arc<dyn Fn(u64, u64) + Send + Sync>;

/// Called with every error the upload runs into.
pub type ErrorCallback = Arc<dyn Fn(UploadError) + Send + Sync>;

/// Serializable part of the upload options.
///
/// Can be loaded from a JSON file such as:
///
/// ```json
/// {
///   "endpoint": "https://tus.example.org/files/",
///   "headers": { "Authorization": "Bearer ..." },
///   "metadata": { "filename": "video.mp4", "filetype": "video/mp4" }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub headers: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, String>,
}

impl UploadConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a JSON config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_json(&content)?;
        tracing::debug!(path = %path.display(), "upload config loaded");
        Ok(config)
    }

    /// The endpoint, unless it is missing or blank.
    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
    }

    /// Builds the settings sent along with `createUpload`.
    pub(crate) fn to_settings(&self) -> Result<UploadSettings, UploadError> {
        let endpoint = self.endpoint().ok_or(UploadError::NoEndpoint)?;
        Ok(UploadSettings {
            endpoint: endpoint.to_string(),
            headers: self.headers.clone(),
            metadata: self.metadata.clone(),
        })
    }
}

/// Optional handlers for the three upload outcomes.
#[derive(Clone, Default)]
pub struct Callbacks {
    pub on_success: Option<SuccessCallback>,
    pub on_progress: Option<ProgressCallback>,
    pub on_error: Option<ErrorCallback>,
}

impl fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callbacks")
            .field("on_success", &self.on_success.is_some())
            .field("on_progress", &self.on_progress.is_some())
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}

/// Everything an upload needs besides the file itself.
#[derive(Debug, Clone, Default)]
pub struct UploadOptions {
    pub config: UploadConfig,
    pub callbacks: Callbacks,
}

impl UploadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.endpoint = Some(endpoint.into());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.headers.insert(name.into(), value.into());
        self
    }

    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.metadata.insert(key.into(), value.into());
        self
    }

    pub fn on_success<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.callbacks.on_success = Some(Arc::new(f));
        self
    }

    pub fn on_progress<F>(mut self, f: F) -> Self
    where
        F: Fn(u64, u64) + Send + Sync + 'static,
    {
        self.callbacks.on_progress = Some(Arc::new(f));
        self
    }

    pub fn on_error<F>(mut self, f: F) -> Self
    where
        F: Fn(UploadError) + Send + Sync + 'static,
    {
        self.callbacks.on_error = Some(Arc::new(f));
        self
    }
}

impl From<UploadConfig> for UploadOptions {
    fn from(config: UploadConfig) -> Self {
        Self {
            config,
            callbacks: Callbacks::default(),
        }
    }
}
