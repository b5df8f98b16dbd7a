use std::path::Path;

use tuskit_protocol::UploadSettings;

use crate::error::UploadError;
use crate::options::UploadConfig;

/// Checks the preconditions of `start` before any engine command is issued.
///
/// The file is checked first, then the endpoint. Rejects:
/// - a missing file reference
/// - an empty or whitespace-only file reference
/// - a missing or blank endpoint
pub(crate) fn validate_start<'a>(
    file: Option<&'a Path>,
    config: &UploadConfig,
) -> Result<(&'a Path, UploadSettings), UploadError> {
    let file = file.filter(|f| !is_blank(f)).ok_or(UploadError::NoFile)?;
    let settings = config.to_settings()?;
    Ok((file, settings))
}

fn is_blank(path: &Path) -> bool {
    path.as_os_str()
        .to_str()
        .is_some_and(|s| s.trim().is_empty())
}
