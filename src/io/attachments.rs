//! Attachment name discovery
//!
//! Collects candidate attachment file names from directories. Only names are
//! read; file contents are never inspected.

use crate::types::SenderError;
use std::path::Path;
use tracing::debug;

/// List the names of regular files directly inside `dir`
///
/// Names are returned sorted so matching is deterministic regardless of
/// directory iteration order. Entries whose names are not valid UTF-8 are
/// skipped.
///
/// # Errors
///
/// * `SenderError::FileNotFound` - the directory does not exist
/// * `SenderError::IoError` - the directory could not be read
pub async fn list_attachment_names(dir: &Path) -> Result<Vec<String>, SenderError> {
    let mut entries = tokio::fs::read_dir(dir).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            SenderError::file_not_found(dir.display().to_string())
        } else {
            SenderError::from(e)
        }
    })?;

    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_file() {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) => names.push(name),
            Err(raw) => debug!(name = ?raw, "skipping attachment with non UTF-8 name"),
        }
    }

    names.sort();
    debug!(dir = %dir.display(), count = names.len(), "listed attachment candidates");
    Ok(names)
}
