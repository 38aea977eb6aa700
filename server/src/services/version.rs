//! Version service: file records and committed canvas content.
//!
//! DESIGN
//! ======
//! Versions are append-only. A commit stores the snapshot under the next
//! version number, then appends the version to the file record and moves
//! `currentVersion` to it. Commits run under `AppState::commit_lock`, so two
//! concurrent commits to one file never receive the same number.
//!
//! ERROR HANDLING
//! ==============
//! The content document is written before the file record. A failure between
//! the two leaves an orphaned content document that no version points at;
//! the next commit overwrites it with the same number.

use records::{FileVersion, ReviewFile, VersionMetadata};
use serde_json::Value;
use tracing::info;

use super::{content_collection, files_collection};
use crate::state::AppState;
use crate::store::StoreError;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum VersionError {
    #[error("file not found: {0}")]
    FileNotFound(String),
    #[error("version {1} of file {0} not found")]
    ContentNotFound(String, u32),
    #[error("snapshot must be a JSON object")]
    InvalidSnapshot,
    #[error("malformed file record: {0}")]
    Decode(#[from] serde_json::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
}

// =============================================================================
// READ
// =============================================================================

/// Decode a stored file document. Older documents may lack the `id` field;
/// the document id fills it in.
///
/// # Errors
///
/// Returns a decode error if the document does not describe a file.
pub fn decode_file(file_id: &str, mut doc: Value) -> Result<ReviewFile, serde_json::Error> {
    if let Value::Object(map) = &mut doc {
        map.entry("id").or_insert_with(|| Value::String(file_id.to_owned()));
    }
    serde_json::from_value(doc)
}

/// Load a file record.
///
/// # Errors
///
/// `FileNotFound` when no document exists, `Decode` when it is malformed.
pub async fn get_file(state: &AppState, project_id: &str, file_id: &str) -> Result<ReviewFile, VersionError> {
    let doc = state
        .store
        .get(&files_collection(project_id), file_id)
        .await?
        .ok_or_else(|| VersionError::FileNotFound(file_id.to_owned()))?;
    Ok(decode_file(file_id, doc)?)
}

/// Load the snapshot committed as version `number`.
///
/// # Errors
///
/// `ContentNotFound` when that version has no stored content.
pub async fn get_content(
    state: &AppState,
    project_id: &str,
    file_id: &str,
    number: u32,
) -> Result<Value, VersionError> {
    state
        .store
        .get(&content_collection(project_id, file_id), &number.to_string())
        .await?
        .ok_or_else(|| VersionError::ContentNotFound(file_id.to_owned(), number))
}

// =============================================================================
// COMMIT
// =============================================================================

/// Commit `snapshot` as a new version of the file.
///
/// # Errors
///
/// `InvalidSnapshot` for non-object payloads, `FileNotFound` for unknown
/// files, store and decode errors otherwise.
pub async fn commit_version(
    state: &AppState,
    project_id: &str,
    file_id: &str,
    snapshot: Value,
) -> Result<FileVersion, VersionError> {
    if !snapshot.is_object() {
        return Err(VersionError::InvalidSnapshot);
    }
    let _guard = state.commit_lock.lock().await;

    let mut file = get_file(state, project_id, file_id).await?;
    let number = file.next_version_number();
    let size = serde_json::to_vec(&snapshot)?.len();

    state
        .store
        .set(&content_collection(project_id, file_id), &number.to_string(), snapshot, false)
        .await?;

    let mut version = FileVersion::new(
        number,
        content_url(&state.config.public_base_url, project_id, file_id, number),
        now_millis(),
    );
    version.metadata = Some(VersionMetadata { size: u64::try_from(size).ok(), name: None });
    file.push_version(version.clone());

    let patch = serde_json::json!({
        "versions": file.versions,
        "currentVersion": file.current_version,
    });
    state.store.set(&files_collection(project_id), file_id, patch, true).await?;

    info!(%project_id, %file_id, version = number, "version committed");
    Ok(version)
}

/// Public URL the committed content is served from.
#[must_use]
pub fn content_url(base_url: &str, project_id: &str, file_id: &str, number: u32) -> String {
    format!("{base_url}/api/projects/{project_id}/files/{file_id}/versions/{number}/content")
}

fn now_millis() -> i64 {
    let now = time::OffsetDateTime::now_utc();
    now.unix_timestamp() * 1000 + i64::from(now.millisecond())
}

#[cfg(test)]
#[path = "version_test.rs"]
mod tests;
