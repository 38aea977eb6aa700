//! File record and canvas version routes.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use records::{FileVersion, ReviewFile};
use serde_json::Value;
use tracing::error;

use crate::services::version::{self, VersionError};
use crate::state::AppState;

/// `GET /api/projects/{pid}/files/{fid}`: file record with version list.
pub async fn get_file(
    State(state): State<AppState>,
    Path((project_id, file_id)): Path<(String, String)>,
) -> Result<Json<ReviewFile>, StatusCode> {
    let file = version::get_file(&state, &project_id, &file_id)
        .await
        .map_err(version_error_to_status)?;
    Ok(Json(file))
}

/// `POST /api/projects/{pid}/files/{fid}/versions`: commit a scene snapshot.
pub async fn create_version(
    State(state): State<AppState>,
    Path((project_id, file_id)): Path<(String, String)>,
    Json(snapshot): Json<Value>,
) -> Result<(StatusCode, Json<FileVersion>), StatusCode> {
    let created = version::commit_version(&state, &project_id, &file_id, snapshot)
        .await
        .map_err(version_error_to_status)?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `GET /api/projects/{pid}/files/{fid}/versions/{n}/content`: stored snapshot.
pub async fn get_content(
    State(state): State<AppState>,
    Path((project_id, file_id, number)): Path<(String, String, u32)>,
) -> Result<Json<Value>, StatusCode> {
    let content = version::get_content(&state, &project_id, &file_id, number)
        .await
        .map_err(version_error_to_status)?;
    Ok(Json(content))
}

pub(crate) fn version_error_to_status(err: VersionError) -> StatusCode {
    match err {
        VersionError::FileNotFound(_) | VersionError::ContentNotFound(..) => StatusCode::NOT_FOUND,
        VersionError::InvalidSnapshot => StatusCode::BAD_REQUEST,
        VersionError::Decode(e) => {
            error!(error = %e, "stored file record is malformed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
        VersionError::Store(e) => {
            error!(error = %e, "version store failure");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

#[cfg(test)]
#[path = "versions_test.rs"]
mod tests;
