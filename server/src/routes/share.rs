//! Share-link route.

use axum::extract::{Path, State};
use axum::http::header::USER_AGENT;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use tracing::error;

use crate::services::share::{self, ShareError};
use crate::state::AppState;

/// `GET /share/{*path}`: Open Graph page for crawlers, redirect otherwise.
pub async fn share_meta(State(state): State<AppState>, Path(path): Path<String>, headers: HeaderMap) -> Response {
    let meta = match share::resolve(&state, &path).await {
        Ok(meta) => meta,
        Err(err) => return share_error_response(err),
    };

    let user_agent = headers.get(USER_AGENT).and_then(|v| v.to_str().ok()).unwrap_or_default();
    if share::is_bot(user_agent) {
        (StatusCode::OK, Html(share::render_html(&meta))).into_response()
    } else {
        Redirect::temporary(&meta.url).into_response()
    }
}

pub(crate) fn share_error_response(err: ShareError) -> Response {
    match err {
        ShareError::MissingProject => (StatusCode::NOT_FOUND, "Not Found").into_response(),
        ShareError::Store(e) => {
            error!(error = %e, "share metadata lookup failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
    }
}

#[cfg(test)]
#[path = "share_test.rs"]
mod tests;
