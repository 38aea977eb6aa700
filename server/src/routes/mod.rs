//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! This module binds the HTTP endpoints consumed by the review client:
//! share-link previews, notification subscriptions, and canvas version
//! commit/read. Requests are traced with `TraceLayer`; CORS is open because
//! the viewer app is served from a different origin.

pub mod share;
pub mod subscriptions;
pub mod versions;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/share/{*path}", get(share::share_meta))
        .route("/api/notifications/subscribe", post(subscriptions::subscribe))
        .route("/api/notifications/unsubscribe", post(subscriptions::unsubscribe))
        .route("/api/notifications/check", post(subscriptions::check))
        .route("/api/projects/{pid}/files/{fid}", get(versions::get_file))
        .route("/api/projects/{pid}/files/{fid}/versions", post(versions::create_version))
        .route("/api/projects/{pid}/files/{fid}/versions/{n}/content", get(versions::get_content))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}
