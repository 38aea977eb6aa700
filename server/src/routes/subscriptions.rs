//! Notification subscription RPC routes.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use records::{SubscriptionRequest, SubscriptionStatus};
use tracing::error;

use crate::services::subscription::{self, SubscriptionError};
use crate::state::AppState;

/// `POST /api/notifications/subscribe`
pub async fn subscribe(
    State(state): State<AppState>,
    Json(body): Json<SubscriptionRequest>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    subscription::subscribe(&state, &body.project_id, &body.email)
        .await
        .map_err(subscription_error_to_status)?;
    Ok(Json(serde_json::json!({ "ok": true })))
}

/// `POST /api/notifications/unsubscribe`
pub async fn unsubscribe(
    State(state): State<AppState>,
    Json(body): Json<SubscriptionRequest>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    subscription::unsubscribe(&state, &body.project_id, &body.email)
        .await
        .map_err(subscription_error_to_status)?;
    Ok(Json(serde_json::json!({ "ok": true })))
}

/// `POST /api/notifications/check`
pub async fn check(
    State(state): State<AppState>,
    Json(body): Json<SubscriptionRequest>,
) -> Result<Json<SubscriptionStatus>, StatusCode> {
    let is_subscribed = subscription::is_subscribed(&state, &body.project_id, &body.email)
        .await
        .map_err(subscription_error_to_status)?;
    Ok(Json(SubscriptionStatus { is_subscribed }))
}

pub(crate) fn subscription_error_to_status(err: SubscriptionError) -> StatusCode {
    match err {
        SubscriptionError::InvalidEmail | SubscriptionError::MissingProject => StatusCode::BAD_REQUEST,
        SubscriptionError::Store(e) => {
            error!(error = %e, "subscription store failure");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

#[cfg(test)]
#[path = "subscriptions_test.rs"]
mod tests;
