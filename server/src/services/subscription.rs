//! Notification subscriptions: project-scoped email subscriber list.
//!
//! DESIGN
//! ======
//! Subscribers live at `projects/<pid>/subscribers/<key>`, where the key is
//! the SHA-256 hex digest of the normalized email. Subscribing twice keeps a
//! single record; unsubscribing an unknown email succeeds.

use records::normalize_email;
use serde_json::json;
use sha2::{Digest, Sha256};
use tracing::info;

use super::subscribers_collection;
use crate::state::AppState;
use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum SubscriptionError {
    #[error("invalid email address")]
    InvalidEmail,
    #[error("missing project id")]
    MissingProject,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Document key for a normalized email.
#[must_use]
pub fn subscriber_key(normalized_email: &str) -> String {
    let digest = Sha256::digest(normalized_email.as_bytes());
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

fn validate(project_id: &str, email: &str) -> Result<String, SubscriptionError> {
    if project_id.trim().is_empty() {
        return Err(SubscriptionError::MissingProject);
    }
    normalize_email(email).ok_or(SubscriptionError::InvalidEmail)
}

/// Add `email` to the project's subscribers.
///
/// # Errors
///
/// Validation errors for a blank project or malformed email, store errors.
pub async fn subscribe(state: &AppState, project_id: &str, email: &str) -> Result<(), SubscriptionError> {
    let email = validate(project_id, email)?;
    let doc = json!({ "email": email, "projectId": project_id });
    state
        .store
        .set(&subscribers_collection(project_id), &subscriber_key(&email), doc, true)
        .await?;
    info!(%project_id, "notification subscriber added");
    Ok(())
}

/// Remove `email` from the project's subscribers.
///
/// # Errors
///
/// Validation errors for a blank project or malformed email, store errors.
pub async fn unsubscribe(state: &AppState, project_id: &str, email: &str) -> Result<(), SubscriptionError> {
    let email = validate(project_id, email)?;
    state
        .store
        .delete(&subscribers_collection(project_id), &subscriber_key(&email))
        .await?;
    info!(%project_id, "notification subscriber removed");
    Ok(())
}

/// Whether `email` is subscribed to the project.
///
/// # Errors
///
/// Validation errors for a blank project or malformed email, store errors.
pub async fn is_subscribed(state: &AppState, project_id: &str, email: &str) -> Result<bool, SubscriptionError> {
    let email = validate(project_id, email)?;
    let doc = state
        .store
        .get(&subscribers_collection(project_id), &subscriber_key(&email))
        .await?;
    Ok(doc.is_some())
}

#[cfg(test)]
#[path = "subscription_test.rs"]
mod tests;
