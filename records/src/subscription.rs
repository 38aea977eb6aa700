//! Notification subscription wire types.

#[cfg(test)]
#[path = "subscription_test.rs"]
mod subscription_test;

use serde::{Deserialize, Serialize};

/// Body of the subscribe / unsubscribe / check calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionRequest {
    pub project_id: String,
    pub email: String,
}

/// Response of the check call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionStatus {
    pub is_subscribed: bool,
}

/// Trim and lowercase an email address; `None` unless it has exactly one `@`
/// with non-empty parts on both sides.
#[must_use]
pub fn normalize_email(email: &str) -> Option<String> {
    let normalized = email.trim().to_ascii_lowercase();
    let mut parts = normalized.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return None;
    };
    if local.is_empty() || domain.is_empty() {
        return None;
    }
    Some(normalized)
}
