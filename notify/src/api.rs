//! Subscription RPC client.

use async_trait::async_trait;
#[cfg(feature = "web")]
use records::{SubscriptionRequest, SubscriptionStatus};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),
    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },
}

/// The three notification subscription calls, keyed by project and email.
#[async_trait(?Send)]
pub trait SubscriptionApi {
    async fn subscribe(&self, project_id: &str, email: &str) -> Result<(), ApiError>;
    async fn unsubscribe(&self, project_id: &str, email: &str) -> Result<(), ApiError>;
    async fn check(&self, project_id: &str, email: &str) -> Result<bool, ApiError>;
}

/// `POST {base}/api/notifications/{subscribe|unsubscribe|check}` over `fetch()`.
#[cfg(feature = "web")]
#[derive(Debug, Clone, Default)]
pub struct HttpSubscriptionApi {
    base_url: String,
}

#[cfg(feature = "web")]
impl HttpSubscriptionApi {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into() }
    }

    async fn call(&self, action: &str, project_id: &str, email: &str) -> Result<gloo_net::http::Response, ApiError> {
        let url = format!("{}/api/notifications/{action}", self.base_url.trim_end_matches('/'));
        let body = SubscriptionRequest { project_id: project_id.to_owned(), email: email.to_owned() };
        let resp = gloo_net::http::Request::post(&url)
            .json(&body)
            .map_err(network)?
            .send()
            .await
            .map_err(network)?;
        let status = resp.status();
        if (200..300).contains(&status) {
            return Ok(resp);
        }
        let message = match resp.text().await {
            Ok(text) if !text.is_empty() => text,
            _ => resp.status_text(),
        };
        Err(ApiError::Status { status, message })
    }
}

#[cfg(feature = "web")]
fn network(e: gloo_net::Error) -> ApiError {
    ApiError::Network(e.to_string())
}

#[cfg(feature = "web")]
#[async_trait(?Send)]
impl SubscriptionApi for HttpSubscriptionApi {
    async fn subscribe(&self, project_id: &str, email: &str) -> Result<(), ApiError> {
        self.call("subscribe", project_id, email).await.map(|_| ())
    }

    async fn unsubscribe(&self, project_id: &str, email: &str) -> Result<(), ApiError> {
        self.call("unsubscribe", project_id, email).await.map(|_| ())
    }

    async fn check(&self, project_id: &str, email: &str) -> Result<bool, ApiError> {
        let resp = self.call("check", project_id, email).await?;
        let status = resp.json::<SubscriptionStatus>().await.map_err(network)?;
        Ok(status.is_subscribed)
    }
}
