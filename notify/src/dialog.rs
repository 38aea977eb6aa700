//! Notification subscription dialog state.
//!
//! ```text
//!            open (stored email)            open (nothing stored)
//!                 │                                 │
//!                 ▼                                 ▼
//!            Checking ──server: no / error──▶ Unsubscribed
//!                 │                                 │  ▲
//!           server: yes                     subscribe  │ unsubscribe,
//!                 ▼                                 ▼  │ use another email
//!            Subscribed ◀──────────────────────────────┘
//! ```
//!
//! The email of a successful subscription is remembered in the injected
//! [`PreferenceStore`] and dropped again when the server no longer knows it.

#[cfg(test)]
#[path = "dialog_test.rs"]
mod dialog_test;

use crate::api::SubscriptionApi;
use crate::prefs::{EMAIL_KEY, PreferenceStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogStatus {
    Checking,
    Subscribed,
    Unsubscribed,
}

/// Toast-style feedback for the host to display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Error(String),
}

pub struct SubscriptionDialog<P, A> {
    project_id: String,
    prefs: P,
    api: A,
    email: String,
    status: DialogStatus,
    busy: bool,
}

impl<P: PreferenceStore, A: SubscriptionApi> SubscriptionDialog<P, A> {
    #[must_use]
    pub fn new(project_id: impl Into<String>, prefs: P, api: A) -> Self {
        Self {
            project_id: project_id.into(),
            prefs,
            api,
            email: String::new(),
            status: DialogStatus::Checking,
            busy: false,
        }
    }

    /// Dialog became visible: restore the remembered email and verify it.
    pub async fn open(&mut self) {
        match self.prefs.get(EMAIL_KEY) {
            Some(stored) if !stored.is_empty() => {
                self.email = stored;
                self.check().await;
            }
            _ => {
                self.email.clear();
                self.status = DialogStatus::Unsubscribed;
            }
        }
    }

    /// Ask the server whether the current email is subscribed. Failures
    /// fall back to `Unsubscribed`.
    pub async fn check(&mut self) {
        self.status = DialogStatus::Checking;
        match self.api.check(&self.project_id, &self.email).await {
            Ok(true) => self.status = DialogStatus::Subscribed,
            Ok(false) => {
                self.prefs.remove(EMAIL_KEY);
                self.status = DialogStatus::Unsubscribed;
            }
            Err(e) => {
                log::warn!("subscription check failed: {e}");
                self.status = DialogStatus::Unsubscribed;
            }
        }
    }

    pub fn set_email(&mut self, email: &str) {
        self.email = email.to_owned();
    }

    /// Subscribe the current email. No-op when the email is blank.
    pub async fn subscribe(&mut self) -> Option<Notice> {
        if self.email.trim().is_empty() {
            return None;
        }
        self.busy = true;
        let result = self.api.subscribe(&self.project_id, &self.email).await;
        self.busy = false;
        Some(match result {
            Ok(()) => {
                self.prefs.set(EMAIL_KEY, &self.email);
                self.status = DialogStatus::Subscribed;
                Notice::Success("Subscribed to notifications".into())
            }
            Err(e) => {
                log::error!("subscribe failed: {e}");
                Notice::Error(format!("Subscription failed: {e}"))
            }
        })
    }

    /// Unsubscribe the current email. The host confirms with the user first.
    pub async fn unsubscribe(&mut self) -> Option<Notice> {
        if self.email.is_empty() {
            return None;
        }
        self.busy = true;
        let result = self.api.unsubscribe(&self.project_id, &self.email).await;
        self.busy = false;
        Some(match result {
            Ok(()) => {
                self.prefs.remove(EMAIL_KEY);
                self.status = DialogStatus::Unsubscribed;
                self.email.clear();
                Notice::Success("Unsubscribed".into())
            }
            Err(e) => {
                log::error!("unsubscribe failed: {e}");
                Notice::Error("Could not unsubscribe".into())
            }
        })
    }

    /// Forget the remembered email locally without telling the server.
    pub fn use_another_email(&mut self) {
        self.prefs.remove(EMAIL_KEY);
        self.email.clear();
        self.status = DialogStatus::Unsubscribed;
    }

    #[must_use]
    pub fn status(&self) -> DialogStatus {
        self.status
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    #[must_use]
    pub fn prefs(&self) -> &P {
        &self.prefs
    }
}
