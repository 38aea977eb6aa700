use std::cell::RefCell;

use async_trait::async_trait;
use futures::executor::block_on;

use super::*;
use crate::api::ApiError;
use crate::prefs::MemoryPreferences;

// =============================================================
// Test double
// =============================================================

#[derive(Default)]
struct FakeApi {
    subscribed: RefCell<Vec<String>>,
    offline: bool,
    calls: RefCell<Vec<&'static str>>,
}

impl FakeApi {
    fn with_subscriber(email: &str) -> Self {
        let api = Self::default();
        api.subscribed.borrow_mut().push(email.to_owned());
        api
    }

    fn offline() -> Self {
        Self { offline: true, ..Self::default() }
    }

    fn guard(&self, call: &'static str) -> Result<(), ApiError> {
        self.calls.borrow_mut().push(call);
        if self.offline {
            return Err(ApiError::Network("offline".into()));
        }
        Ok(())
    }
}

#[async_trait(?Send)]
impl SubscriptionApi for FakeApi {
    async fn subscribe(&self, _project_id: &str, email: &str) -> Result<(), ApiError> {
        self.guard("subscribe")?;
        self.subscribed.borrow_mut().push(email.to_owned());
        Ok(())
    }

    async fn unsubscribe(&self, _project_id: &str, email: &str) -> Result<(), ApiError> {
        self.guard("unsubscribe")?;
        self.subscribed.borrow_mut().retain(|e| e != email);
        Ok(())
    }

    async fn check(&self, _project_id: &str, email: &str) -> Result<bool, ApiError> {
        self.guard("check")?;
        Ok(self.subscribed.borrow().iter().any(|e| e == email))
    }
}

fn dialog(prefs: MemoryPreferences, api: FakeApi) -> SubscriptionDialog<MemoryPreferences, FakeApi> {
    SubscriptionDialog::new("p1", prefs, api)
}

// =============================================================
// Open / check
// =============================================================

#[test]
fn open_without_stored_email_is_unsubscribed_without_server_call() {
    let mut d = dialog(MemoryPreferences::new(), FakeApi::default());
    assert_eq!(d.status(), DialogStatus::Checking);
    block_on(d.open());
    assert_eq!(d.status(), DialogStatus::Unsubscribed);
    assert!(d.api.calls.borrow().is_empty());
}

#[test]
fn open_with_stored_subscribed_email_is_subscribed() {
    let prefs = MemoryPreferences::new().with(EMAIL_KEY, "a@b.c");
    let mut d = dialog(prefs, FakeApi::with_subscriber("a@b.c"));
    block_on(d.open());
    assert_eq!(d.status(), DialogStatus::Subscribed);
    assert_eq!(d.email(), "a@b.c");
}

#[test]
fn stale_stored_email_is_forgotten() {
    let prefs = MemoryPreferences::new().with(EMAIL_KEY, "gone@b.c");
    let mut d = dialog(prefs, FakeApi::default());
    block_on(d.open());
    assert_eq!(d.status(), DialogStatus::Unsubscribed);
    assert_eq!(d.prefs().get(EMAIL_KEY), None);
}

#[test]
fn check_failure_falls_back_to_unsubscribed_and_keeps_email() {
    let prefs = MemoryPreferences::new().with(EMAIL_KEY, "a@b.c");
    let mut d = dialog(prefs, FakeApi::offline());
    block_on(d.open());
    assert_eq!(d.status(), DialogStatus::Unsubscribed);
    assert_eq!(d.prefs().get(EMAIL_KEY).as_deref(), Some("a@b.c"));
}

// =============================================================
// Subscribe / unsubscribe
// =============================================================

#[test]
fn subscribe_remembers_email() {
    let mut d = dialog(MemoryPreferences::new(), FakeApi::default());
    block_on(d.open());
    d.set_email("new@b.c");

    let notice = block_on(d.subscribe());
    assert!(matches!(notice, Some(Notice::Success(_))));
    assert_eq!(d.status(), DialogStatus::Subscribed);
    assert_eq!(d.prefs().get(EMAIL_KEY).as_deref(), Some("new@b.c"));
    assert!(!d.is_busy());
}

#[test]
fn subscribe_with_blank_email_does_nothing() {
    let mut d = dialog(MemoryPreferences::new(), FakeApi::default());
    d.set_email("   ");
    assert_eq!(block_on(d.subscribe()), None);
    assert!(d.api.calls.borrow().is_empty());
}

#[test]
fn subscribe_failure_reports_error_message() {
    let mut d = dialog(MemoryPreferences::new(), FakeApi::offline());
    block_on(d.open());
    d.set_email("x@y.z");

    let notice = block_on(d.subscribe());
    assert_eq!(notice, Some(Notice::Error("Subscription failed: network error: offline".into())));
    assert_eq!(d.status(), DialogStatus::Unsubscribed);
    assert_eq!(d.prefs().get(EMAIL_KEY), None);
}

#[test]
fn unsubscribe_clears_email_and_preference() {
    let prefs = MemoryPreferences::new().with(EMAIL_KEY, "a@b.c");
    let mut d = dialog(prefs, FakeApi::with_subscriber("a@b.c"));
    block_on(d.open());

    let notice = block_on(d.unsubscribe());
    assert!(matches!(notice, Some(Notice::Success(_))));
    assert_eq!(d.status(), DialogStatus::Unsubscribed);
    assert_eq!(d.email(), "");
    assert_eq!(d.prefs().get(EMAIL_KEY), None);
    assert!(d.api.subscribed.borrow().is_empty());
}

#[test]
fn use_another_email_is_local_only() {
    let prefs = MemoryPreferences::new().with(EMAIL_KEY, "a@b.c");
    let mut d = dialog(prefs, FakeApi::with_subscriber("a@b.c"));
    block_on(d.open());
    let calls_before = d.api.calls.borrow().len();

    d.use_another_email();
    assert_eq!(d.status(), DialogStatus::Unsubscribed);
    assert_eq!(d.email(), "");
    assert_eq!(d.prefs().get(EMAIL_KEY), None);
    assert_eq!(d.api.calls.borrow().len(), calls_before);
    assert_eq!(d.api.subscribed.borrow().len(), 1);
}
