//! Client side of project notification subscriptions.
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`dialog`] | Subscription dialog state machine |
//! | [`api`] | Subscribe / unsubscribe / check calls |
//! | [`prefs`] | Injected persistent preference store |

pub mod api;
pub mod dialog;
pub mod prefs;

pub use api::{ApiError, SubscriptionApi};
pub use dialog::{DialogStatus, Notice, SubscriptionDialog};
pub use prefs::{EMAIL_KEY, MemoryPreferences, PreferenceStore};
