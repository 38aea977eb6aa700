//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds the document store behind a trait object (Postgres or in-memory),
//! the process configuration, and the lock that serializes version commits
//! so version numbers stay unique within a file.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::Config;
use crate::store::DocumentStore;

/// Clone is required by Axum; all fields are `Arc`-wrapped.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub config: Arc<Config>,
    pub commit_lock: Arc<Mutex<()>>,
}

impl AppState {
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>, config: Config) -> Self {
        Self { store, config: Arc::new(config), commit_lock: Arc::new(Mutex::new(())) }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
