//! Document store: JSON documents addressed by collection path and id.
//!
//! DESIGN
//! ======
//! Collection paths are slash-separated, e.g. `projects`,
//! `projects/<pid>/files`, `projects/<pid>/subscribers`. A write with
//! `merge` shallow-merges the top-level keys of an object into the existing
//! document instead of replacing it. Every successful write or delete is
//! published to watchers of its collection.
//!
//! Two backends: [`memory::MemoryStore`] (no database configured, tests) and
//! [`postgres::PgStore`] (one JSONB row per document).

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::warn;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Capacity of the change broadcast channel.
pub(crate) const CHANGE_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// A write or delete observed by watchers. `data` is the document after the
/// change, `None` for deletes.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeEvent {
    pub collection: String,
    pub id: String,
    pub data: Option<Value>,
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError>;

    async fn set(&self, collection: &str, id: &str, data: Value, merge: bool) -> Result<(), StoreError>;

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError>;

    /// All documents of a collection ordered by id.
    async fn list(&self, collection: &str) -> Result<Vec<(String, Value)>, StoreError>;

    /// Stream of changes to one collection.
    fn watch(&self, collection: &str) -> Watch;
}

/// Receiver side of [`DocumentStore::watch`].
pub struct Watch {
    collection: String,
    rx: broadcast::Receiver<ChangeEvent>,
}

impl Watch {
    pub(crate) fn new(collection: &str, rx: broadcast::Receiver<ChangeEvent>) -> Self {
        Self { collection: collection.to_owned(), rx }
    }

    /// Next change to the watched collection, `None` once the store is gone.
    /// Events dropped because the watcher fell behind are skipped.
    pub async fn next(&mut self) -> Option<ChangeEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) if event.collection == self.collection => return Some(event),
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(collection = %self.collection, skipped, "document watcher lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

/// Shallow merge: top-level keys of `incoming` overwrite those of `existing`.
/// Non-object values replace the document wholesale.
#[must_use]
pub fn merge_documents(existing: Option<Value>, incoming: Value) -> Value {
    match (existing, incoming) {
        (Some(Value::Object(mut base)), Value::Object(patch)) => {
            base.extend(patch);
            Value::Object(base)
        }
        (_, incoming) => incoming,
    }
}

/// Publish a change; having no watchers is not an error.
pub(crate) fn publish(tx: &broadcast::Sender<ChangeEvent>, event: ChangeEvent) {
    if tx.send(event).is_err() {
        tracing::trace!("document change had no watchers");
    }
}
