//! In-process document store.

#[cfg(test)]
#[path = "memory_test.rs"]
mod tests;

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::{RwLock, broadcast};

use super::{CHANGE_CHANNEL_CAPACITY, ChangeEvent, DocumentStore, StoreError, Watch, merge_documents, publish};

pub struct MemoryStore {
    collections: RwLock<HashMap<String, BTreeMap<String, Value>>>,
    changes: broadcast::Sender<ChangeEvent>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self { collections: RwLock::new(HashMap::new()), changes }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections.get(collection).and_then(|docs| docs.get(id)).cloned())
    }

    async fn set(&self, collection: &str, id: &str, data: Value, merge: bool) -> Result<(), StoreError> {
        let stored = {
            let mut collections = self.collections.write().await;
            let docs = collections.entry(collection.to_owned()).or_default();
            let next = if merge { merge_documents(docs.remove(id), data) } else { data };
            docs.insert(id.to_owned(), next.clone());
            next
        };
        publish(
            &self.changes,
            ChangeEvent { collection: collection.to_owned(), id: id.to_owned(), data: Some(stored) },
        );
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let removed = {
            let mut collections = self.collections.write().await;
            collections.get_mut(collection).and_then(|docs| docs.remove(id)).is_some()
        };
        if removed {
            publish(&self.changes, ChangeEvent { collection: collection.to_owned(), id: id.to_owned(), data: None });
        }
        Ok(())
    }

    async fn list(&self, collection: &str) -> Result<Vec<(String, Value)>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|docs| docs.iter().map(|(id, v)| (id.clone(), v.clone())).collect())
            .unwrap_or_default())
    }

    fn watch(&self, collection: &str) -> Watch {
        Watch::new(collection, self.changes.subscribe())
    }
}
