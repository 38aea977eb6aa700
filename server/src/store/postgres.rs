//! Postgres document store: one JSONB row per document in `documents`.
//!
//! Merge writes use `jsonb ||`, which is the same shallow top-level merge as
//! [`super::merge_documents`] for object documents. Change events are
//! published to watchers in this process only.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;
use sqlx::types::Json;
use tokio::sync::broadcast;

use super::{CHANGE_CHANNEL_CAPACITY, ChangeEvent, DocumentStore, StoreError, Watch, publish};

pub struct PgStore {
    pool: PgPool,
    changes: broadcast::Sender<ChangeEvent>,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self { pool, changes }
    }
}

#[async_trait]
impl DocumentStore for PgStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        let row = sqlx::query_as::<_, (Json<Value>,)>("SELECT data FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|(Json(data),)| data))
    }

    async fn set(&self, collection: &str, id: &str, data: Value, merge: bool) -> Result<(), StoreError> {
        let sql = if merge {
            "INSERT INTO documents (collection, id, data) VALUES ($1, $2, $3)
             ON CONFLICT (collection, id) DO UPDATE
             SET data = CASE
                     WHEN jsonb_typeof(documents.data) = 'object' AND jsonb_typeof(EXCLUDED.data) = 'object'
                     THEN documents.data || EXCLUDED.data
                     ELSE EXCLUDED.data
                 END,
                 updated_at = now()
             RETURNING data"
        } else {
            "INSERT INTO documents (collection, id, data) VALUES ($1, $2, $3)
             ON CONFLICT (collection, id) DO UPDATE SET data = EXCLUDED.data, updated_at = now()
             RETURNING data"
        };
        let (Json(stored),) = sqlx::query_as::<_, (Json<Value>,)>(sql)
            .bind(collection)
            .bind(id)
            .bind(Json(data))
            .fetch_one(&self.pool)
            .await?;
        publish(
            &self.changes,
            ChangeEvent { collection: collection.to_owned(), id: id.to_owned(), data: Some(stored) },
        );
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() > 0 {
            publish(&self.changes, ChangeEvent { collection: collection.to_owned(), id: id.to_owned(), data: None });
        }
        Ok(())
    }

    async fn list(&self, collection: &str) -> Result<Vec<(String, Value)>, StoreError> {
        let rows = sqlx::query_as::<_, (String, Json<Value>)>(
            "SELECT id, data FROM documents WHERE collection = $1 ORDER BY id",
        )
        .bind(collection)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|(id, Json(data))| (id, data)).collect())
    }

    fn watch(&self, collection: &str) -> Watch {
        Watch::new(collection, self.changes.subscribe())
    }
}
