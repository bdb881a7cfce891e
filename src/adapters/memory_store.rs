use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::{Record, RecordStore};
use crate::persistence::PersistenceError;

/// Process-local record store
#[derive(Clone, Default)]
pub struct InMemoryRecordStore {
    records: Arc<RwLock<HashMap<String, Record>>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn create(&self, document: Value) -> anyhow::Result<Record> {
        let now = chrono::Utc::now().to_rfc3339();
        let record = Record {
            id: uuid::Uuid::new_v4().to_string(),
            data: document,
            created_at: Some(now.clone()),
            updated_at: Some(now),
        };
        self.records.write().await.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    async fn update(&self, id: &str, document: Value) -> anyhow::Result<Record> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(id)
            .ok_or_else(|| PersistenceError::NotFound { id: id.to_string() })?;
        record.data = document;
        record.updated_at = Some(chrono::Utc::now().to_rfc3339());
        Ok(record.clone())
    }

    async fn get(&self, id: &str) -> anyhow::Result<Option<Record>> {
        Ok(self.records.read().await.get(id).cloned())
    }
}
