//! Repository for submitted form records

use crate::domain::{Record, RecordStore};
use crate::persistence::error::PersistenceError;
use crate::persistence::pool::ConnectionPool;
use async_trait::async_trait;
use serde_json::Value;
use sqlx::Row;

/// SQLx-backed storage for form documents
pub struct SqlxRecordRepository {
    pool: ConnectionPool,
}

impl SqlxRecordRepository {
    pub fn new(pool: ConnectionPool) -> Self {
        Self { pool }
    }

    fn parse_row(row: &sqlx::any::AnyRow) -> Result<Record, PersistenceError> {
        let data_str: String = row.try_get("data")?;
        let data: Value = serde_json::from_str(&data_str)?;

        Ok(Record {
            id: row.try_get("id")?,
            data,
            created_at: Some(row.try_get("created_at")?),
            updated_at: Some(row.try_get("updated_at")?),
        })
    }

    fn encode(document: &Value) -> Result<String, PersistenceError> {
        if !document.is_object() {
            return Err(PersistenceError::InvalidDocument(
                "form documents must be JSON objects".to_string(),
            ));
        }
        Ok(serde_json::to_string(document)?)
    }

    pub async fn find(&self, id: &str) -> Result<Option<Record>, PersistenceError> {
        let row = sqlx::query("SELECT id, data, created_at, updated_at FROM form_records WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool.pool())
            .await?;

        row.as_ref().map(Self::parse_row).transpose()
    }

    pub async fn insert(&self, document: &Value) -> Result<Record, PersistenceError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = chrono::Utc::now().to_rfc3339();
        let data_str = Self::encode(document)?;

        sqlx::query("INSERT INTO form_records (id, data, created_at, updated_at) VALUES (?, ?, ?, ?)")
            .bind(&id)
            .bind(&data_str)
            .bind(&now)
            .bind(&now)
            .execute(self.pool.pool())
            .await?;

        tracing::debug!("Created form record '{}'", id);
        Ok(Record {
            id,
            data: document.clone(),
            created_at: Some(now.clone()),
            updated_at: Some(now),
        })
    }

    pub async fn replace(&self, id: &str, document: &Value) -> Result<Record, PersistenceError> {
        let now = chrono::Utc::now().to_rfc3339();
        let data_str = Self::encode(document)?;

        let result = sqlx::query("UPDATE form_records SET data = ?, updated_at = ? WHERE id = ?")
            .bind(&data_str)
            .bind(&now)
            .bind(id)
            .execute(self.pool.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(PersistenceError::NotFound { id: id.to_string() });
        }

        tracing::debug!("Updated form record '{}'", id);
        self.find(id)
            .await?
            .ok_or_else(|| PersistenceError::NotFound { id: id.to_string() })
    }

    pub async fn count(&self) -> Result<usize, PersistenceError> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM form_records")
            .fetch_one(self.pool.pool())
            .await?;
        let count: i64 = row.try_get("count")?;
        Ok(count as usize)
    }
}

#[async_trait]
impl RecordStore for SqlxRecordRepository {
    async fn create(&self, document: Value) -> anyhow::Result<Record> {
        Ok(self.insert(&document).await?)
    }

    async fn update(&self, id: &str, document: Value) -> anyhow::Result<Record> {
        Ok(self.replace(id, &document).await?)
    }

    async fn get(&self, id: &str) -> anyhow::Result<Option<Record>> {
        Ok(self.find(id).await?)
    }
}
