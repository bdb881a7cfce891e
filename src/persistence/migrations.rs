//! Schema migrations for the record store

use std::collections::HashMap;

use crate::persistence::error::PersistenceError;
use crate::persistence::pool::ConnectionPool;
use sqlx::Row;

const TRACKING_TABLE: &str = "CREATE TABLE IF NOT EXISTS _dynform_migrations (
    name VARCHAR(128) PRIMARY KEY,
    applied_at VARCHAR(64) NOT NULL,
    checksum VARCHAR(64) NOT NULL
)";

struct Migration {
    name: &'static str,
    checksum: &'static str,
    /// Executed one at a time; not every driver accepts batches
    statements: &'static [&'static str],
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        name: "001_form_records",
        checksum: "v1",
        statements: &["CREATE TABLE IF NOT EXISTS form_records (
            id VARCHAR(64) PRIMARY KEY,
            data TEXT NOT NULL,
            created_at VARCHAR(64) NOT NULL,
            updated_at VARCHAR(64) NOT NULL
        )"],
    },
    Migration {
        name: "002_form_records_updated_index",
        checksum: "v1",
        statements: &["CREATE INDEX idx_form_records_updated ON form_records(updated_at)"],
    },
];

/// Applies pending migrations and records them in `_dynform_migrations`
pub struct MigrationRunner {
    pool: ConnectionPool,
}

impl MigrationRunner {
    pub fn new(pool: ConnectionPool) -> Self {
        Self { pool }
    }

    pub async fn migrate_up(&self) -> Result<MigrationResult, PersistenceError> {
        let done = self.applied().await?;
        let mut result = MigrationResult { applied: 0, skipped: 0 };

        for migration in MIGRATIONS {
            if done.contains_key(migration.name) {
                tracing::debug!("Migration '{}' already applied", migration.name);
                result.skipped += 1;
                continue;
            }

            for statement in migration.statements {
                sqlx::query(statement)
                    .execute(self.pool.pool())
                    .await
                    .map_err(|e| PersistenceError::Migration(format!("{}: {}", migration.name, e)))?;
            }

            sqlx::query("INSERT INTO _dynform_migrations (name, applied_at, checksum) VALUES (?, ?, ?)")
                .bind(migration.name)
                .bind(chrono::Utc::now().to_rfc3339())
                .bind(migration.checksum)
                .execute(self.pool.pool())
                .await
                .map_err(|e| PersistenceError::Migration(format!("recording {}: {}", migration.name, e)))?;

            tracing::info!("Applied migration '{}'", migration.name);
            result.applied += 1;
        }

        Ok(result)
    }

    pub async fn status(&self) -> Result<Vec<MigrationStatus>, PersistenceError> {
        let mut done = self.applied().await?;
        Ok(MIGRATIONS
            .iter()
            .map(|m| {
                let applied_at = done.remove(m.name);
                MigrationStatus {
                    name: m.name.to_string(),
                    applied: applied_at.is_some(),
                    applied_at,
                }
            })
            .collect())
    }

    /// Applied migration names with their timestamps
    async fn applied(&self) -> Result<HashMap<String, String>, PersistenceError> {
        sqlx::query(TRACKING_TABLE)
            .execute(self.pool.pool())
            .await
            .map_err(|e| PersistenceError::Migration(format!("tracking table: {}", e)))?;

        let rows = sqlx::query("SELECT name, applied_at FROM _dynform_migrations")
            .fetch_all(self.pool.pool())
            .await
            .map_err(|e| PersistenceError::Migration(format!("reading tracking table: {}", e)))?;

        rows.iter()
            .map(|row| Ok((row.try_get("name")?, row.try_get("applied_at")?)))
            .collect::<Result<_, sqlx::Error>>()
            .map_err(PersistenceError::from)
    }
}

#[derive(Debug)]
pub struct MigrationResult {
    pub applied: usize,
    /// Already applied before this run
    pub skipped: usize,
}

#[derive(Debug, Clone)]
pub struct MigrationStatus {
    pub name: String,
    pub applied: bool,
    pub applied_at: Option<String>,
}
