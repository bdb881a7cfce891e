//! Connection pool for the record store

use crate::persistence::error::PersistenceError;
use sqlx::{any::AnyPoolOptions, AnyPool};
use std::time::Duration;

/// SQL backend behind an `Any` pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseBackend {
    Sqlite,
    Postgres,
    Mysql,
}

const SCHEMES: &[(&str, DatabaseBackend)] = &[
    ("sqlite", DatabaseBackend::Sqlite),
    ("postgres", DatabaseBackend::Postgres),
    ("postgresql", DatabaseBackend::Postgres),
    ("mysql", DatabaseBackend::Mysql),
    ("mariadb", DatabaseBackend::Mysql),
];

impl DatabaseBackend {
    /// Backend for a connection URL, judged by its scheme
    pub fn from_url(url: &str) -> Result<Self, PersistenceError> {
        let scheme = url.split(':').next().unwrap_or_default();
        SCHEMES
            .iter()
            .find(|(name, _)| *name == scheme)
            .map(|(_, backend)| *backend)
            .ok_or_else(|| {
                PersistenceError::Connection(format!(
                    "unsupported record store scheme '{}' (use sqlite, postgres or mysql)",
                    scheme
                ))
            })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Sqlite => "SQLite",
            Self::Postgres => "PostgreSQL",
            Self::Mysql => "MySQL",
        }
    }
}

#[derive(Clone)]
pub struct ConnectionPool {
    pool: AnyPool,
    backend: DatabaseBackend,
}

impl ConnectionPool {
    /// Open a pool for `url`.
    ///
    /// In-memory SQLite gets a single connection that never expires: each
    /// connection would see its own empty database, and dropping the last
    /// one discards every stored record.
    pub async fn new(url: &str, max_connections: u32, connect_timeout_secs: u64) -> Result<Self, PersistenceError> {
        sqlx::any::install_default_drivers();
        let backend = DatabaseBackend::from_url(url)?;

        let options = AnyPoolOptions::new().acquire_timeout(Duration::from_secs(connect_timeout_secs));
        let options = if url.contains(":memory:") {
            options.max_connections(1).idle_timeout(None).max_lifetime(None)
        } else {
            options.max_connections(max_connections)
        };

        tracing::debug!("Opening {} record store", backend.name());
        let pool = options
            .connect(url)
            .await
            .map_err(|e| PersistenceError::Connection(format!("{} connect failed: {}", backend.name(), e)))?;
        tracing::info!("Record store connected ({})", backend.name());

        Ok(Self { pool, backend })
    }

    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    pub fn backend(&self) -> DatabaseBackend {
        self.backend
    }

    pub async fn health_check(&self) -> Result<(), PersistenceError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(|e| PersistenceError::Connection(format!("record store unreachable: {}", e)))
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}
