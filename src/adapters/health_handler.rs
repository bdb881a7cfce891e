//! Liveness and readiness probes for the form service

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;

use crate::form::cascade::ConfigurationMap;
use crate::persistence::DataStore;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub checks: HealthChecks,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthChecks {
    /// `ok` or `empty`
    pub configs: String,
    /// Environments present in the served configuration map
    pub environments: usize,
    /// `ok`, `not_configured` or `error: ...`
    pub database: String,
}

pub struct HealthHandler {
    configs: Arc<RwLock<ConfigurationMap>>,
    store: Option<DataStore>,
    started: Instant,
}

impl HealthHandler {
    pub fn new(configs: Arc<RwLock<ConfigurationMap>>, store: Option<DataStore>) -> Self {
        Self {
            configs,
            store,
            started: Instant::now(),
        }
    }

    async fn database_check(&self) -> Result<&'static str, String> {
        match &self.store {
            Some(store) => store.health_check().await.map(|_| "ok").map_err(|e| e.to_string()),
            None => Ok("not_configured"),
        }
    }

    async fn checks(&self) -> HealthChecks {
        let environments = self.configs.read().await.environments().len();
        HealthChecks {
            configs: if environments == 0 { "empty" } else { "ok" }.to_string(),
            environments,
            database: match self.database_check().await {
                Ok(state) => state.to_string(),
                Err(e) => format!("error: {}", e),
            },
        }
    }

    /// Always 200 while the process serves requests
    pub async fn health(&self) -> impl IntoResponse {
        let status = HealthStatus {
            status: "healthy".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: self.started.elapsed().as_secs(),
            checks: self.checks().await,
        };
        (StatusCode::OK, Json(status))
    }

    /// 503 while the record store does not answer
    pub async fn ready(&self) -> impl IntoResponse {
        match self.database_check().await {
            Ok(_) => (StatusCode::OK, Json(json!({ "status": "ready" }))),
            Err(e) => {
                tracing::warn!("Readiness check failed: {}", e);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(json!({ "status": "not_ready", "message": e })),
                )
            }
        }
    }

    pub async fn live(&self) -> impl IntoResponse {
        (StatusCode::OK, Json(json!({ "status": "alive" })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::PersistenceConfig;

    fn empty_configs() -> Arc<RwLock<ConfigurationMap>> {
        Arc::new(RwLock::new(ConfigurationMap::new()))
    }

    #[tokio::test]
    async fn test_checks_without_store() {
        let handler = HealthHandler::new(empty_configs(), None);
        let checks = handler.checks().await;
        assert_eq!(checks.configs, "empty");
        assert_eq!(checks.environments, 0);
        assert_eq!(checks.database, "not_configured");
        assert_eq!(handler.health().await.into_response().status(), StatusCode::OK);
        assert_eq!(handler.live().await.into_response().status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_ready_follows_store() {
        let store = DataStore::new(&PersistenceConfig::default()).await.unwrap();
        let handler = HealthHandler::new(empty_configs(), Some(store.clone()));
        assert_eq!(handler.ready().await.into_response().status(), StatusCode::OK);

        store.close().await;
        assert_eq!(
            handler.ready().await.into_response().status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
