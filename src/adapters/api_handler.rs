//! REST API handlers for the form backend
//!
//! Serves the configuration map, the form definition, and create / read /
//! update of submitted records.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::{Record, RecordStore};
use crate::form::cascade::ConfigurationMap;
use crate::form::definition::FormDefinition;
use crate::persistence::PersistenceError;

/// Shared application state for API handlers
#[derive(Clone)]
pub struct ApiState {
    pub configs: Arc<RwLock<ConfigurationMap>>,
    pub definition: Arc<FormDefinition>,
    pub records: Arc<dyn RecordStore>,
}

// ============================================================================
// Response Types
// ============================================================================

#[derive(Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

impl<T> ApiResponse<T> {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }

    /// Unwrap the payload of a successful response
    pub fn into_result(self) -> anyhow::Result<T> {
        match (self.success, self.data) {
            (true, Some(data)) => Ok(data),
            _ => Err(anyhow::anyhow!(
                "{}",
                self.error.unwrap_or_else(|| "Empty response".to_string())
            )),
        }
    }
}

fn status_for(err: &anyhow::Error) -> StatusCode {
    err.downcast_ref::<PersistenceError>()
        .map(PersistenceError::status_code)
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/configs - The environment → market configuration map
pub async fn get_configs(State(state): State<ApiState>) -> impl IntoResponse {
    let configs = state.configs.read().await;
    (StatusCode::OK, Json(ApiResponse::success(configs.clone())))
}

/// GET /api/form - The served form definition
pub async fn get_form(State(state): State<ApiState>) -> impl IntoResponse {
    (StatusCode::OK, Json(ApiResponse::success(state.definition.as_ref().clone())))
}

/// POST /api/records - Store a new form document
pub async fn create_record(State(state): State<ApiState>, Json(document): Json<Value>) -> impl IntoResponse {
    match state.records.create(document).await {
        Ok(record) => {
            tracing::info!("Created record '{}'", record.id);
            (StatusCode::CREATED, Json(ApiResponse::success(record)))
        }
        Err(e) => {
            tracing::warn!("Failed to create record: {}", e);
            (status_for(&e), Json(ApiResponse::<Record>::error(e.to_string())))
        }
    }
}

/// GET /api/records/:id - Fetch one record
pub async fn get_record(State(state): State<ApiState>, Path(id): Path<String>) -> impl IntoResponse {
    match state.records.get(&id).await {
        Ok(Some(record)) => (StatusCode::OK, Json(ApiResponse::success(record))),
        Ok(None) => (StatusCode::NOT_FOUND, Json(ApiResponse::<Record>::error("Record not found"))),
        Err(e) => (status_for(&e), Json(ApiResponse::<Record>::error(e.to_string()))),
    }
}

/// PUT /api/records/:id - Replace a record's document
pub async fn update_record(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Json(document): Json<Value>,
) -> impl IntoResponse {
    match state.records.update(&id, document).await {
        Ok(record) => {
            tracing::info!("Updated record '{}'", record.id);
            (StatusCode::OK, Json(ApiResponse::success(record)))
        }
        Err(e) => {
            tracing::warn!("Failed to update record '{}': {}", id, e);
            (status_for(&e), Json(ApiResponse::<Record>::error(e.to_string())))
        }
    }
}
