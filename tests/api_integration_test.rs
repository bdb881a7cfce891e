use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use dynform::adapters::api_handler::ApiState;
use dynform::adapters::health_handler::HealthHandler;
use dynform::adapters::memory_store::InMemoryRecordStore;
use dynform::form::cascade::ConfigurationMap;
use dynform::form::definition::{default_primary_options, FormDefinition};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower::util::ServiceExt;

fn app(store: InMemoryRecordStore) -> Router {
    let configs: ConfigurationMap = serde_json::from_value(json!({
        "dev": { "eu": { "hostUrl": "h1", "tokenUrl": "t1", "appIds": ["a", "b"] } }
    }))
    .unwrap();
    let configs = Arc::new(RwLock::new(configs));

    let health_handler = Arc::new(HealthHandler::new(configs.clone(), None));
    let api_state = ApiState {
        configs,
        definition: Arc::new(FormDefinition::market_configuration(default_primary_options())),
        records: Arc::new(store),
    };
    dynform::create_app(health_handler, api_state)
}

async fn call(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder()
        .uri(uri)
        .method(method)
        .header("Content-Type", "application/json")
        .body(match body {
            Some(body) => Body::from(body.to_string()),
            None => Body::empty(),
        })
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn test_get_configs() {
    let (status, body) = call(app(InMemoryRecordStore::new()), "GET", "/api/configs", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["dev"]["eu"]["hostUrl"], "h1");
    assert_eq!(body["data"]["dev"]["eu"]["appIds"], json!(["a", "b"]));
}

#[tokio::test]
async fn test_get_form_definition() {
    let (status, body) = call(app(InMemoryRecordStore::new()), "GET", "/api/form", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["fields"][0]["name"], "name");
    assert_eq!(body["data"]["cascade"]["primaryOptions"], json!(["dev", "qa", "pro", "staging"]));
}

#[tokio::test]
async fn test_record_lifecycle() {
    let store = InMemoryRecordStore::new();

    let (status, body) = call(
        app(store.clone()),
        "POST",
        "/api/records",
        Some(json!({ "name": "billing" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = call(
        app(store.clone()),
        "PUT",
        &format!("/api/records/{}", id),
        Some(json!({ "name": "billing-v2" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["data"]["name"], "billing-v2");

    let (status, body) = call(app(store.clone()), "GET", &format!("/api/records/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], id);
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn test_unknown_record() {
    let store = InMemoryRecordStore::new();

    let (status, body) = call(app(store.clone()), "GET", "/api/records/missing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);

    let (status, _) = call(app(store), "PUT", "/api/records/missing", Some(json!({}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health_routes() {
    let (status, body) = call(app(InMemoryRecordStore::new()), "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["checks"]["database"], "not_configured");

    let (status, _) = call(app(InMemoryRecordStore::new()), "GET", "/health/ready", None).await;
    assert_eq!(status, StatusCode::OK);
}
