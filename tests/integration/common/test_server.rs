use dynform::adapters::{api_handler::ApiState, health_handler::HealthHandler};
use dynform::form::cascade::ConfigurationMap;
use dynform::form::definition::{default_primary_options, FormDefinition};
use dynform::persistence::{DataStore, PersistenceConfig};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::RwLock;

pub struct TestServer {
    pub base_url: String,
    pub store: DataStore,
}

pub fn sample_map() -> ConfigurationMap {
    serde_json::from_value(json!({
        "dev": {
            "eu": { "hostUrl": "h1", "tokenUrl": "t1", "appIds": ["a", "b"] }
        }
    }))
    .unwrap()
}

impl TestServer {
    pub async fn new() -> Self {
        let store = DataStore::connect(&PersistenceConfig::default()).await.unwrap();
        let configs = Arc::new(RwLock::new(sample_map()));

        let health_handler = Arc::new(HealthHandler::new(configs.clone(), Some(store.clone())));
        let api_state = ApiState {
            configs,
            definition: Arc::new(FormDefinition::market_configuration(default_primary_options())),
            records: store.records().clone(),
        };
        let app = dynform::create_app(health_handler, api_state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        TestServer { base_url, store }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}
