//! Record store backed by the HTTP API

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;

use crate::adapters::api_handler::ApiResponse;
use crate::domain::{Record, RecordStore};

pub struct HttpRecordStore {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRecordStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn records_url(&self) -> String {
        format!("{}/api/records", self.base_url)
    }

    async fn parse(response: reqwest::Response) -> anyhow::Result<Record> {
        let status = response.status();
        let body: ApiResponse<Record> = response.json().await?;
        body.into_result()
            .map_err(|e| anyhow::anyhow!("Record request failed ({}): {}", status, e))
    }
}

#[async_trait]
impl RecordStore for HttpRecordStore {
    async fn create(&self, document: Value) -> anyhow::Result<Record> {
        let response = self.client.post(self.records_url()).json(&document).send().await?;
        Self::parse(response).await
    }

    async fn update(&self, id: &str, document: Value) -> anyhow::Result<Record> {
        let url = format!("{}/{}", self.records_url(), id);
        let response = self.client.put(url).json(&document).send().await?;
        Self::parse(response).await
    }

    async fn get(&self, id: &str) -> anyhow::Result<Option<Record>> {
        let url = format!("{}/{}", self.records_url(), id);
        let response = self.client.get(url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Self::parse(response).await.map(Some)
    }
}
