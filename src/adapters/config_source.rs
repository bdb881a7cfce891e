//! Configuration map sources

use async_trait::async_trait;
use std::path::PathBuf;

use crate::adapters::api_handler::ApiResponse;
use crate::domain::ConfigSource;
use crate::form::cascade::ConfigurationMap;

/// Reads the map from a file, or a directory with one file per environment
pub struct FileConfigSource {
    path: PathBuf,
}

impl FileConfigSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ConfigSource for FileConfigSource {
    async fn fetch(&self) -> anyhow::Result<ConfigurationMap> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || crate::config::load_configuration_map(&path)).await?
    }
}

/// A map held in memory
pub struct StaticConfigSource {
    map: ConfigurationMap,
}

impl StaticConfigSource {
    pub fn new(map: ConfigurationMap) -> Self {
        Self { map }
    }
}

#[async_trait]
impl ConfigSource for StaticConfigSource {
    async fn fetch(&self) -> anyhow::Result<ConfigurationMap> {
        Ok(self.map.clone())
    }
}

/// Fetches `GET {base_url}/api/configs` from a running backend
pub struct HttpConfigSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpConfigSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ConfigSource for HttpConfigSource {
    async fn fetch(&self) -> anyhow::Result<ConfigurationMap> {
        let url = format!("{}/api/configs", self.base_url);
        tracing::debug!("Fetching configuration map from {}", url);

        let response = self.client.get(&url).send().await?.error_for_status()?;
        let body: ApiResponse<ConfigurationMap> = response.json().await?;
        body.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::cascade::list_secondary_keys;

    #[tokio::test]
    async fn test_file_source_reads_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("configs.json");
        std::fs::write(
            &path,
            r#"{ "dev": { "eu": { "hostUrl": "h1", "tokenUrl": "t1", "appIds": ["a"] } } }"#,
        )
        .unwrap();

        let map = FileConfigSource::new(&path).fetch().await.unwrap();
        assert_eq!(list_secondary_keys(&map, "dev"), vec!["eu"]);
    }

    #[tokio::test]
    async fn test_file_source_missing_file() {
        let source = FileConfigSource::new("/nonexistent/configs.json");
        assert!(source.fetch().await.is_err());
    }

    #[tokio::test]
    async fn test_http_source_unreachable() {
        let source = HttpConfigSource::new("http://127.0.0.1:1/");
        assert!(source.fetch().await.is_err());
    }
}
