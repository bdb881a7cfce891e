use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub mod validator;

use crate::cli::Cli;
use crate::form::cascade::{ConfigurationMap, MarketDetails};
use crate::form::definition::{default_primary_options, FormDefinition};
use crate::persistence::PersistenceConfig;

#[derive(Debug, Deserialize, Serialize)]
pub struct Settings {
    pub server: ServerSettings,
    #[serde(default)]
    pub persistence: PersistenceConfig,
    #[serde(default)]
    pub form: FormSettings,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

/// What the served form looks like and where its configuration map lives
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FormSettings {
    /// Environment options offered by the first select
    #[serde(default = "default_primary_options")]
    pub environments: Vec<String>,
    /// Configuration map file, or a directory with one file per environment
    #[serde(default)]
    pub configs: Option<PathBuf>,
}

impl Default for FormSettings {
    fn default() -> Self {
        Self {
            environments: default_primary_options(),
            configs: None,
        }
    }
}

impl Settings {
    pub fn new() -> Result<Self, anyhow::Error> {
        Self::from_root(".")
    }

    /// Create settings from CLI arguments (includes config file and CLI overrides)
    pub fn new_with_cli(cli: &Cli) -> Result<Self, anyhow::Error> {
        let mut settings = Self::build(File::from(cli.config.clone()).required(false))?;

        // CLI > env vars > config file
        settings.apply_cli_overrides(cli);
        settings.validate()?;

        Ok(settings)
    }

    pub fn from_root(root: &str) -> Result<Self, anyhow::Error> {
        let config_path = Path::new(root).join("dynform");
        let mut settings = Self::build(File::from(config_path).required(false))?;

        // Relative map paths resolve against the root
        if let Some(configs) = settings.form.configs.as_mut() {
            if configs.is_relative() {
                *configs = Path::new(root).join(&*configs);
            }
        }

        settings.validate()?;
        Ok(settings)
    }

    fn build<S>(file: S) -> Result<Self, anyhow::Error>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("persistence.url", "sqlite::memory:")?
            .add_source(file)
            .add_source(
                Environment::with_prefix("DYNFORM")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(s.try_deserialize()?)
    }

    fn apply_cli_overrides(&mut self, cli: &Cli) {
        if let Some(host) = &cli.host {
            self.server.host = host.clone();
        }
        if let Some(port) = cli.port {
            self.server.port = port;
        }
        if let Some(url) = &cli.database_url {
            self.persistence.url = url.clone();
        }
        if let Some(configs) = &cli.configs {
            self.form.configs = Some(configs.clone());
        }
    }

    fn validate(&self) -> Result<(), anyhow::Error> {
        validator::ConfigValidator::validate(self).map_err(|errors| {
            let error_messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            anyhow::anyhow!(
                "Configuration validation failed:\n{}",
                error_messages.join("\n")
            )
        })
    }

    /// The form served by this instance
    pub fn form_definition(&self) -> FormDefinition {
        FormDefinition::market_configuration(self.form.environments.clone())
    }

    /// Read and validate the configured map. No path means an empty map.
    pub fn load_configuration_map(&self) -> Result<ConfigurationMap, anyhow::Error> {
        let map = match &self.form.configs {
            Some(path) => load_configuration_map(path)?,
            None => {
                tracing::warn!("No configuration map configured; market selection will be empty");
                ConfigurationMap::new()
            }
        };

        validator::ConfigValidator::validate_map(&map, &self.form.environments).map_err(|errors| {
            let error_messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            anyhow::anyhow!(
                "Configuration map validation failed:\n{}",
                error_messages.join("\n")
            )
        })?;

        Ok(map)
    }
}

fn parse_by_extension<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>, anyhow::Error> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
    if !matches!(ext, "json" | "yaml" | "yml" | "toml") {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path)?;
    let parsed = match ext {
        "json" => serde_json::from_str(&content)?,
        "toml" => toml::from_str(&content)?,
        _ => serde_yaml::from_str(&content)?,
    };
    Ok(Some(parsed))
}

/// Load a configuration map from a file holding the whole map, or from a
/// directory whose files are named after their environment and hold its
/// markets.
pub fn load_configuration_map(path: &Path) -> Result<ConfigurationMap, anyhow::Error> {
    if path.is_dir() {
        let mut map = ConfigurationMap::new();
        let pattern = format!("{}/*", path.display());
        for entry in glob::glob(&pattern)? {
            match entry {
                Ok(file) => {
                    let Some(environment) = file.file_stem().and_then(|s| s.to_str()).map(String::from) else {
                        continue;
                    };
                    if let Some(markets) = parse_by_extension::<HashMap<String, MarketDetails>>(&file)? {
                        tracing::debug!("Loaded {} market(s) for '{}'", markets.len(), environment);
                        map.set_environment(&environment, markets);
                    }
                }
                Err(e) => tracing::warn!("Failed to read glob entry: {}", e),
            }
        }
        tracing::info!("Loaded configuration map from directory {}", path.display());
        return Ok(map);
    }

    let map = parse_by_extension::<ConfigurationMap>(path)?.ok_or_else(|| {
        anyhow::anyhow!("Unsupported configuration map format: {}", path.display())
    })?;
    tracing::info!("Loaded configuration map from {}", path.display());
    Ok(map)
}
