use std::collections::HashSet;
use thiserror::Error;

use crate::config::{ServerSettings, Settings};
use crate::form::cascade::ConfigurationMap;
use crate::persistence::DatabaseBackend;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Cross-reference error: {0}")]
    CrossReference(String),

    #[error("Duplicate entry: {0}")]
    Duplicate(String),
}

pub struct ConfigValidator;

impl ConfigValidator {
    pub fn validate(settings: &Settings) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = Self::validate_server(&settings.server) {
            errors.extend(e);
        }

        if let Err(e) = DatabaseBackend::from_url(&settings.persistence.url) {
            errors.push(ValidationError::InvalidValue {
                field: "persistence.url".to_string(),
                reason: e.to_string(),
            });
        }

        if let Err(e) = Self::validate_environments(&settings.form.environments) {
            errors.extend(e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_server(server: &ServerSettings) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if server.host.is_empty() {
            errors.push(ValidationError::MissingField("server.host".to_string()));
        }

        if server.port == 0 {
            errors.push(ValidationError::InvalidValue {
                field: "server.port".to_string(),
                reason: "Port must be greater than 0".to_string(),
            });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_environments(environments: &[String]) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if environments.is_empty() {
            errors.push(ValidationError::MissingField("form.environments".to_string()));
        }

        let mut seen = HashSet::new();
        for env in environments {
            if env.trim().is_empty() {
                errors.push(ValidationError::InvalidValue {
                    field: "form.environments".to_string(),
                    reason: "Environment names cannot be empty".to_string(),
                });
            } else if !seen.insert(env.as_str()) {
                errors.push(ValidationError::Duplicate(format!("environment '{}'", env)));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Every environment must be offered by the form and every market must
    /// carry both URLs.
    pub fn validate_map(map: &ConfigurationMap, environments: &[String]) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        for env in map.environments() {
            if !environments.contains(&env) {
                errors.push(ValidationError::CrossReference(format!(
                    "Configuration map environment '{}' is not one of the form's environments",
                    env
                )));
            }
        }

        let mut entries: Vec<_> = map.entries().collect();
        entries.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));
        for (env, market, details) in entries {
            if details.host_url.trim().is_empty() {
                errors.push(ValidationError::MissingField(format!("{}.{}.hostUrl", env, market)));
            }
            if details.token_url.trim().is_empty() {
                errors.push(ValidationError::MissingField(format!("{}.{}.tokenUrl", env, market)));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
