//! Cascading selection over the environment → market configuration map
//!
//! The resolver never mutates the map. Whenever the governing selection
//! changes it hands back a [`ClearInstruction`] naming every path whose
//! values were derived from the previous selection, so the caller can drop
//! them before seeding the new ones.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;

use super::error::FormError;
use super::path::PropertyPath;

/// Connection details registered for one market
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketDetails {
    #[serde(alias = "hosturl")]
    pub host_url: String,
    pub token_url: String,
    #[serde(default)]
    pub app_ids: Vec<String>,
}

impl MarketDetails {
    /// Details as a defaults document keyed by form field name
    pub fn as_defaults(&self) -> Value {
        json!({
            "hostUrl": self.host_url,
            "tokenUrl": self.token_url,
            "appIds": self.app_ids,
        })
    }
}

/// environment → market → details
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigurationMap {
    environments: HashMap<String, HashMap<String, MarketDetails>>,
}

impl ConfigurationMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, environment: &str, market: &str, details: MarketDetails) {
        self.environments
            .entry(environment.to_string())
            .or_default()
            .insert(market.to_string(), details);
    }

    /// Replace every market of one environment
    pub fn set_environment(&mut self, environment: &str, markets: HashMap<String, MarketDetails>) {
        self.environments.insert(environment.to_string(), markets);
    }

    /// Environment keys in sorted order
    pub fn environments(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.environments.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn markets(&self, environment: &str) -> Option<&HashMap<String, MarketDetails>> {
        self.environments.get(environment)
    }

    pub fn is_empty(&self) -> bool {
        self.environments.is_empty()
    }

    /// Iterate `(environment, market, details)` triples
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str, &MarketDetails)> {
        self.environments.iter().flat_map(|(env, markets)| {
            markets
                .iter()
                .map(move |(market, details)| (env.as_str(), market.as_str(), details))
        })
    }
}

/// Markets registered under `primary`, sorted. Unknown keys yield no options.
pub fn list_secondary_keys(map: &ConfigurationMap, primary: &str) -> Vec<String> {
    let mut keys: Vec<String> = map
        .markets(primary)
        .map(|markets| markets.keys().cloned().collect())
        .unwrap_or_default();
    keys.sort();
    keys
}

pub fn resolve_details<'a>(
    map: &'a ConfigurationMap,
    primary: &str,
    secondary: &str,
) -> Result<&'a MarketDetails, FormError> {
    map.markets(primary)
        .and_then(|markets| markets.get(secondary))
        .ok_or_else(|| FormError::not_found("market", format!("{}/{}", primary, secondary)))
}

/// User-facing form of a market key; the lookup key is left untouched.
pub fn display_key(key: &str) -> String {
    key.to_uppercase()
}

/// An option of a select input
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    pub fn market(key: &str) -> Self {
        Self {
            value: key.to_string(),
            label: display_key(key),
        }
    }
}

/// Paths whose values must be dropped before the new selection applies
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClearInstruction {
    pub paths: Vec<PropertyPath>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PrimaryChange {
    pub secondary_keys: Vec<String>,
    pub clear: ClearInstruction,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SecondaryChange {
    pub details: MarketDetails,
    pub clear: ClearInstruction,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    pub primary: Option<String>,
    pub secondary: Option<String>,
}

/// Tracks the two-level selection of one form.
#[derive(Clone, Debug)]
pub struct CascadingResolver {
    selection: Selection,
    secondary_field: PropertyPath,
    dependent: Vec<PropertyPath>,
}

impl CascadingResolver {
    /// `dependent` lists the roots of every field seeded from market details.
    pub fn new(secondary_field: PropertyPath, dependent: Vec<PropertyPath>) -> Self {
        Self {
            selection: Selection::default(),
            secondary_field,
            dependent,
        }
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Select an environment. Always resets the market and its dependents.
    pub fn select_primary(&mut self, map: &ConfigurationMap, key: &str) -> PrimaryChange {
        self.selection.primary = (!key.is_empty()).then(|| key.to_string());
        self.selection.secondary = None;

        let mut paths = vec![self.secondary_field.clone()];
        paths.extend(self.dependent.iter().cloned());

        PrimaryChange {
            secondary_keys: list_secondary_keys(map, key),
            clear: ClearInstruction { paths },
        }
    }

    /// Select a market under the current environment.
    pub fn select_secondary(
        &mut self,
        map: &ConfigurationMap,
        key: &str,
    ) -> Result<SecondaryChange, FormError> {
        let primary = self
            .selection
            .primary
            .clone()
            .ok_or_else(|| FormError::not_found("environment", "<none>"))?;
        let details = resolve_details(map, &primary, key)?.clone();

        self.selection.secondary = Some(key.to_string());

        Ok(SecondaryChange {
            details,
            clear: ClearInstruction {
                paths: self.dependent.clone(),
            },
        })
    }

    /// Market options for the current environment
    pub fn secondary_options(&self, map: &ConfigurationMap) -> Vec<SelectOption> {
        self.selection
            .primary
            .as_deref()
            .map(|primary| {
                list_secondary_keys(map, primary)
                    .iter()
                    .map(|key| SelectOption::market(key))
                    .collect()
            })
            .unwrap_or_default()
    }
}
