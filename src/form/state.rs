//! Authoritative path → value store for a single form

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

use super::path::PropertyPath;

/// Leaf values of a form keyed by their property path.
///
/// Leaves are only ever created through [`FormState::set`]; clearing a subtree
/// removes its leaves for good.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FormState {
    leaves: BTreeMap<PropertyPath, Value>,
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &PropertyPath) -> Option<&Value> {
        self.leaves.get(path)
    }

    pub fn contains(&self, path: &PropertyPath) -> bool {
        self.leaves.contains_key(path)
    }

    /// Overwrite or create a leaf, returning the previous value.
    pub fn set(&mut self, path: PropertyPath, value: Value) -> Option<Value> {
        self.leaves.insert(path, value)
    }

    /// Remove every leaf at or below `prefix`. Returns the number removed.
    pub fn clear_subtree(&mut self, prefix: &PropertyPath) -> usize {
        let before = self.leaves.len();
        self.leaves.retain(|path, _| !path.starts_with(prefix));
        before - self.leaves.len()
    }

    /// Move every leaf under `from` so it sits under `to` instead.
    pub fn rename_subtree(&mut self, from: &PropertyPath, to: &PropertyPath) {
        let moved: Vec<PropertyPath> = self
            .leaves
            .keys()
            .filter(|path| path.starts_with(from))
            .cloned()
            .collect();

        for old in moved {
            if let (Some(value), Some(new)) = (self.leaves.remove(&old), old.replace_prefix(from, to)) {
                self.leaves.insert(new, value);
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PropertyPath, &Value)> {
        self.leaves.iter()
    }

    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    /// Flattened copy of every leaf, keyed by the rendered path string
    pub fn snapshot(&self) -> BTreeMap<String, Value> {
        self.leaves
            .iter()
            .map(|(path, value)| (path.to_string(), value.clone()))
            .collect()
    }
}
