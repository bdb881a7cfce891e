//! Field schema model
//!
//! A form is described by an ordered list of [`FieldSchema`] nodes. Primitive
//! nodes carry a default value, object nodes carry children and array nodes
//! carry a single item schema. Schemas are validated once at load time and are
//! immutable afterwards.
//!
//! Two JSON spellings are accepted:
//!
//! ```json
//! { "name": "hobbies", "type": "array", "items": [{ "type": "string", "value": "" }] }
//! { "name": "hobbies", "kind": "array", "itemSchema": { "kind": "string", "defaultValue": "" } }
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use thiserror::Error;

use super::path::PropertyPath;

/// Structural problems in a field schema. Always fatal for rendering.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    #[error("Invalid field at '{path}': {reason}")]
    InvalidField { path: String, reason: String },

    #[error("Duplicate field name '{name}' at '{path}'")]
    DuplicateName { path: String, name: String },

    #[error("Malformed schema document: {0}")]
    Parse(String),
}

impl SchemaError {
    fn invalid(path: &PropertyPath, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            path: display_path(path),
            reason: reason.into(),
        }
    }
}

fn display_path(path: &PropertyPath) -> String {
    if path.is_root() {
        "<root>".to_string()
    } else {
        path.to_string()
    }
}

/// Kind of a field
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    String,
    Number,
    Boolean,
    Object,
    Array,
}

impl FieldKind {
    pub fn is_primitive(self) -> bool {
        matches!(self, FieldKind::String | FieldKind::Number | FieldKind::Boolean)
    }

    pub fn type_name(self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::Number => "number",
            FieldKind::Boolean => "boolean",
            FieldKind::Object => "object",
            FieldKind::Array => "array",
        }
    }

    /// Whether `value` may be stored in a leaf of this kind
    pub fn accepts(self, value: &Value) -> bool {
        match self {
            FieldKind::String => value.is_string(),
            FieldKind::Number => value.is_number() || value.is_null(),
            FieldKind::Boolean => value.is_boolean(),
            FieldKind::Object | FieldKind::Array => false,
        }
    }
}

/// A node of the form schema
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSchema {
    /// Identifier, unique among siblings. Empty for list item schemas.
    #[serde(default)]
    pub name: String,

    #[serde(alias = "type")]
    pub kind: FieldKind,

    /// Display label; falls back to `name`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,

    #[serde(default, alias = "value", skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,

    #[serde(default, alias = "fields", skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<FieldSchema>>,

    #[serde(
        default,
        alias = "items",
        deserialize_with = "deserialize_item_schema",
        skip_serializing_if = "Option::is_none"
    )]
    pub item_schema: Option<Box<FieldSchema>>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ItemSchemaRepr {
    One(Box<FieldSchema>),
    Many(Vec<FieldSchema>),
}

fn deserialize_item_schema<'de, D>(deserializer: D) -> Result<Option<Box<FieldSchema>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<ItemSchemaRepr>::deserialize(deserializer)? {
        None => Ok(None),
        Some(ItemSchemaRepr::One(item)) => Ok(Some(item)),
        Some(ItemSchemaRepr::Many(mut items)) => {
            if items.len() != 1 {
                return Err(serde::de::Error::custom(format!(
                    "array items must describe exactly one element schema, found {}",
                    items.len()
                )));
            }
            Ok(items.pop().map(Box::new))
        }
    }
}

impl FieldSchema {
    pub fn string(name: &str, default: &str) -> Self {
        Self::primitive(name, FieldKind::String, Some(Value::String(default.to_string())))
    }

    pub fn number(name: &str, default: Option<f64>) -> Self {
        let default = default
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .unwrap_or(Value::Null);
        Self::primitive(name, FieldKind::Number, Some(default))
    }

    pub fn boolean(name: &str, default: bool) -> Self {
        Self::primitive(name, FieldKind::Boolean, Some(Value::Bool(default)))
    }

    pub fn object(name: &str, children: Vec<FieldSchema>) -> Self {
        Self {
            name: name.to_string(),
            kind: FieldKind::Object,
            label: None,
            required: false,
            default_value: None,
            children: Some(children),
            item_schema: None,
        }
    }

    pub fn array(name: &str, item: FieldSchema) -> Self {
        Self {
            name: name.to_string(),
            kind: FieldKind::Array,
            label: None,
            required: false,
            default_value: None,
            children: None,
            item_schema: Some(Box::new(item)),
        }
    }

    fn primitive(name: &str, kind: FieldKind, default_value: Option<Value>) -> Self {
        Self {
            name: name.to_string(),
            kind,
            label: None,
            required: false,
            default_value,
            children: None,
            item_schema: None,
        }
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }

    pub fn is_primitive(&self) -> bool {
        self.kind.is_primitive()
    }

    /// Value a freshly seeded leaf takes when nothing else supplies one
    pub fn leaf_default(&self) -> Value {
        self.default_value.clone().unwrap_or(Value::Null)
    }

    pub fn children(&self) -> &[FieldSchema] {
        self.children.as_deref().unwrap_or(&[])
    }

    /// Recursively check the kind/payload invariant and sibling uniqueness.
    pub fn validate(&self) -> Result<(), SchemaError> {
        self.validate_at(&PropertyPath::root().push_property(&self.name), true)
    }

    fn validate_at(&self, path: &PropertyPath, named: bool) -> Result<(), SchemaError> {
        if named && self.name.is_empty() {
            return Err(SchemaError::invalid(path, "field name must not be empty"));
        }
        // Names are path segments; these characters would alias another path
        if named && self.name.contains(['.', '[', ']']) {
            return Err(SchemaError::invalid(
                path,
                format!("field name '{}' must not contain '.', '[' or ']'", self.name),
            ));
        }

        let has_default = self.default_value.is_some();
        let has_children = self.children.is_some();
        let has_item = self.item_schema.is_some();

        match self.kind {
            FieldKind::String | FieldKind::Number | FieldKind::Boolean => {
                if has_children || has_item {
                    return Err(SchemaError::invalid(
                        path,
                        format!("{} field cannot declare children or an item schema", self.kind.type_name()),
                    ));
                }
                match &self.default_value {
                    Some(value) if !self.kind.accepts(value) => {
                        return Err(SchemaError::invalid(
                            path,
                            format!("default {} is not a {}", value, self.kind.type_name()),
                        ));
                    }
                    None if self.kind != FieldKind::Number => {
                        return Err(SchemaError::invalid(
                            path,
                            format!("{} field requires a default value", self.kind.type_name()),
                        ));
                    }
                    _ => {}
                }
            }
            FieldKind::Object => {
                if has_default || has_item {
                    return Err(SchemaError::invalid(
                        path,
                        "object field cannot declare a default value or an item schema",
                    ));
                }
                let children = self
                    .children
                    .as_ref()
                    .ok_or_else(|| SchemaError::invalid(path, "object field requires children"))?;
                validate_siblings(children, path)?;
            }
            FieldKind::Array => {
                if has_default || has_children {
                    return Err(SchemaError::invalid(
                        path,
                        "array field cannot declare a default value or children",
                    ));
                }
                let item = self
                    .item_schema
                    .as_ref()
                    .ok_or_else(|| SchemaError::invalid(path, "array field requires an item schema"))?;
                item.validate_at(&path.push_wildcard(), false)?;
            }
        }

        Ok(())
    }
}

fn validate_siblings(fields: &[FieldSchema], parent: &PropertyPath) -> Result<(), SchemaError> {
    let mut seen = HashSet::new();
    for field in fields {
        let path = parent.push_property(&field.name);
        if !seen.insert(field.name.as_str()) {
            return Err(SchemaError::DuplicateName {
                path: display_path(parent),
                name: field.name.clone(),
            });
        }
        field.validate_at(&path, true)?;
    }
    Ok(())
}

/// Validate a top-level field list.
pub fn validate_fields(fields: &[FieldSchema]) -> Result<(), SchemaError> {
    validate_siblings(fields, &PropertyPath::root())
}

/// Parse and validate a field list from JSON.
///
/// Accepts either a bare array of fields or an object with a `fields` array.
pub fn load_fields(value: &Value) -> Result<Vec<FieldSchema>, SchemaError> {
    let list = match value {
        Value::Array(_) => value.clone(),
        Value::Object(obj) => obj
            .get("fields")
            .cloned()
            .ok_or_else(|| SchemaError::Parse("expected a 'fields' array".to_string()))?,
        other => {
            return Err(SchemaError::Parse(format!(
                "expected an array of fields, got {}",
                other
            )))
        }
    };

    let fields: Vec<FieldSchema> =
        serde_json::from_value(list).map_err(|e| SchemaError::Parse(e.to_string()))?;
    validate_fields(&fields)?;
    Ok(fields)
}
