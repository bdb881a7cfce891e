//! Form definitions: the field schema plus the optional cascading block

use serde::{Deserialize, Serialize};

use super::cascade::Selection;
use super::path::{PathSegment, PropertyPath};
use super::schema::{validate_fields, FieldKind, FieldSchema, SchemaError};

/// The environment → market selection chain and the fields it governs
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CascadeSpec {
    #[serde(default = "default_primary_field")]
    pub primary_field: String,
    #[serde(default = "default_primary_options")]
    pub primary_options: Vec<String>,
    #[serde(default = "default_secondary_field")]
    pub secondary_field: String,
    /// Fields shown once a market is selected, seeded from its details
    #[serde(default)]
    pub dependent: Vec<FieldSchema>,
}

fn default_primary_field() -> String {
    "environment".to_string()
}

fn default_secondary_field() -> String {
    "market".to_string()
}

pub fn default_primary_options() -> Vec<String> {
    ["dev", "qa", "pro", "staging"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl CascadeSpec {
    pub fn primary_path(&self) -> PropertyPath {
        PropertyPath::root().push_property(&self.primary_field)
    }

    pub fn secondary_path(&self) -> PropertyPath {
        PropertyPath::root().push_property(&self.secondary_field)
    }

    pub fn dependent_roots(&self) -> Vec<PropertyPath> {
        self.dependent
            .iter()
            .map(|f| PropertyPath::root().push_property(&f.name))
            .collect()
    }
}

/// Everything needed to render one form
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FormDefinition {
    /// Always-visible fields, rendered first
    pub fields: Vec<FieldSchema>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cascade: Option<CascadeSpec>,
}

impl FormDefinition {
    pub fn from_fields(fields: Vec<FieldSchema>) -> Self {
        Self { fields, cascade: None }
    }

    /// The service configuration form: name and description, then
    /// environment → market, then the market-dependent connection block.
    pub fn market_configuration(environments: Vec<String>) -> Self {
        Self {
            fields: vec![
                FieldSchema::string("name", "").with_label("Name").required(),
                FieldSchema::string("description", "")
                    .with_label("Description")
                    .required(),
            ],
            cascade: Some(CascadeSpec {
                primary_field: default_primary_field(),
                primary_options: environments,
                secondary_field: default_secondary_field(),
                dependent: vec![
                    FieldSchema::string("hostUrl", "").with_label("Host URL").required(),
                    FieldSchema::array(
                        "appIds",
                        FieldSchema::string("", "").with_label("App ID").required(),
                    )
                    .with_label("App IDs"),
                    FieldSchema::string("tokenUrl", "")
                        .with_label("Token URL")
                        .required(),
                ],
            }),
        }
    }

    /// Check every field, including the selection fields, as one sibling set.
    pub fn validate(&self) -> Result<(), SchemaError> {
        let mut all = self.fields.clone();
        if let Some(cascade) = &self.cascade {
            all.push(FieldSchema::string(&cascade.primary_field, ""));
            all.push(FieldSchema::string(&cascade.secondary_field, ""));
            all.extend(cascade.dependent.iter().cloned());
        }
        validate_fields(&all)
    }

    /// Schema node addressed by a concrete path, following list ordinals
    /// into item schemas. Selection fields are not schema nodes.
    pub fn field_at(&self, path: &PropertyPath) -> Option<&FieldSchema> {
        let mut segments = path.segments();
        let first = match segments.next()? {
            PathSegment::Property(name) => name,
            _ => return None,
        };

        let dependent = self
            .cascade
            .as_ref()
            .map(|c| c.dependent.as_slice())
            .unwrap_or(&[]);
        let mut node = self
            .fields
            .iter()
            .chain(dependent.iter())
            .find(|f| &f.name == first)?;

        for segment in segments {
            node = match (segment, node.kind) {
                (PathSegment::Property(name), FieldKind::Object) => {
                    node.children().iter().find(|c| &c.name == name)?
                }
                (PathSegment::Index(_) | PathSegment::Wildcard, FieldKind::Array) => {
                    node.item_schema.as_deref()?
                }
                _ => return None,
            };
        }

        Some(node)
    }

    /// Required paths of the fields visible under `selection`. List items
    /// are addressed with `[*]`.
    pub fn required_paths(&self, selection: &Selection) -> Vec<PropertyPath> {
        let mut paths = Vec::new();
        collect_required(&self.fields, &PropertyPath::root(), &mut paths);
        if let Some(cascade) = &self.cascade {
            paths.push(cascade.primary_path());
            if selection.primary.is_some() {
                paths.push(cascade.secondary_path());
            }
            if selection.secondary.is_some() {
                collect_required(&cascade.dependent, &PropertyPath::root(), &mut paths);
            }
        }
        paths
    }
}

fn collect_required(fields: &[FieldSchema], parent: &PropertyPath, out: &mut Vec<PropertyPath>) {
    for field in fields {
        collect_required_node(field, &parent.push_property(&field.name), out);
    }
}

fn collect_required_node(field: &FieldSchema, path: &PropertyPath, out: &mut Vec<PropertyPath>) {
    match field.kind {
        FieldKind::Object => collect_required(field.children(), path, out),
        FieldKind::Array => {
            if let Some(item) = field.item_schema.as_deref() {
                collect_required_node(item, &path.push_wildcard(), out);
            }
        }
        _ => {
            if field.required {
                out.push(path.clone());
            }
        }
    }
}
