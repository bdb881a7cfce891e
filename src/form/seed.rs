//! Initial value seeding for newly visible fields
//!
//! A primitive leaf takes the first value that fits its kind from, in order:
//! the existing record, the resolver-provided defaults, the schema default.
//! Lists get exactly one item per element found in the winning source.

use serde_json::Value;

use super::list::ListEditor;
use super::path::PropertyPath;
use super::schema::{FieldKind, FieldSchema};
use super::state::FormState;

/// Value sources for one subtree of the form
#[derive(Clone, Copy, Debug, Default)]
pub struct Seeds<'a> {
    pub record: Option<&'a Value>,
    pub defaults: Option<&'a Value>,
}

impl<'a> Seeds<'a> {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn new(record: Option<&'a Value>, defaults: Option<&'a Value>) -> Self {
        Self { record, defaults }
    }

    /// Seed from a single authoritative value (e.g. one list element)
    pub fn primary(value: &'a Value) -> Self {
        Self {
            record: Some(value),
            defaults: None,
        }
    }

    pub fn child(&self, name: &str) -> Self {
        Self {
            record: self.record.and_then(|v| v.get(name)),
            defaults: self.defaults.and_then(|v| v.get(name)),
        }
    }

    fn elements(&self) -> &'a [Value] {
        [self.record, self.defaults]
            .into_iter()
            .flatten()
            .find_map(|v| v.as_array())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn leaf(&self, field: &FieldSchema, path: &PropertyPath) -> Value {
        for candidate in [self.record, self.defaults].into_iter().flatten() {
            if field.kind.accepts(candidate) {
                return candidate.clone();
            }
            tracing::warn!(
                "Ignoring seed value {} for '{}': expected {}",
                candidate,
                path,
                field.kind.type_name()
            );
        }
        field.leaf_default()
    }
}

/// Write initial leaves (and register lists) for `field` rooted at `path`.
pub fn seed_field(
    field: &FieldSchema,
    path: &PropertyPath,
    seeds: Seeds<'_>,
    state: &mut FormState,
    lists: &mut ListEditor,
) {
    match field.kind {
        FieldKind::Object => {
            for child in field.children() {
                seed_field(
                    child,
                    &path.push_property(&child.name),
                    seeds.child(&child.name),
                    state,
                    lists,
                );
            }
        }
        FieldKind::Array => {
            if let Some(item) = field.item_schema.as_deref() {
                lists.seed_list(path, item, seeds.elements(), state);
            }
        }
        FieldKind::String | FieldKind::Number | FieldKind::Boolean => {
            state.set(path.clone(), seeds.leaf(field, path));
        }
    }
}

/// Seed a list of sibling fields under `parent`.
pub fn seed_fields(
    fields: &[FieldSchema],
    parent: &PropertyPath,
    seeds: Seeds<'_>,
    state: &mut FormState,
    lists: &mut ListEditor,
) {
    for field in fields {
        seed_field(
            field,
            &parent.push_property(&field.name),
            seeds.child(&field.name),
            state,
            lists,
        );
    }
}
