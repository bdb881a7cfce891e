//! Field rendering
//!
//! Rendering is a pure projection of the schema, the form state and the list
//! editor into a tree of descriptors. It holds no state of its own; calling it
//! twice on the same inputs yields the same tree. A toolkit paints the tree
//! and reports edits back through `FormSession::set_value` using each input's
//! path.

use serde::Serialize;
use serde_json::{Map, Value};

use super::cascade::SelectOption;
use super::list::{ItemId, ListEditor};
use super::path::PropertyPath;
use super::schema::{FieldKind, FieldSchema};
use super::state::FormState;

/// A descriptor the rendering surface turns into widgets
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "widget", rename_all = "snake_case")]
pub enum RenderNode {
    /// Bound primitive input
    Input {
        path: PropertyPath,
        kind: FieldKind,
        label: String,
        value: Value,
        required: bool,
    },
    /// Bound choice among options
    Select {
        path: PropertyPath,
        label: String,
        value: Option<String>,
        options: Vec<SelectOption>,
    },
    /// Labelled group of an object's children
    Group {
        path: PropertyPath,
        label: String,
        children: Vec<RenderNode>,
    },
    /// Repeated items, keyed by identity
    List {
        path: PropertyPath,
        label: String,
        items: Vec<RenderedItem>,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RenderedItem {
    pub identity: ItemId,
    pub position: usize,
    pub node: RenderNode,
}

impl RenderNode {
    pub fn path(&self) -> &PropertyPath {
        match self {
            RenderNode::Input { path, .. }
            | RenderNode::Select { path, .. }
            | RenderNode::Group { path, .. }
            | RenderNode::List { path, .. } => path,
        }
    }

    /// Paths of every bound input or select at or below this node
    pub fn bound_paths(&self) -> Vec<PropertyPath> {
        let mut out = Vec::new();
        self.collect_bound(&mut out);
        out
    }

    fn collect_bound(&self, out: &mut Vec<PropertyPath>) {
        match self {
            RenderNode::Input { path, .. } | RenderNode::Select { path, .. } => out.push(path.clone()),
            RenderNode::Group { children, .. } => {
                for child in children {
                    child.collect_bound(out);
                }
            }
            RenderNode::List { items, .. } => {
                for item in items {
                    item.node.collect_bound(out);
                }
            }
        }
    }
}

/// Bound paths across a whole rendered form
pub fn bound_paths(nodes: &[RenderNode]) -> Vec<PropertyPath> {
    nodes.iter().flat_map(RenderNode::bound_paths).collect()
}

/// Read-only inputs of a render pass
#[derive(Clone, Copy)]
pub struct RenderContext<'a> {
    pub state: &'a FormState,
    pub lists: &'a ListEditor,
}

pub fn render_fields(fields: &[FieldSchema], parent: &PropertyPath, ctx: RenderContext<'_>) -> Vec<RenderNode> {
    fields
        .iter()
        .map(|field| render_field(field, &parent.push_property(&field.name), ctx))
        .collect()
}

pub fn render_field(field: &FieldSchema, path: &PropertyPath, ctx: RenderContext<'_>) -> RenderNode {
    let label = field.display_label().to_string();

    match field.kind {
        FieldKind::Object => RenderNode::Group {
            path: path.clone(),
            label,
            children: render_fields(field.children(), path, ctx),
        },
        FieldKind::Array => {
            let items = match (ctx.lists.list(path), field.item_schema.as_deref()) {
                (Some(list), Some(item_schema)) => list
                    .items()
                    .map(|item| RenderedItem {
                        identity: item.identity,
                        position: item.position,
                        node: render_field(item_schema, &path.push_index(item.position), ctx),
                    })
                    .collect(),
                _ => Vec::new(),
            };
            RenderNode::List {
                path: path.clone(),
                label,
                items,
            }
        }
        FieldKind::String | FieldKind::Number | FieldKind::Boolean => RenderNode::Input {
            path: path.clone(),
            kind: field.kind,
            label,
            value: ctx
                .state
                .get(path)
                .cloned()
                .unwrap_or_else(|| field.leaf_default()),
            required: field.required,
        },
    }
}

/// Assemble the nested JSON document for `fields` from the current state.
pub fn build_document(
    fields: &[FieldSchema],
    parent: &PropertyPath,
    ctx: RenderContext<'_>,
    out: &mut Map<String, Value>,
) {
    for field in fields {
        let path = parent.push_property(&field.name);
        out.insert(field.name.clone(), build_value(field, &path, ctx));
    }
}

fn build_value(field: &FieldSchema, path: &PropertyPath, ctx: RenderContext<'_>) -> Value {
    match field.kind {
        FieldKind::Object => {
            let mut obj = Map::new();
            build_document(field.children(), path, ctx, &mut obj);
            Value::Object(obj)
        }
        FieldKind::Array => {
            let (Some(list), Some(item_schema)) = (ctx.lists.list(path), field.item_schema.as_deref())
            else {
                return Value::Array(Vec::new());
            };
            Value::Array(
                list.items()
                    .map(|item| build_value(item_schema, &path.push_index(item.position), ctx))
                    .collect(),
            )
        }
        _ => ctx.state.get(path).cloned().unwrap_or(Value::Null),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::seed::{seed_fields, Seeds};
    use serde_json::json;

    fn sample_fields() -> Vec<FieldSchema> {
        vec![
            FieldSchema::string("firstName", ""),
            FieldSchema::number("age", None),
            FieldSchema::object(
                "address",
                vec![FieldSchema::string("street", ""), FieldSchema::string("city", "")],
            ),
            FieldSchema::array("hobbies", FieldSchema::string("", "")),
        ]
    }

    fn seeded(record: &Value) -> (FormState, ListEditor) {
        let mut state = FormState::new();
        let mut lists = ListEditor::new();
        seed_fields(
            &sample_fields(),
            &PropertyPath::root(),
            Seeds::new(Some(record), None),
            &mut state,
            &mut lists,
        );
        (state, lists)
    }

    #[test]
    fn test_one_bound_leaf_per_primitive() {
        let (state, lists) = seeded(&json!({ "hobbies": ["ski", "chess"] }));
        let ctx = RenderContext { state: &state, lists: &lists };
        let nodes = render_fields(&sample_fields(), &PropertyPath::root(), ctx);

        let paths: Vec<String> = bound_paths(&nodes).iter().map(|p| p.to_string()).collect();
        assert_eq!(
            paths,
            vec!["firstName", "age", "address.street", "address.city", "hobbies[0]", "hobbies[1]"]
        );
        let state_paths: Vec<String> = state.iter().map(|(p, _)| p.to_string()).collect();
        let mut sorted = paths.clone();
        sorted.sort();
        let mut state_sorted = state_paths;
        state_sorted.sort();
        assert_eq!(sorted, state_sorted);
    }

    #[test]
    fn test_render_is_deterministic() {
        let (state, lists) = seeded(&json!({ "firstName": "Ada", "hobbies": ["x"] }));
        let ctx = RenderContext { state: &state, lists: &lists };
        let first = render_fields(&sample_fields(), &PropertyPath::root(), ctx);
        let second = render_fields(&sample_fields(), &PropertyPath::root(), ctx);
        assert_eq!(first, second);
    }

    #[test]
    fn test_list_items_carry_identity() {
        let (state, lists) = seeded(&json!({ "hobbies": ["ski", "chess"] }));
        let ctx = RenderContext { state: &state, lists: &lists };
        let node = render_field(&sample_fields()[3], &PropertyPath::parse("hobbies"), ctx);

        let RenderNode::List { items, .. } = node else {
            panic!("expected list node");
        };
        assert_eq!(items.len(), 2);
        assert_ne!(items[0].identity, items[1].identity);
        assert_eq!(items[1].position, 1);
        assert!(matches!(&items[1].node, RenderNode::Input { value, .. } if value == &json!("chess")));
    }

    #[test]
    fn test_build_document() {
        let (state, lists) = seeded(&json!({
            "firstName": "Ada",
            "address": { "city": "London" },
            "hobbies": []
        }));
        let ctx = RenderContext { state: &state, lists: &lists };
        let mut doc = Map::new();
        build_document(&sample_fields(), &PropertyPath::root(), ctx, &mut doc);

        assert_eq!(
            Value::Object(doc),
            json!({
                "firstName": "Ada",
                "age": null,
                "address": { "street": "", "city": "London" },
                "hobbies": []
            })
        );
    }
}
