//! Dynamic list editing
//!
//! Every array field that is currently rendered owns a [`DynamicList`]: an
//! ordered sequence of item identities. The identity is minted once per item
//! and never reused, so a row keeps its identity when earlier rows disappear.
//! Item values live in [`FormState`] under `list[ordinal]`; removing an item
//! clears its subtree and re-keys every later item one ordinal down.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

use super::error::FormError;
use super::path::PropertyPath;
use super::schema::FieldSchema;
use super::seed::{seed_field, Seeds};
use super::state::FormState;

/// Stable identity of a list item
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ItemId(u64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "item-{}", self.0)
    }
}

/// An item as seen by the renderer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ListItem {
    pub identity: ItemId,
    pub position: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListStatus {
    Empty,
    Populated(usize),
}

/// Ordered item identities of one list instance
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DynamicList {
    items: Vec<ItemId>,
}

impl DynamicList {
    pub fn status(&self) -> ListStatus {
        match self.items.len() {
            0 => ListStatus::Empty,
            n => ListStatus::Populated(n),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items in ascending ordinal order
    pub fn items(&self) -> impl Iterator<Item = ListItem> + '_ {
        self.items
            .iter()
            .enumerate()
            .map(|(position, &identity)| ListItem { identity, position })
    }

    pub fn position_of(&self, identity: ItemId) -> Option<usize> {
        self.items.iter().position(|&id| id == identity)
    }
}

/// All list instances of a form plus the form-private identity counter.
#[derive(Clone, Debug, Default)]
pub struct ListEditor {
    lists: BTreeMap<PropertyPath, DynamicList>,
    next_identity: u64,
}

impl ListEditor {
    pub fn new() -> Self {
        Self::default()
    }

    fn mint(&mut self) -> ItemId {
        let id = ItemId(self.next_identity);
        self.next_identity += 1;
        id
    }

    pub fn list(&self, path: &PropertyPath) -> Option<&DynamicList> {
        self.lists.get(path)
    }

    /// Register an empty list at `path` if none exists yet.
    pub fn ensure_list(&mut self, path: &PropertyPath) {
        self.lists.entry(path.clone()).or_default();
    }

    /// Create the list at `path` with exactly one item per element.
    pub fn seed_list(
        &mut self,
        path: &PropertyPath,
        item_schema: &FieldSchema,
        elements: &[Value],
        state: &mut FormState,
    ) {
        self.clear_subtree(path, state);
        self.ensure_list(path);

        for element in elements {
            self.push_item(path, item_schema, Seeds::primary(element), state);
        }

        tracing::debug!("Seeded list '{}' with {} item(s)", path, elements.len());
    }

    /// Append a new item seeded from the item schema defaults.
    pub fn add(
        &mut self,
        path: &PropertyPath,
        item_schema: &FieldSchema,
        state: &mut FormState,
    ) -> Result<ItemId, FormError> {
        if !self.lists.contains_key(path) {
            return Err(FormError::not_found("list", path));
        }
        let identity = self.push_item(path, item_schema, Seeds::none(), state);
        tracing::debug!("Added {} to list '{}'", identity, path);
        Ok(identity)
    }

    fn push_item(
        &mut self,
        path: &PropertyPath,
        item_schema: &FieldSchema,
        seeds: Seeds<'_>,
        state: &mut FormState,
    ) -> ItemId {
        let identity = self.mint();
        let list = self.lists.entry(path.clone()).or_default();
        let position = list.items.len();
        list.items.push(identity);

        seed_field(item_schema, &path.push_index(position), seeds, state, self);
        identity
    }

    /// Remove the item with `identity`, shifting later items down one ordinal.
    pub fn remove(
        &mut self,
        path: &PropertyPath,
        identity: ItemId,
        state: &mut FormState,
    ) -> Result<usize, FormError> {
        let (position, former_len) = {
            let list = self
                .lists
                .get_mut(path)
                .ok_or_else(|| FormError::not_found("list", path))?;
            let position = list
                .position_of(identity)
                .ok_or_else(|| FormError::not_found("list item", identity))?;
            let former_len = list.items.len();
            list.items.remove(position);
            (position, former_len)
        };

        let removed = path.push_index(position);
        state.clear_subtree(&removed);
        self.drop_lists_under(&removed);

        for ordinal in position + 1..former_len {
            let from = path.push_index(ordinal);
            let to = path.push_index(ordinal - 1);
            state.rename_subtree(&from, &to);
            self.rename_lists_under(&from, &to);
        }

        tracing::debug!("Removed {} from list '{}' at position {}", identity, path, position);
        Ok(position)
    }

    /// Drop every list at or below `prefix` together with its state leaves.
    pub fn clear_subtree(&mut self, prefix: &PropertyPath, state: &mut FormState) {
        state.clear_subtree(prefix);
        self.drop_lists_under(prefix);
    }

    fn drop_lists_under(&mut self, prefix: &PropertyPath) {
        self.lists.retain(|path, _| !path.starts_with(prefix));
    }

    fn rename_lists_under(&mut self, from: &PropertyPath, to: &PropertyPath) {
        let moved: Vec<PropertyPath> = self
            .lists
            .keys()
            .filter(|path| path.starts_with(from))
            .cloned()
            .collect();

        for old in moved {
            if let (Some(list), Some(new)) = (self.lists.remove(&old), old.replace_prefix(from, to)) {
                self.lists.insert(new, list);
            }
        }
    }
}
