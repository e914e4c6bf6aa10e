//! Run-scoped table registry
//!
//! Every table loaded during one generation run lives in a slot of this
//! arena and is addressed by a [`TableId`]. Relations store ids instead of
//! references, so mutually referencing tables need no shared ownership.
//!
//! A slot is reserved before the loader recurses into other tables. A
//! table that refers back to one still being loaded gets the reserved id,
//! which is what makes cyclic schemas terminate.

use crate::schema::table::TableDefinition;
use serde::Serialize;
use std::collections::HashMap;

/// Handle of a table in a [`TableRegistry`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TableId(usize);

impl TableId {
    /// Position of the slot in the registry
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Lifecycle of a registry slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    /// Reserved, recursion into related tables still in progress
    Loading,
    /// Fully loaded
    Loaded,
    /// Loading aborted; the slot is no longer reachable by name
    Failed,
}

#[derive(Debug)]
struct Slot {
    state: SlotState,
    table: TableDefinition,
}

/// Arena of tables loaded during one run
#[derive(Debug, Default)]
pub struct TableRegistry {
    slots: Vec<Slot>,
    by_name: HashMap<String, TableId>,
}

impl TableRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Id of a reserved or loaded table
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<TableId> {
        self.by_name.get(name).copied()
    }

    /// Table stored under `id`
    #[must_use]
    pub fn table(&self, id: TableId) -> &TableDefinition {
        &self.slots[id.0].table
    }

    /// Mutable table stored under `id`
    pub fn table_mut(&mut self, id: TableId) -> &mut TableDefinition {
        &mut self.slots[id.0].table
    }

    /// Current state of the slot
    #[must_use]
    pub fn state(&self, id: TableId) -> SlotState {
        self.slots[id.0].state
    }

    /// Loaded table by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&TableDefinition> {
        self.lookup(name)
            .filter(|id| self.state(*id) == SlotState::Loaded)
            .map(|id| self.table(id))
    }

    /// Number of slots, failed ones included
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether nothing has been reserved yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Ids and tables of every loaded slot, in load order
    pub fn loaded(&self) -> impl Iterator<Item = (TableId, &TableDefinition)> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.state == SlotState::Loaded)
            .map(|(index, slot)| (TableId(index), &slot.table))
    }

    pub(crate) fn reserve(&mut self, name: &str, table: TableDefinition) -> TableId {
        let id = TableId(self.slots.len());
        self.slots.push(Slot {
            state: SlotState::Loading,
            table,
        });
        self.by_name.insert(name.to_string(), id);
        id
    }

    pub(crate) fn mark_loaded(&mut self, id: TableId) {
        self.slots[id.0].state = SlotState::Loaded;
    }

    pub(crate) fn mark_failed(&mut self, id: TableId) {
        self.slots[id.0].state = SlotState::Failed;
        self.by_name.retain(|_, existing| *existing != id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::LoadOptions;
    use crate::schema::document::TableDocument;

    fn table(name: &str) -> TableDefinition {
        let mut doc = TableDocument::default();
        doc.table.name = name.to_string();
        TableDefinition::from_document(name, &doc, &LoadOptions::default()).unwrap()
    }

    #[test]
    fn test_reserve_then_load() {
        let mut registry = TableRegistry::new();
        assert!(registry.is_empty());

        let id = registry.reserve("sys_user", table("sys_user"));
        assert_eq!(registry.lookup("sys_user"), Some(id));
        assert_eq!(registry.state(id), SlotState::Loading);
        assert!(registry.get("sys_user").is_none());

        registry.mark_loaded(id);
        assert_eq!(registry.get("sys_user").map(|t| t.class_name.as_str()), Some("SysUser"));
        assert_eq!(registry.loaded().count(), 1);
    }

    #[test]
    fn test_failed_slot_is_forgotten_by_name() {
        let mut registry = TableRegistry::new();
        let id = registry.reserve("broken", table("broken"));
        registry.mark_failed(id);
        assert_eq!(registry.lookup("broken"), None);
        assert_eq!(registry.state(id), SlotState::Failed);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.loaded().count(), 0);
    }
}
