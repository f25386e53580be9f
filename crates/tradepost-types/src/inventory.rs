//! Inventory types: one entry per (actor, resource) pair, and the locked
//! snapshot a trade works against.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{ActorId, Resource};

/// The quantity of one resource held by one actor.
///
/// A zero quantity is valid and retained; entries are never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryEntry {
    pub actor_id: ActorId,
    pub resource: Resource,
    pub quantity: u32,
}

/// Inventory rows locked for the lifetime of a trade transaction, keyed by
/// actor then resource name.
///
/// Absence means "no usable stock": the row does not exist, holds zero, or
/// belongs to a quarantined actor. There are no zero-value placeholders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockedInventory {
    entries: BTreeMap<ActorId, BTreeMap<String, InventoryEntry>>,
}

impl LockedInventory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a locked row. A later row for the same pair replaces the earlier one.
    pub fn insert(&mut self, entry: InventoryEntry) {
        self.entries
            .entry(entry.actor_id)
            .or_default()
            .insert(entry.resource.name.clone(), entry);
    }

    /// Look up the locked row for `(actor, resource)`.
    #[must_use]
    pub fn get(&self, actor: ActorId, resource: &str) -> Option<&InventoryEntry> {
        self.entries.get(&actor).and_then(|held| held.get(resource))
    }

    /// All locked rows of one actor, ordered by resource name.
    #[must_use]
    pub fn holdings(&self, actor: ActorId) -> Option<&BTreeMap<String, InventoryEntry>> {
        self.entries.get(&actor)
    }

    /// Total number of locked rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.values().map(BTreeMap::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FromIterator<InventoryEntry> for LockedInventory {
    fn from_iter<I: IntoIterator<Item = InventoryEntry>>(iter: I) -> Self {
        let mut locked = Self::new();
        for entry in iter {
            locked.insert(entry);
        }
        locked
    }
}
