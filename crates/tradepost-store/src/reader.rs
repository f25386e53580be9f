//! Inventory reader: lock and fetch the rows a trade touches.
//!
//! SQLite has no `SELECT ... FOR UPDATE`. The equivalent is to make the
//! transaction's first statement a write over exactly the rows about to be
//! read: a no-op `UPDATE` acquires the writer lock (SQLite escalates the row
//! intent to the whole database) and holds it until the transaction ends. A
//! second trade blocks on that statement until the first commits or rolls
//! back, bounded by the store's lock timeout.
//!
//! Actor ids and resource names are sorted and deduplicated before the
//! statements are built, and rows come back ordered by (actor, name), so
//! every trade requests its rows in the same global order.

use std::collections::BTreeSet;

use rusqlite::params_from_iter;
use rusqlite::types::Value;
use tradepost_types::{ActorId, InventoryEntry, LockedInventory, Resource, Result};

use crate::error::classify;
use crate::store::TradeTx;

/// Lock and return every usable row matching `actor_ids × resource_names`.
///
/// Rows with zero quantity and rows of quarantined actors are left out of
/// the result entirely.
pub fn lock_and_fetch<S: AsRef<str>>(
    tx: &TradeTx<'_>,
    actor_ids: &[ActorId],
    resource_names: &[S],
) -> Result<LockedInventory> {
    let conn = tx.conn();
    let timeout_ms = tx.lock_timeout_ms();

    let actors: BTreeSet<i64> = actor_ids.iter().map(|a| a.get()).collect();
    let names: BTreeSet<&str> = resource_names.iter().map(AsRef::<str>::as_ref).collect();

    let actor_list = placeholders(actors.len());
    let name_list = placeholders(names.len());
    let bound: Vec<Value> = actors
        .iter()
        .map(|id| Value::Integer(*id))
        .chain(names.iter().map(|name| Value::Text((*name).to_string())))
        .collect();

    let touched = conn
        .execute(
            &format!(
                "UPDATE inventory SET quantity = quantity
                  WHERE actor_id IN ({actor_list})
                    AND resource_id IN (SELECT id FROM resources WHERE name IN ({name_list}))"
            ),
            params_from_iter(bound.iter()),
        )
        .map_err(|e| classify(&e, "lock inventory", timeout_ms))?;

    let mut stmt = conn
        .prepare(&format!(
            "SELECT i.actor_id, r.name, r.value_weight, i.quantity
               FROM inventory i
               JOIN resources r ON r.id = i.resource_id
               JOIN actors a    ON a.id = i.actor_id
              WHERE i.actor_id IN ({actor_list})
                AND r.name IN ({name_list})
                AND i.quantity > 0
                AND a.quarantined = 0
              ORDER BY i.actor_id, r.name"
        ))
        .map_err(|e| classify(&e, "fetch inventory", timeout_ms))?;
    let rows = stmt
        .query_map(params_from_iter(bound.iter()), |row| {
            Ok(InventoryEntry {
                actor_id: ActorId(row.get(0)?),
                resource: Resource::new(row.get::<_, String>(1)?, row.get(2)?),
                quantity: row.get(3)?,
            })
        })
        .map_err(|e| classify(&e, "fetch inventory", timeout_ms))?;
    let locked = rows
        .collect::<rusqlite::Result<LockedInventory>>()
        .map_err(|e| classify(&e, "fetch inventory", timeout_ms))?;

    tracing::debug!(
        actors = actors.len(),
        resources = names.len(),
        touched,
        usable = locked.len(),
        "Inventory locked"
    );
    Ok(locked)
}

/// `?, ?, ?` for `n` values. An empty list becomes `NULL`, which matches nothing.
fn placeholders(n: usize) -> String {
    if n == 0 {
        return "NULL".to_string();
    }
    vec!["?"; n].join(", ")
}
