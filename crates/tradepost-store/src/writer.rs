//! Inventory writer: moves a bundle from giver to receiver.
//!
//! Runs inside the same [`TradeTx`] that locked the rows, so the decrement
//! and the lock are consistent. For each line item:
//!
//! 1. Debit the giver. The `quantity_non_negative` CHECK is the backstop;
//!    tripping it surfaces as `InsufficientStock`, never as a store error.
//! 2. Credit the receiver: read the row, insert it at zero if absent, then
//!    add the quantity. All three steps happen under the trade's lock.

use rusqlite::{Connection, OptionalExtension, params};
use tradepost_types::{ActorId, Bundle, Result, TradepostError};

use crate::error::{classify, is_constraint};
use crate::store::TradeTx;

/// Transfer every line of `bundle` from `giver` to `receiver`.
pub fn transfer(
    tx: &TradeTx<'_>,
    giver: ActorId,
    receiver: ActorId,
    bundle: &Bundle,
) -> Result<()> {
    let conn = tx.conn();
    let timeout_ms = tx.lock_timeout_ms();

    for item in bundle.items() {
        let resource_id = resource_id(conn, &item.resource, timeout_ms)?;
        let held = row_quantity(conn, giver, resource_id)
            .map_err(|e| classify(&e, "read inventory", timeout_ms))?
            .ok_or_else(|| TradepostError::ItemNotInInventory {
                resource: item.resource.clone(),
                actor: giver,
            })?;

        let moved = debit(conn, giver, resource_id, item.quantity)
            .and_then(|()| credit(conn, receiver, resource_id, item.quantity));
        if let Err(e) = moved {
            if is_constraint(&e) {
                tracing::warn!(
                    giver = %giver,
                    resource = %item.resource,
                    requested = item.quantity,
                    held,
                    "Transfer rejected by stock constraint"
                );
                return Err(TradepostError::InsufficientStock {
                    resource: item.resource.clone(),
                    actor: giver,
                    requested: u64::from(item.quantity),
                    available: u64::from(held),
                });
            }
            return Err(classify(&e, "transfer stock", timeout_ms));
        }

        tracing::debug!(
            giver = %giver,
            receiver = %receiver,
            resource = %item.resource,
            quantity = item.quantity,
            "Line item transferred"
        );
    }
    Ok(())
}

/// Catalog id for `name`, or `UnknownResources` if there is none.
pub(crate) fn resource_id(conn: &Connection, name: &str, timeout_ms: u64) -> Result<i64> {
    conn.query_row(
        "SELECT id FROM resources WHERE name = ?1",
        params![name],
        |row| row.get(0),
    )
    .optional()
    .map_err(|e| classify(&e, "read catalog", timeout_ms))?
    .ok_or_else(|| TradepostError::UnknownResources {
        names: vec![name.to_string()],
    })
}

fn row_quantity(
    conn: &Connection,
    actor: ActorId,
    resource_id: i64,
) -> rusqlite::Result<Option<u32>> {
    conn.query_row(
        "SELECT quantity FROM inventory WHERE actor_id = ?1 AND resource_id = ?2",
        params![actor.get(), resource_id],
        |row| row.get(0),
    )
    .optional()
}

fn debit(
    conn: &Connection,
    actor: ActorId,
    resource_id: i64,
    quantity: u32,
) -> rusqlite::Result<()> {
    conn.execute(
        "UPDATE inventory SET quantity = quantity - ?1 WHERE actor_id = ?2 AND resource_id = ?3",
        params![quantity, actor.get(), resource_id],
    )?;
    Ok(())
}

/// Get-or-create the receiver's row, then add `quantity`.
pub(crate) fn credit(
    conn: &Connection,
    actor: ActorId,
    resource_id: i64,
    quantity: u32,
) -> rusqlite::Result<()> {
    if row_quantity(conn, actor, resource_id)?.is_none() {
        conn.execute(
            "INSERT INTO inventory (actor_id, resource_id, quantity) VALUES (?1, ?2, 0)",
            params![actor.get(), resource_id],
        )?;
    }
    conn.execute(
        "UPDATE inventory SET quantity = quantity + ?1 WHERE actor_id = ?2 AND resource_id = ?3",
        params![quantity, actor.get(), resource_id],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Store;
    use tradepost_types::{LineItem, TradepostConfig};

    fn setup() -> (Store, ActorId, ActorId) {
        let store = Store::open_in_memory(100).unwrap();
        store.migrate(&TradepostConfig::default().catalog).unwrap();
        let alice = store.register_actor("Alice").unwrap();
        let bob = store.register_actor("Bob").unwrap();
        store.grant(alice, "Medication", 5).unwrap();
        (store, alice, bob)
    }

    #[test]
    fn transfer_debits_giver_and_creates_receiver_row() {
        let (mut store, alice, bob) = setup();
        let tx = store.begin().unwrap();
        transfer(&tx, alice, bob, &Bundle::new(vec![LineItem::new("Medication", 3)])).unwrap();
        tx.commit().unwrap();

        assert_eq!(store.quantity_of(alice, "Medication").unwrap(), Some(2));
        assert_eq!(store.quantity_of(bob, "Medication").unwrap(), Some(3));
    }

    #[test]
    fn full_debit_leaves_zero_row() {
        let (mut store, alice, bob) = setup();
        let tx = store.begin().unwrap();
        transfer(&tx, alice, bob, &Bundle::new(vec![LineItem::new("Medication", 5)])).unwrap();
        tx.commit().unwrap();

        assert_eq!(store.quantity_of(alice, "Medication").unwrap(), Some(0));
    }

    #[test]
    fn overdraw_is_insufficient_stock() {
        let (mut store, alice, bob) = setup();
        let tx = store.begin().unwrap();
        let err = transfer(&tx, alice, bob, &Bundle::new(vec![LineItem::new("Medication", 6)]))
            .unwrap_err();
        assert_eq!(
            err,
            TradepostError::InsufficientStock {
                resource: "Medication".into(),
                actor: alice,
                requested: 6,
                available: 5,
            }
        );
        drop(tx);
        assert_eq!(store.quantity_of(alice, "Medication").unwrap(), Some(5));
        assert_eq!(store.quantity_of(bob, "Medication").unwrap(), None);
    }

    #[test]
    fn repeated_lines_overdraw_on_second_debit() {
        let (mut store, alice, bob) = setup();
        let tx = store.begin().unwrap();
        let bundle = Bundle::new(vec![
            LineItem::new("Medication", 3),
            LineItem::new("Medication", 3),
        ]);
        let err = transfer(&tx, alice, bob, &bundle).unwrap_err();
        assert!(matches!(err, TradepostError::InsufficientStock { available: 2, .. }));
    }

    #[test]
    fn missing_giver_row_is_item_not_found() {
        let (mut store, alice, bob) = setup();
        let tx = store.begin().unwrap();
        let err = transfer(&tx, bob, alice, &Bundle::new(vec![LineItem::new("Water", 1)]))
            .unwrap_err();
        assert!(matches!(err, TradepostError::ItemNotInInventory { actor, .. } if actor == bob));
    }

    #[test]
    fn unknown_resource_is_reported() {
        let (mut store, alice, bob) = setup();
        let tx = store.begin().unwrap();
        let err = transfer(&tx, alice, bob, &Bundle::new(vec![LineItem::new("Gold", 1)]))
            .unwrap_err();
        assert!(matches!(err, TradepostError::UnknownResources { .. }));
    }
}
