//! Live quarantine queries, run inside a trade transaction.

use rusqlite::params_from_iter;
use tradepost_types::{ActorId, Result};

use crate::error::classify;
use crate::store::TradeTx;

/// The subset of `actor_ids` currently flagged quarantined, ascending.
pub fn quarantined_among(tx: &TradeTx<'_>, actor_ids: &[ActorId]) -> Result<Vec<ActorId>> {
    if actor_ids.is_empty() {
        return Ok(Vec::new());
    }
    let timeout_ms = tx.lock_timeout_ms();
    let list = vec!["?"; actor_ids.len()].join(", ");
    let mut stmt = tx
        .conn()
        .prepare(&format!(
            "SELECT id FROM actors WHERE quarantined = 1 AND id IN ({list}) ORDER BY id"
        ))
        .map_err(|e| classify(&e, "check quarantine", timeout_ms))?;
    let rows = stmt
        .query_map(params_from_iter(actor_ids.iter().map(|a| a.get())), |row| {
            Ok(ActorId(row.get(0)?))
        })
        .map_err(|e| classify(&e, "check quarantine", timeout_ms))?;
    rows.collect::<rusqlite::Result<Vec<_>>>()
        .map_err(|e| classify(&e, "check quarantine", timeout_ms))
}
