//! Schema migrations and catalog provisioning.
//!
//! Three tables form the persisted layout shared with the registration and
//! reporting collaborators:
//!
//! - `actors`: identity plus the monotonic `quarantined` flag
//! - `resources`: the catalog, unique name and positive value weight
//! - `inventory`: one row per (actor, resource), `quantity >= 0`
//!
//! Migrations are tracked with `PRAGMA user_version` and are safe to run on
//! every start.

use rusqlite::{Connection, params};
use tradepost_types::{ResourceSeed, Result};

use crate::error::classify;

/// Current schema version written to `user_version`.
pub const SCHEMA_VERSION: i64 = 1;

const SCHEMA_V1: &str = "
CREATE TABLE IF NOT EXISTS actors (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT    NOT NULL,
    quarantined INTEGER NOT NULL DEFAULT 0 CHECK (quarantined IN (0, 1))
);

CREATE TABLE IF NOT EXISTS resources (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    name         TEXT    NOT NULL UNIQUE,
    value_weight INTEGER NOT NULL CHECK (value_weight > 0)
);

CREATE TABLE IF NOT EXISTS inventory (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    actor_id    INTEGER NOT NULL REFERENCES actors(id) ON DELETE CASCADE,
    resource_id INTEGER NOT NULL REFERENCES resources(id) ON DELETE CASCADE,
    quantity    INTEGER NOT NULL DEFAULT 0 CONSTRAINT quantity_non_negative CHECK (quantity >= 0),
    UNIQUE (actor_id, resource_id)
);

CREATE INDEX IF NOT EXISTS idx_inventory_resource ON inventory(resource_id);

-- The flag only ever moves false -> true.
CREATE TRIGGER IF NOT EXISTS actors_quarantine_monotonic
BEFORE UPDATE OF quarantined ON actors
WHEN OLD.quarantined = 1 AND NEW.quarantined = 0
BEGIN
    SELECT RAISE(ABORT, 'quarantine flag cannot be cleared');
END;
";

/// Bring the schema up to [`SCHEMA_VERSION`] and provision `catalog`.
///
/// Catalog rows are get-or-create by name: an existing row keeps its weight.
pub fn migrate(conn: &Connection, catalog: &[ResourceSeed], lock_timeout_ms: u64) -> Result<()> {
    let wrap = |e: rusqlite::Error| classify(&e, "migrate schema", lock_timeout_ms);

    let tx = conn.unchecked_transaction().map_err(wrap)?;
    let version: i64 = tx
        .pragma_query_value(None, "user_version", |row| row.get(0))
        .map_err(wrap)?;

    if version < 1 {
        tx.execute_batch(SCHEMA_V1).map_err(wrap)?;
        tx.pragma_update(None, "user_version", SCHEMA_VERSION)
            .map_err(wrap)?;
        tracing::info!(from = version, to = SCHEMA_VERSION, "Schema migrated");
    }

    let mut seeded = 0;
    {
        let mut stmt = tx
            .prepare(
                "INSERT INTO resources (name, value_weight) VALUES (?1, ?2)
                 ON CONFLICT(name) DO NOTHING",
            )
            .map_err(wrap)?;
        for seed in catalog {
            seeded += stmt
                .execute(params![seed.name.trim(), seed.value_weight])
                .map_err(wrap)?;
        }
    }
    tx.commit().map_err(wrap)?;

    if seeded > 0 {
        tracing::info!(seeded, "Catalog provisioned");
    }
    Ok(())
}
