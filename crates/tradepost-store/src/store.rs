//! The persistent store handle and its scoped trade transaction.
//!
//! A [`Store`] owns one SQLite connection. Concurrent traders each open
//! their own `Store` on the same file; the engine's locks coordinate them.
//!
//! Provisioning helpers (register an actor, flag quarantine, grant stock)
//! stand in for the registration and reporting collaborators and run in
//! autocommit mode. Trades go through [`Store::begin`].

use std::collections::BTreeMap;

use rusqlite::{Connection, OptionalExtension, Transaction, TransactionBehavior, params};
use tradepost_types::{ActorId, Resource, ResourceSeed, Result, StoreConfig, TradepostError};

use crate::error::classify;
use crate::schema;
use crate::writer;

/// Handle to the shared inventory store.
pub struct Store {
    conn: Connection,
    lock_timeout_ms: u64,
}

impl Store {
    /// Open (or create) the database file described by `config`.
    pub fn open(config: &StoreConfig) -> Result<Self> {
        let timeout_ms = config.lock_timeout_ms;
        let conn = Connection::open(&config.path)
            .map_err(|e| classify(&e, "open store", timeout_ms))?;
        let store = Self::configure(conn, timeout_ms)?;
        if config.wal {
            store
                .conn
                .pragma_update_and_check(None, "journal_mode", "WAL", |_| Ok(()))
                .map_err(|e| classify(&e, "enable WAL", timeout_ms))?;
        }
        Ok(store)
    }

    /// A private in-memory store. Every call yields an independent database.
    pub fn open_in_memory(lock_timeout_ms: u64) -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| classify(&e, "open store", lock_timeout_ms))?;
        Self::configure(conn, lock_timeout_ms)
    }

    fn configure(conn: Connection, lock_timeout_ms: u64) -> Result<Self> {
        conn.busy_timeout(std::time::Duration::from_millis(lock_timeout_ms))
            .map_err(|e| classify(&e, "set lock timeout", lock_timeout_ms))?;
        conn.pragma_update(None, "foreign_keys", true)
            .map_err(|e| classify(&e, "enable foreign keys", lock_timeout_ms))?;
        Ok(Self {
            conn,
            lock_timeout_ms,
        })
    }

    /// Run migrations and provision the catalog.
    pub fn migrate(&self, catalog: &[ResourceSeed]) -> Result<()> {
        schema::migrate(&self.conn, catalog, self.lock_timeout_ms)
    }

    #[must_use]
    pub fn lock_timeout_ms(&self) -> u64 {
        self.lock_timeout_ms
    }

    /// Open a trade transaction.
    ///
    /// The transaction is DEFERRED: no lock is taken until the inventory
    /// reader issues its write-intent statement. Dropping the returned guard
    /// without [`TradeTx::commit`] rolls everything back.
    pub fn begin(&mut self) -> Result<TradeTx<'_>> {
        let lock_timeout_ms = self.lock_timeout_ms;
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Deferred)
            .map_err(|e| classify(&e, "begin trade", lock_timeout_ms))?;
        Ok(TradeTx {
            tx,
            lock_timeout_ms,
        })
    }

    fn wrap(&self, operation: &'static str) -> impl Fn(rusqlite::Error) -> TradepostError + '_ {
        move |e| classify(&e, operation, self.lock_timeout_ms)
    }

    // ---------------------------------------------------------------------
    // Catalog
    // ---------------------------------------------------------------------

    /// Every catalog entry, ordered by name.
    pub fn catalog(&self) -> Result<Vec<Resource>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name, value_weight FROM resources ORDER BY name")
            .map_err(self.wrap("read catalog"))?;
        let rows = stmt
            .query_map([], |row| Ok(Resource::new(row.get::<_, String>(0)?, row.get(1)?)))
            .map_err(self.wrap("read catalog"))?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(self.wrap("read catalog"))
    }

    // ---------------------------------------------------------------------
    // Actors
    // ---------------------------------------------------------------------

    /// Register a new actor, not quarantined.
    pub fn register_actor(&self, name: &str) -> Result<ActorId> {
        self.conn
            .execute("INSERT INTO actors (name) VALUES (?1)", params![name])
            .map_err(self.wrap("register actor"))?;
        Ok(ActorId(self.conn.last_insert_rowid()))
    }

    /// Set the quarantine flag. Idempotent; the flag is never cleared.
    pub fn flag_quarantined(&self, actor: ActorId) -> Result<()> {
        let changed = self
            .conn
            .execute(
                "UPDATE actors SET quarantined = 1 WHERE id = ?1",
                params![actor.get()],
            )
            .map_err(self.wrap("flag actor"))?;
        if changed == 0 {
            return Err(unknown_actor(actor));
        }
        tracing::info!(actor = %actor, "Actor quarantined");
        Ok(())
    }

    /// Authoritative quarantine status of one actor.
    pub fn is_quarantined(&self, actor: ActorId) -> Result<bool> {
        self.conn
            .query_row(
                "SELECT quarantined FROM actors WHERE id = ?1",
                params![actor.get()],
                |row| row.get::<_, bool>(0),
            )
            .optional()
            .map_err(self.wrap("read actor"))?
            .ok_or_else(|| unknown_actor(actor))
    }

    // ---------------------------------------------------------------------
    // Inventory
    // ---------------------------------------------------------------------

    /// Add `quantity` units of `resource` to an actor's stock.
    pub fn grant(&self, actor: ActorId, resource: &str, quantity: u32) -> Result<()> {
        let tx = self
            .conn
            .unchecked_transaction()
            .map_err(self.wrap("grant stock"))?;
        let resource_id = writer::resource_id(&tx, resource, self.lock_timeout_ms)?;
        writer::credit(&tx, actor, resource_id, quantity).map_err(|e| {
            if crate::error::is_constraint(&e) {
                unknown_actor(actor)
            } else {
                classify(&e, "grant stock", self.lock_timeout_ms)
            }
        })?;
        tx.commit().map_err(self.wrap("grant stock"))
    }

    /// Current quantity of one (actor, resource) row, `None` if no row exists.
    pub fn quantity_of(&self, actor: ActorId, resource: &str) -> Result<Option<u32>> {
        self.conn
            .query_row(
                "SELECT i.quantity FROM inventory i
                   JOIN resources r ON r.id = i.resource_id
                  WHERE i.actor_id = ?1 AND r.name = ?2",
                params![actor.get(), resource],
                |row| row.get(0),
            )
            .optional()
            .map_err(self.wrap("read inventory"))
    }

    /// All rows of one actor, zero quantities included, keyed by resource name.
    pub fn inventory_of(&self, actor: ActorId) -> Result<BTreeMap<String, u32>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT r.name, i.quantity FROM inventory i
                   JOIN resources r ON r.id = i.resource_id
                  WHERE i.actor_id = ?1
                  ORDER BY r.name",
            )
            .map_err(self.wrap("read inventory"))?;
        let rows = stmt
            .query_map(params![actor.get()], |row| Ok((row.get(0)?, row.get(1)?)))
            .map_err(self.wrap("read inventory"))?;
        rows.collect::<rusqlite::Result<BTreeMap<_, _>>>()
            .map_err(self.wrap("read inventory"))
    }

    /// Units of `resource` held across all actors.
    pub fn total_supply(&self, resource: &str) -> Result<u64> {
        self.conn
            .query_row(
                "SELECT COALESCE(SUM(i.quantity), 0) FROM inventory i
                   JOIN resources r ON r.id = i.resource_id
                  WHERE r.name = ?1",
                params![resource],
                |row| row.get::<_, i64>(0),
            )
            .map(|sum| u64::try_from(sum).unwrap_or(0))
            .map_err(self.wrap("read inventory"))
    }
}

fn unknown_actor(actor: ActorId) -> TradepostError {
    TradepostError::InvalidRequest {
        reason: format!("actor {actor} does not exist"),
    }
}

// ---------------------------------------------------------------------------
// TradeTx
// ---------------------------------------------------------------------------

/// One trade's transaction. Rolls back on drop unless committed.
pub struct TradeTx<'conn> {
    tx: Transaction<'conn>,
    lock_timeout_ms: u64,
}

impl TradeTx<'_> {
    pub(crate) fn conn(&self) -> &Connection {
        &self.tx
    }

    pub(crate) fn lock_timeout_ms(&self) -> u64 {
        self.lock_timeout_ms
    }

    pub fn commit(self) -> Result<()> {
        let lock_timeout_ms = self.lock_timeout_ms;
        self.tx
            .commit()
            .map_err(|e| classify(&e, "commit trade", lock_timeout_ms))
    }

    pub fn rollback(self) -> Result<()> {
        let lock_timeout_ms = self.lock_timeout_ms;
        self.tx
            .rollback()
            .map_err(|e| classify(&e, "roll back trade", lock_timeout_ms))
    }
}
