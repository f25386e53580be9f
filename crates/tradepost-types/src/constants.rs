//! System-wide constants for the Tradepost exchange.

/// Default bound on waiting for the inventory lock, in milliseconds.
pub const DEFAULT_LOCK_TIMEOUT_MS: u64 = 5_000;

/// Default database file for file-backed stores.
pub const DEFAULT_STORE_PATH: &str = "tradepost.db";

/// Longest resource name the catalog accepts.
pub const MAX_RESOURCE_NAME_LEN: usize = 50;

/// Catalog provisioned on first migration: (name, value weight).
pub const DEFAULT_CATALOG: [(&str, u32); 4] = [
    ("Water", 4),
    ("Food", 3),
    ("Medication", 2),
    ("Ammunition", 1),
];

/// Confirmation message returned with a committed trade.
pub const TRADE_COMPLETED_MESSAGE: &str = "Trade completed";

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "Tradepost";
