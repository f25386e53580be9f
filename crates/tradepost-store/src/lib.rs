//! # tradepost-store
//!
//! The shared persistent store behind the exchange, on SQLite.
//!
//! ## Components
//!
//! 1. **schema**: migrations and catalog provisioning
//! 2. **Store**: connection handle, provisioning helpers, scoped [`TradeTx`]
//! 3. **reader**: [`lock_and_fetch`] takes the write-intent lock and loads
//!    the usable rows of a trade
//! 4. **writer**: [`transfer`] debits the giver and credits the receiver
//! 5. **actors**: [`quarantined_among`] for the live post-check
//!
//! ## Trade Flow
//!
//! ```text
//! Store.begin() → lock_and_fetch() → (validate) → transfer() × 2
//!     → quarantined_among() → TradeTx.commit()   (drop = rollback)
//! ```

pub mod actors;
mod error;
pub mod reader;
pub mod schema;
pub mod store;
pub mod writer;

pub use actors::quarantined_among;
pub use reader::lock_and_fetch;
pub use store::{Store, TradeTx};
pub use writer::transfer;
