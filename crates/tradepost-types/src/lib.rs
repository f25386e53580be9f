//! # tradepost-types
//!
//! Shared types, errors, and configuration for the **Tradepost** barter
//! exchange.
//!
//! This crate is the leaf dependency of the workspace. It defines:
//!
//! - **Identifiers**: [`ActorId`], [`TradeId`]
//! - **Catalog model**: [`Resource`]
//! - **Inventory model**: [`InventoryEntry`], [`LockedInventory`]
//! - **Trade model**: [`TradeRequest`], [`Bundle`], [`LineItem`], [`TradePhase`], [`TradeReceipt`]
//! - **Configuration**: [`TradepostConfig`], [`StoreConfig`], [`ResourceSeed`]
//! - **Errors**: [`TradepostError`] with `TP_ERR_` prefix codes
//! - **Constants**: defaults and limits

pub mod config;
pub mod constants;
pub mod error;
pub mod ids;
pub mod inventory;
pub mod resource;
pub mod trade;

pub use config::*;
pub use error::*;
pub use ids::*;
pub use inventory::*;
pub use resource::*;
pub use trade::*;

// Constants are accessed via `tradepost_types::constants::FOO`
// (not re-exported to avoid name collisions).
