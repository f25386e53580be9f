//! Error types for the Tradepost exchange.
//!
//! All errors use the `TP_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by how the caller must treat them:
//! - 1xx: Validation errors (malformed request, unknown resource), raised
//!   before any transaction opens
//! - 2xx: Trade errors (business-rule violations), always paired with a full
//!   rollback of any transactional work
//! - 9xx: Internal faults (store unavailable, unclassified constraint failure)
//!
//! Display strings never carry storage-layer vocabulary; the underlying
//! SQLite message is logged where the fault is translated, not surfaced here.

use thiserror::Error;

use crate::ActorId;

/// Coarse classification of a [`TradepostError`] for callers mapping the
/// outcome onto a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Caller-supplied data is malformed or references unknown resources.
    Validation,
    /// A business rule rejected the trade.
    Trade,
    /// Unexpected fault; not the caller's doing.
    Internal,
}

/// Central error enum for all Tradepost operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TradepostError {
    // =================================================================
    // Validation Errors (1xx)
    // =================================================================
    /// One or more resource names have no catalog entry. Lists all of them.
    #[error("TP_ERR_100: Unknown resources: {}", names.join(", "))]
    UnknownResources { names: Vec<String> },

    /// The request is structurally invalid (empty name, zero quantity, ...).
    #[error("TP_ERR_101: Invalid trade request: {reason}")]
    InvalidRequest { reason: String },

    // =================================================================
    // Trade Errors (2xx)
    // =================================================================
    /// Both sides of the trade are the same actor.
    #[error("TP_ERR_200: Actors must be different")]
    SelfTrade,

    /// The eligibility cache already knows this actor is quarantined.
    #[error("TP_ERR_201: Actor {0} is quarantined")]
    ActorQuarantined(ActorId),

    /// The live post-check found quarantined actors inside the transaction.
    #[error("TP_ERR_202: Quarantined actors cannot trade")]
    QuarantinedActors { actors: Vec<ActorId> },

    /// A requested resource is absent from the giver's locked inventory.
    #[error("TP_ERR_203: Item {resource} not found in actor {actor}'s inventory")]
    ItemNotInInventory { resource: String, actor: ActorId },

    /// The giver holds the resource, but not enough of it.
    #[error(
        "TP_ERR_204: Not enough {resource} to trade: actor {actor} offers {requested}, holds {available}"
    )]
    InsufficientStock {
        resource: String,
        actor: ActorId,
        requested: u64,
        available: u64,
    },

    /// The two bundles are not worth the same number of points.
    #[error("TP_ERR_205: Unequal point value: {offered} offered vs {requested} requested")]
    UnequalValue { offered: u64, requested: u64 },

    /// Waiting for the inventory lock exceeded the configured bound.
    /// The only retryable trade error.
    #[error("TP_ERR_206: Inventory is busy, lock wait exceeded {timeout_ms}ms; retry the trade")]
    LockTimeout { timeout_ms: u64 },

    /// A bundle's point value does not fit in a `u64`, so it cannot be
    /// compared against the other side.
    #[error("TP_ERR_207: Point value of the bundle offered by actor {actor} is too large")]
    ValueOverflow { actor: ActorId },

    // =================================================================
    // Internal (9xx)
    // =================================================================
    /// The store failed in a way that is not a business-rule violation.
    #[error("TP_ERR_900: Storage failure during {operation}")]
    Store { operation: String },

    /// Configuration error (invalid config file, bad values, ...).
    #[error("TP_ERR_901: Configuration error: {0}")]
    Configuration(String),

    /// I/O error (reading config or request files).
    #[error("TP_ERR_902: I/O error: {0}")]
    Io(String),
}

impl TradepostError {
    /// Which bucket of the taxonomy this error belongs to.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownResources { .. } | Self::InvalidRequest { .. } => ErrorKind::Validation,
            Self::SelfTrade
            | Self::ActorQuarantined(_)
            | Self::QuarantinedActors { .. }
            | Self::ItemNotInInventory { .. }
            | Self::InsufficientStock { .. }
            | Self::UnequalValue { .. }
            | Self::LockTimeout { .. }
            | Self::ValueOverflow { .. } => ErrorKind::Trade,
            Self::Store { .. } | Self::Configuration(_) | Self::Io(_) => ErrorKind::Internal,
        }
    }

    /// Whether the caller may resubmit the identical request.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::LockTimeout { .. })
    }

    /// Shorthand for `kind() == ErrorKind::Trade`.
    #[must_use]
    pub fn is_trade_error(&self) -> bool {
        self.kind() == ErrorKind::Trade
    }

    /// Human-readable reason without the `TP_ERR_nnn: ` code prefix.
    #[must_use]
    pub fn reason(&self) -> String {
        let full = self.to_string();
        match full.split_once(": ") {
            Some((code, rest)) if code.starts_with("TP_ERR_") => rest.to_string(),
            _ => full,
        }
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, TradepostError>;

impl From<std::io::Error> for TradepostError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
