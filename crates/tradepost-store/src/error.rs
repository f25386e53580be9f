//! Translation of SQLite failures into the Tradepost error taxonomy.
//!
//! Nothing above this crate sees a `rusqlite::Error`. Contention becomes a
//! retryable [`TradepostError::LockTimeout`]; everything else becomes an
//! opaque [`TradepostError::Store`] after the engine message is logged.

use rusqlite::ErrorCode;
use tradepost_types::TradepostError;

/// Map an engine error raised while performing `operation`.
pub(crate) fn classify(
    err: &rusqlite::Error,
    operation: &str,
    lock_timeout_ms: u64,
) -> TradepostError {
    if is_contention(err) {
        tracing::warn!(operation, lock_timeout_ms, "Inventory lock wait exceeded");
        return TradepostError::LockTimeout {
            timeout_ms: lock_timeout_ms,
        };
    }
    tracing::error!(operation, error = %err, "Store operation failed");
    TradepostError::Store {
        operation: operation.to_string(),
    }
}

/// The engine gave up waiting for another connection's lock.
pub(crate) fn is_contention(err: &rusqlite::Error) -> bool {
    matches!(
        err.sqlite_error_code(),
        Some(ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked)
    )
}

/// A CHECK, UNIQUE, or FOREIGN KEY constraint rejected the statement.
pub(crate) fn is_constraint(err: &rusqlite::Error) -> bool {
    matches!(err.sqlite_error_code(), Some(ErrorCode::ConstraintViolation))
}
