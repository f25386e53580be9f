//! Outbound mapping: trade outcome → status code and JSON body.
//!
//! | Outcome | Status | Body |
//! |---|---|---|
//! | committed | 200 | `{"message": "Trade completed"}` |
//! | validation / trade error | 400 | `{"error": reason}` |
//! | lock wait exceeded | 409 | `{"error": reason}` |
//! | internal fault | 500 | `{"error": description}` |

use serde::Serialize;
use serde_json::{Value, json};
use tradepost_types::constants::TRADE_COMPLETED_MESSAGE;
use tradepost_types::{ErrorKind, Result, TradeReceipt, TradepostError};

/// What the request-handling collaborator sends back to its caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeReply {
    pub status: u16,
    pub body: Value,
}

impl TradeReply {
    #[must_use]
    pub fn completed() -> Self {
        Self {
            status: 200,
            body: json!({ "message": TRADE_COMPLETED_MESSAGE }),
        }
    }

    #[must_use]
    pub fn from_error(err: &TradepostError) -> Self {
        let status = match err.kind() {
            ErrorKind::Internal => 500,
            _ if err.is_retryable() => 409,
            ErrorKind::Validation | ErrorKind::Trade => 400,
        };
        Self {
            status,
            body: json!({ "error": err.reason() }),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == 200
    }
}

impl From<&Result<TradeReceipt>> for TradeReply {
    fn from(outcome: &Result<TradeReceipt>) -> Self {
        match outcome {
            Ok(_) => Self::completed(),
            Err(err) => Self::from_error(err),
        }
    }
}
