use sparx_core::{SignalKind, TradeId};
use thiserror::Error;

/// Failures reported by a signal ledger
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Ledger I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Ledger record could not be encoded or decoded: {0}")]
    Codec(String),

    #[error("Duplicate {kind} record for trade {trade_id}")]
    Duplicate { trade_id: TradeId, kind: SignalKind },

    #[error("Ledger unavailable: {0}")]
    Unavailable(String),
}

pub type LedgerResult<T> = std::result::Result<T, LedgerError>;

/// Failures reported by an alert channel
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Alert delivery failed: {0}")]
    Delivery(String),
}
