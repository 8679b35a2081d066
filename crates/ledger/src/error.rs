//! Position ledger errors

use sparx_core::{DomainError, Symbol, TradeId};
use sparx_ports::LedgerError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PositionError {
    #[error("Position already open for {symbol} (trade {trade_id})")]
    AlreadyOpen { symbol: Symbol, trade_id: TradeId },

    #[error("No open position for {0}")]
    NoOpenPosition(Symbol),

    #[error("Ledger failure: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Invalid signal: {0}")]
    Domain(#[from] DomainError),
}

impl PositionError {
    /// True when the ledger itself failed, as opposed to a rejected transition
    pub fn is_ledger_fault(&self) -> bool {
        matches!(self, PositionError::Ledger(_))
    }
}

pub type Result<T> = std::result::Result<T, PositionError>;
