use async_trait::async_trait;
use sparx_core::{Signal, Symbol, TradeId};

use crate::error::LedgerResult;

/// Port for the durable, append-only signal log
///
/// The ledger is the source of truth for whether an instrument's position is
/// open. Each operation must be individually atomic and durable once it
/// returns `Ok`. Implementations must reject a second record with the same
/// `(trade_id, kind)` pair.
#[async_trait]
pub trait SignalLedger: Send + Sync {
    /// Latest BUY signal recorded for `symbol`, if any
    async fn find_latest_buy(&self, symbol: &Symbol) -> LedgerResult<Option<Signal>>;

    /// SELL signal sharing `trade_id`, if any
    async fn find_paired_sell(&self, trade_id: &TradeId) -> LedgerResult<Option<Signal>>;

    /// Durably persist a new signal
    async fn append(&self, signal: Signal) -> LedgerResult<()>;

    /// Ledger name for logging
    fn name(&self) -> &str {
        "SignalLedger"
    }
}
