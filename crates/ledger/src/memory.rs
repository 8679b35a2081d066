//! Volatile ledger for tests and dry runs

use async_trait::async_trait;
use sparx_core::{Signal, Symbol, TradeId};
use sparx_ports::{LedgerResult, SignalLedger};
use tokio::sync::RwLock;

use crate::index::SignalIndex;

/// Signal ledger held entirely in memory
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    index: RwLock<SignalIndex>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of recorded signals
    pub async fn len(&self) -> usize {
        self.index.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Every recorded signal in append order
    pub async fn signals(&self) -> Vec<Signal> {
        self.index.read().await.signals().to_vec()
    }
}

#[async_trait]
impl SignalLedger for InMemoryLedger {
    async fn find_latest_buy(&self, symbol: &Symbol) -> LedgerResult<Option<Signal>> {
        Ok(self.index.read().await.latest_buy(symbol))
    }

    async fn find_paired_sell(&self, trade_id: &TradeId) -> LedgerResult<Option<Signal>> {
        Ok(self.index.read().await.paired_sell(trade_id))
    }

    async fn append(&self, signal: Signal) -> LedgerResult<()> {
        self.index.write().await.insert(signal)
    }

    fn name(&self) -> &str {
        "InMemoryLedger"
    }
}
