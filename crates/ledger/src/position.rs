//! Open-position tracking against the signal ledger
//!
//! An instrument's position is open iff its latest BUY has no SELL sharing
//! the BUY's trade id. Nothing is cached: every transition re-reads the
//! ledger first, so a restart or a second writer never leaves a stale view.

use log::info;
use sparx_core::{Price, Signal, SignalMetrics, Symbol, Timestamp};
use sparx_ports::SignalLedger;
use std::sync::Arc;

use crate::error::{PositionError, Result};

/// Enforces BUY/SELL alternation per instrument on top of a [`SignalLedger`]
#[derive(Clone)]
pub struct PositionLedger {
    ledger: Arc<dyn SignalLedger>,
}

impl PositionLedger {
    pub fn new(ledger: Arc<dyn SignalLedger>) -> Self {
        Self { ledger }
    }

    pub fn ledger(&self) -> &Arc<dyn SignalLedger> {
        &self.ledger
    }

    /// The open BUY for `symbol`, if any
    pub async fn get_open_position(&self, symbol: &Symbol) -> Result<Option<Signal>> {
        let Some(buy) = self.ledger.find_latest_buy(symbol).await? else {
            return Ok(None);
        };
        let paired = self.ledger.find_paired_sell(&buy.trade_id()).await?;
        Ok(paired.is_none().then_some(buy))
    }

    pub async fn is_open(&self, symbol: &Symbol) -> Result<bool> {
        Ok(self.get_open_position(symbol).await?.is_some())
    }

    /// Open a position under a fresh trade id
    pub async fn record_buy(
        &self,
        symbol: &Symbol,
        price: Price,
        metrics: SignalMetrics,
        timestamp: Timestamp,
    ) -> Result<Signal> {
        if let Some(open) = self.get_open_position(symbol).await? {
            return Err(PositionError::AlreadyOpen {
                symbol: symbol.clone(),
                trade_id: open.trade_id(),
            });
        }

        let signal = Signal::buy(symbol.clone(), price, metrics, timestamp);
        self.ledger.append(signal.clone()).await?;
        info!(
            "[PositionLedger] BUY {} @ {} (trade {})",
            symbol,
            price,
            signal.trade_id()
        );
        Ok(signal)
    }

    /// Close the open position; nothing is written when none is open
    pub async fn record_sell(
        &self,
        symbol: &Symbol,
        price: Price,
        metrics: SignalMetrics,
        timestamp: Timestamp,
    ) -> Result<Signal> {
        let open = self
            .get_open_position(symbol)
            .await?
            .ok_or_else(|| PositionError::NoOpenPosition(symbol.clone()))?;

        let signal = Signal::sell(&open, price, metrics, timestamp)?;
        self.ledger.append(signal.clone()).await?;
        info!(
            "[PositionLedger] SELL {} @ {} (trade {}, profit {}%)",
            symbol,
            price,
            signal.trade_id(),
            signal.profit_pct().unwrap_or_default()
        );
        Ok(signal)
    }
}
