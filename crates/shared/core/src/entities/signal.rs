//! Signal records - the immutable entries of the position ledger
//!
//! A BUY opens a position under a freshly generated [`TradeId`]. The SELL
//! that closes it reuses the same id and carries the realised `profit_pct`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;
use crate::values::{Price, Symbol, Timestamp};

/// Opaque key pairing a BUY with its closing SELL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TradeId(Uuid);

impl TradeId {
    /// Generate a fresh, unique trade id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TradeId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for TradeId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for TradeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Signal direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalKind {
    Buy,
    Sell,
}

impl SignalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalKind::Buy => "BUY",
            SignalKind::Sell => "SELL",
        }
    }
}

impl std::fmt::Display for SignalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Market state observed when the decision was taken
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalMetrics {
    pub imbalance: f64,
    pub volume_ratio: f64,
    pub slope: Option<f64>,
    pub divergence: Option<f64>,
    pub fear_index: u8,
}

/// A recorded BUY or SELL decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    trade_id: TradeId,
    symbol: Symbol,
    #[serde(rename = "signal_type")]
    kind: SignalKind,
    price: Price,
    #[serde(flatten)]
    metrics: SignalMetrics,
    timestamp: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    profit_pct: Option<Decimal>,
}

impl Signal {
    /// Create a BUY signal opening a new position under a fresh trade id
    pub fn buy(
        symbol: impl Into<Symbol>,
        price: Price,
        metrics: SignalMetrics,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            trade_id: TradeId::new(),
            symbol: symbol.into(),
            kind: SignalKind::Buy,
            price,
            metrics,
            timestamp,
            profit_pct: None,
        }
    }

    /// Create the SELL closing `open_buy`
    ///
    /// The SELL reuses the BUY's trade id and carries the profit relative to
    /// the BUY price.
    pub fn sell(
        open_buy: &Signal,
        price: Price,
        metrics: SignalMetrics,
        timestamp: Timestamp,
    ) -> Result<Self, DomainError> {
        if open_buy.kind != SignalKind::Buy {
            return Err(DomainError::NotABuy(open_buy.trade_id.to_string()));
        }
        let profit = profit_pct(open_buy.price, price)
            .ok_or_else(|| DomainError::InvalidPrice(open_buy.price.to_string()))?;

        Ok(Self {
            trade_id: open_buy.trade_id,
            symbol: open_buy.symbol.clone(),
            kind: SignalKind::Sell,
            price,
            metrics,
            timestamp,
            profit_pct: Some(profit),
        })
    }

    pub fn trade_id(&self) -> TradeId {
        self.trade_id
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    pub fn kind(&self) -> SignalKind {
        self.kind
    }

    pub fn is_buy(&self) -> bool {
        self.kind == SignalKind::Buy
    }

    pub fn price(&self) -> Price {
        self.price
    }

    pub fn metrics(&self) -> &SignalMetrics {
        &self.metrics
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    /// Realised profit in percent, present only on SELL signals
    pub fn profit_pct(&self) -> Option<Decimal> {
        self.profit_pct
    }
}

/// `100 * (sell - buy) / buy`, or `None` when the buy price is not positive
pub fn profit_pct(buy_price: Price, sell_price: Price) -> Option<Decimal> {
    if buy_price <= Price::ZERO {
        return None;
    }
    (sell_price - buy_price)
        .checked_div(buy_price)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
}
