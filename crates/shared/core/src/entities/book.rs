use serde::{Deserialize, Serialize};

use crate::values::{Price, Quantity, Symbol, Timestamp};

/// Order book level (price + quantity)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookLevel {
    pub price: Price,
    pub quantity: Quantity,
}

impl BookLevel {
    /// Create a new book level
    pub fn new(price: Price, quantity: Quantity) -> Self {
        Self { price, quantity }
    }
}

/// Point-in-time view of the resting interest near the top of the book
///
/// Both sides are ordered best-first, as delivered by the exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookSnapshot {
    pub symbol: Symbol,
    pub bids: Vec<BookLevel>,
    pub asks: Vec<BookLevel>,
    pub received_at: Timestamp,
}

impl BookSnapshot {
    pub fn new(
        symbol: impl Into<Symbol>,
        bids: Vec<BookLevel>,
        asks: Vec<BookLevel>,
        received_at: Timestamp,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            bids,
            asks,
            received_at,
        }
    }

    /// Total bid quantity over the best `depth` levels
    pub fn bid_volume(&self, depth: usize) -> Quantity {
        side_volume(&self.bids, depth)
    }

    /// Total ask quantity over the best `depth` levels
    pub fn ask_volume(&self, depth: usize) -> Quantity {
        side_volume(&self.asks, depth)
    }
}

fn side_volume(levels: &[BookLevel], depth: usize) -> Quantity {
    levels.iter().take(depth).map(|l| l.quantity).sum()
}
