use serde::{Deserialize, Serialize};

use super::Side;
use crate::error::DomainError;
use crate::values::{Price, Quantity, Symbol, Timestamp};

/// An executed trade print
///
/// Fields are private so that a constructed trade always carries a positive
/// price and quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    symbol: Symbol,
    timestamp: Timestamp,
    price: Price,
    quantity: Quantity,
    side: Side,
}

impl Trade {
    /// Create a validated trade
    pub fn new(
        symbol: impl Into<Symbol>,
        timestamp: Timestamp,
        price: Price,
        quantity: Quantity,
        side: Side,
    ) -> Result<Self, DomainError> {
        if price <= Price::ZERO {
            return Err(DomainError::InvalidPrice(price.to_string()));
        }
        if quantity <= Quantity::ZERO {
            return Err(DomainError::InvalidQuantity(quantity.to_string()));
        }

        Ok(Self {
            symbol: symbol.into(),
            timestamp,
            price,
            quantity,
            side,
        })
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    pub fn price(&self) -> Price {
        self.price
    }

    pub fn quantity(&self) -> Quantity {
        self.quantity
    }

    pub fn side(&self) -> Side {
        self.side
    }
}
