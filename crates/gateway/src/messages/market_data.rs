//! Market data message types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sparx_core::{BookLevel, BookSnapshot, Side, Symbol, Timestamp, Trade};
use std::str::FromStr;

use crate::error::GatewayError;

/// Trade print as delivered by the exchange
///
/// Field names follow the Binance `<symbol>@trade` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeMessage {
    #[serde(rename = "s")]
    pub symbol: String,
    #[serde(rename = "T")]
    pub event_time_ms: i64,
    #[serde(rename = "p")]
    pub price: String,
    #[serde(rename = "q")]
    pub quantity: String,
    #[serde(rename = "m")]
    pub is_buyer_maker: bool,
}

impl TradeMessage {
    /// Create a new trade message
    pub fn new(
        symbol: impl Into<String>,
        event_time_ms: i64,
        price: impl Into<String>,
        quantity: impl Into<String>,
        is_buyer_maker: bool,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            event_time_ms,
            price: price.into(),
            quantity: quantity.into(),
            is_buyer_maker,
        }
    }

    /// Normalize into a validated domain trade
    pub fn to_trade(&self) -> Result<Trade, GatewayError> {
        if self.symbol.trim().is_empty() {
            return Err(GatewayError::Malformed("trade without symbol".to_string()));
        }
        let timestamp = timestamp_from_millis(self.event_time_ms)?;
        let price = parse_decimal("price", &self.price)?;
        let quantity = parse_decimal("quantity", &self.quantity)?;

        Ok(Trade::new(
            Symbol::new(&self.symbol),
            timestamp,
            price,
            quantity,
            Side::from_buyer_maker(self.is_buyer_maker),
        )?)
    }
}

/// Top-of-book depth snapshot
///
/// Levels are `[price, quantity]` string pairs ordered best-first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepthMessage {
    pub symbol: String,
    pub bids: Vec<[String; 2]>,
    pub asks: Vec<[String; 2]>,
    pub received_at: Timestamp,
}

impl DepthMessage {
    pub fn new(
        symbol: impl Into<String>,
        bids: Vec<[String; 2]>,
        asks: Vec<[String; 2]>,
        received_at: Timestamp,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            bids,
            asks,
            received_at,
        }
    }

    /// Normalize into a domain book snapshot
    pub fn to_snapshot(&self) -> Result<BookSnapshot, GatewayError> {
        if self.symbol.trim().is_empty() {
            return Err(GatewayError::Malformed("depth without symbol".to_string()));
        }
        Ok(BookSnapshot::new(
            Symbol::new(&self.symbol),
            parse_levels(&self.bids)?,
            parse_levels(&self.asks)?,
            self.received_at,
        ))
    }
}

fn timestamp_from_millis(ms: i64) -> Result<DateTime<Utc>, GatewayError> {
    DateTime::<Utc>::from_timestamp_millis(ms)
        .ok_or_else(|| GatewayError::Malformed(format!("event time out of range: {}", ms)))
}

fn parse_decimal(field: &str, raw: &str) -> Result<Decimal, GatewayError> {
    Decimal::from_str(raw.trim())
        .or_else(|_| Decimal::from_scientific(raw.trim()))
        .map_err(|_| GatewayError::Malformed(format!("{} is not a decimal: {:?}", field, raw)))
}

/// Levels need a positive price and a non-negative quantity
fn parse_levels(levels: &[[String; 2]]) -> Result<Vec<BookLevel>, GatewayError> {
    levels
        .iter()
        .map(|[price, qty]| {
            let price = parse_decimal("level price", price)?;
            let quantity = parse_decimal("level quantity", qty)?;
            if price <= Decimal::ZERO || quantity < Decimal::ZERO {
                return Err(GatewayError::Malformed(format!(
                    "invalid depth level [{}, {}]",
                    price, quantity
                )));
            }
            Ok(BookLevel::new(price, quantity))
        })
        .collect()
}
