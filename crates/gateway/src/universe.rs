//! Instrument universe selection
//!
//! Picks the most liquid symbols from a Binance `/api/v3/ticker/24hr`
//! snapshot, skipping fiat, stablecoin and leveraged-quote pairs.

use rust_decimal::Decimal;
use serde::Deserialize;
use sparx_core::Symbol;
use std::path::Path;
use std::str::FromStr;

use crate::error::GatewayError;

/// Tokens that disqualify a symbol when they appear anywhere in it
pub const EXCLUDED_TOKENS: [&str; 12] = [
    "TRY", "USDT", "BUSD", "TUSD", "FDUSD", "DAI", "EUR", "GBP", "PLN", "JPY", "ARS", "BRL",
];

/// One row of the 24h ticker statistics
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Ticker24h {
    pub symbol: String,
    #[serde(rename = "quoteVolume")]
    pub quote_volume: String,
}

impl Ticker24h {
    pub fn new(symbol: impl Into<String>, quote_volume: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            quote_volume: quote_volume.into(),
        }
    }

    /// Quote volume; unparseable values rank as zero
    pub fn quote_volume(&self) -> Decimal {
        Decimal::from_str(self.quote_volume.trim()).unwrap_or(Decimal::ZERO)
    }
}

pub fn is_excluded(symbol: &str) -> bool {
    let symbol = symbol.to_uppercase();
    EXCLUDED_TOKENS.iter().any(|token| symbol.contains(token))
}

/// Top `limit` eligible symbols by descending 24h quote volume
pub fn rank_by_quote_volume(tickers: &[Ticker24h], limit: usize) -> Vec<Symbol> {
    let mut eligible: Vec<(&Ticker24h, Decimal)> = tickers
        .iter()
        .filter(|t| !t.symbol.trim().is_empty() && !is_excluded(&t.symbol))
        .map(|t| (t, t.quote_volume()))
        .collect();

    // Stable sort keeps snapshot order between equal volumes
    eligible.sort_by(|a, b| b.1.cmp(&a.1));

    eligible
        .into_iter()
        .take(limit)
        .map(|(t, _)| Symbol::new(&t.symbol))
        .collect()
}

/// Parse a ticker snapshot (a JSON array of ticker rows)
pub fn parse_tickers(json: &str) -> Result<Vec<Ticker24h>, GatewayError> {
    Ok(serde_json::from_str(json)?)
}

/// Load a ticker snapshot saved to disk
pub fn load_tickers(path: impl AsRef<Path>) -> Result<Vec<Ticker24h>, GatewayError> {
    let contents = std::fs::read_to_string(path)?;
    parse_tickers(&contents)
}
