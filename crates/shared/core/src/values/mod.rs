use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Price value - uses Decimal for precision
pub type Price = Decimal;

/// Quantity value - uses Decimal for precision
pub type Quantity = Decimal;

/// Timestamp in UTC
pub type Timestamp = DateTime<Utc>;

/// Exchange symbol identifying a monitored instrument (e.g. `BTCUSDC`)
///
/// Symbols are normalized to upper case so that stream names (`btcusdc@trade`)
/// and payload fields (`"s": "BTCUSDC"`) key the same per-instrument state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    /// Create a new symbol
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(id.as_ref().trim().to_uppercase())
    }

    /// Get the symbol as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lower-case form used in stream names
    pub fn stream_name(&self) -> String {
        self.0.to_lowercase()
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Symbol {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_normalization() {
        let a = Symbol::new("btcusdc");
        let b = Symbol::from(" BTCUSDC ");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "BTCUSDC");
        assert_eq!(a.stream_name(), "btcusdc");
    }

    #[test]
    fn test_symbol_serializes_as_plain_string() {
        let json = serde_json::to_string(&Symbol::new("ethbtc")).unwrap();
        assert_eq!(json, "\"ETHBTC\"");
    }
}
