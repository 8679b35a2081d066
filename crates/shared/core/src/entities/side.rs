use serde::{Deserialize, Serialize};

/// Aggressor side of a trade print
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Derive the aggressor from the exchange maker flag.
    ///
    /// When the buyer is the maker the seller crossed the spread, so the
    /// print counts as sell volume.
    pub fn from_buyer_maker(is_buyer_maker: bool) -> Self {
        if is_buyer_maker { Side::Sell } else { Side::Buy }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "BUY",
            Side::Sell => "SELL",
        }
    }
}
