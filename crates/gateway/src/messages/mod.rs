//! Wire message types for gateway communication
//!
//! These mirror the exchange payloads closely (decimal strings, millisecond
//! timestamps). They are what travels through the ingress queues; conversion
//! into validated domain types happens on the consumer side.

pub mod market_data;

pub use market_data::{DepthMessage, TradeMessage};
