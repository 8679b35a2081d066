//! Sparx Gateway
//!
//! Gateway layer for the Sparx signal pipeline. Provides:
//! - Ingress queues (unbounded tokio channels behind `Publisher`/`Subscriber`)
//! - Wire message types for trade prints and depth snapshots
//! - The Binance combined-stream adapter
//! - Instrument universe selection from 24h ticker statistics
//!
//! ## Architecture
//!
//! ```text
//! Binance combined stream (NDJSON)
//!         │
//!    ┌────▼──────┐
//!    │StreamFeed │  decode, filter, never blocks
//!    └──┬─────┬──┘
//!       │     │ ingress queues
//!   trades   depth
//!       │     │
//!    ┌──▼─────▼──┐
//!    │ Consumers │  one task per queue
//!    └───────────┘
//! ```

pub mod adapters;
pub mod error;
pub mod messages;
pub mod transport;
pub mod universe;

// Re-export commonly used types
pub use adapters::binance::{FeedStats, StreamEvent, StreamFeed, parse_stream_message};
pub use error::{GatewayError, TransportError};
pub use messages::{DepthMessage, TradeMessage};
pub use transport::{IngressReceiver, IngressSender, Publisher, Subscriber, ingress_queue};
pub use universe::{Ticker24h, rank_by_quote_volume};
