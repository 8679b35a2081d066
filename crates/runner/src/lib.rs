//! Sparx Runner - the signal pipeline service
//!
//! Wires the gateway, strategy and ledger crates into a running service:
//!
//! - **Config**: JSON file + `SPARX_*` environment overrides
//! - **Consumers**: one task per ingress queue (trades, depth)
//! - **Pipeline**: spawns the consumers and owns the queue producers
//! - **Notifier**: alert formatting and log delivery
//! - **Heartbeat**: periodic liveness line with pipeline counters
//!
//! ## Architecture
//!
//! ```text
//!          stdin (Binance combined stream, NDJSON)
//!                         │
//!                  ┌──────▼──────┐
//!                  │ StreamFeed  │
//!                  └──┬───────┬──┘
//!              trades │       │ depth
//!           ┌─────────▼──┐ ┌──▼──────────┐
//!           │   Trade    │ │    Book     │
//!           │  Consumer  │ │  Consumer   │
//!           └─────┬──────┘ └──────┬──────┘
//!                 │  ImbalanceBoard│
//!                 │◄───────────────┘
//!                 ▼
//!         ┌───────────────┐      ┌──────────┐
//!         │PositionLedger │─────►│ Notifier │
//!         └───────────────┘      └──────────┘
//! ```

pub mod config;
pub mod consumers;
pub mod heartbeat;
pub mod notifier;
pub mod pipeline;
pub mod stats;

// Re-export main types
pub use config::{ConfigError, SparxConfig};
pub use consumers::{BookConsumer, TradeConsumer};
pub use heartbeat::spawn_heartbeat;
pub use notifier::{LogNotifier, format_signal_alert};
pub use pipeline::Pipeline;
pub use stats::{PipelineStats, StatsSnapshot};
