//! Sparx Strategy
//!
//! Signal derivation and decision logic:
//! - Rolling trade windows and price histories per instrument
//! - Log-price trend slope and short/long divergence
//! - Top-of-book depth imbalance, shared through a last-write-wins board
//! - Fear gate that vetoes decisions under market stress
//! - Strategy engine mapping readings and position state to BUY / SELL / HOLD
//!
//! ## Architecture
//!
//! ```text
//!   trade queue                     depth queue
//!        │                               │
//! ┌──────▼────────────┐       ┌──────────▼───────────┐
//! │ RollingAggregator │       │ BookImbalanceTracker │
//! └──────┬────────────┘       └──────────┬───────────┘
//!        │ ratio, slope                  │ imbalance
//!        │           ImbalanceBoard ◄────┘
//!        ▼                 │
//!   ┌─────────┐            │
//!   │FearGate │◄───────────┘
//!   └────┬────┘
//!        ▼
//! ┌────────────────┐
//! │ StrategyEngine │ ◄── position state (ledger)
//! └────────────────┘
//! ```
//!
//! Everything here is synchronous and free of I/O.

pub mod aggregator;
pub mod engine;
pub mod fear;
pub mod imbalance;
pub mod trend;

pub use aggregator::{
    AggregatorConfig, MAX_WINDOW_SECONDS, PriceHistory, RollingAggregator, TradeBuffer, WindowMetrics,
};
pub use engine::{Decision, MarketInputs, PositionState, StrategyConfig, StrategyEngine};
pub use fear::{FearConfig, FearGate};
pub use imbalance::{BookImbalanceTracker, ImbalanceBoard, TOP_LEVELS, depth_imbalance};
pub use trend::{TrendDirection, log_price_slope};
