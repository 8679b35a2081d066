//! Sparx Ledger
//!
//! The signal ledger is the source of truth for whether an instrument's
//! position is open. This crate provides:
//! - **PositionLedger**: enforces at most one open position per instrument
//!   and BUY/SELL alternation on top of any [`SignalLedger`]
//! - **InMemoryLedger**: volatile backend for tests and dry runs
//! - **JsonlLedger**: durable append-only JSON-lines backend
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sparx_ledger::{JsonlLedger, PositionLedger};
//!
//! let store = Arc::new(JsonlLedger::open("data/signals.jsonl").await?);
//! let positions = PositionLedger::new(store);
//!
//! if positions.get_open_position(&symbol).await?.is_none() {
//!     positions.record_buy(&symbol, price, metrics, clock.now()).await?;
//! }
//! ```

pub mod error;
pub mod file;
mod index;
pub mod memory;
pub mod position;

pub use error::{PositionError, Result};
pub use file::JsonlLedger;
pub use memory::InMemoryLedger;
pub use position::PositionLedger;
pub use sparx_ports::SignalLedger;
