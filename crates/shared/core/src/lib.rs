//! Sparx Core Domain
//!
//! Pure domain types for the Sparx signal pipeline.
//! This crate contains no async, no I/O, and is 100% unit testable.

pub mod entities;
pub mod error;
pub mod values;

// Re-export commonly used types at crate root
pub use entities::{
    BookLevel, BookSnapshot, Side, Signal, SignalKind, SignalMetrics, Trade, TradeId, profit_pct,
};
pub use error::DomainError;
pub use values::{Price, Quantity, Symbol, Timestamp};
