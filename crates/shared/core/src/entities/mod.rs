mod book;
mod side;
mod signal;
mod trade;

pub use book::{BookLevel, BookSnapshot};
pub use side::Side;
pub use signal::{Signal, SignalKind, SignalMetrics, TradeId, profit_pct};
pub use trade::Trade;
