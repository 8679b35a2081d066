//! Rolling Aggregator
//!
//! Per-instrument trade windows and price histories. Owned by the trade
//! consumer; nothing else mutates it, so no locking is needed.

use log::debug;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use sparx_core::{Side, Symbol, Timestamp, Trade};
use std::collections::{HashMap, VecDeque};

use crate::trend::{DEFAULT_NEUTRAL_BAND, TrendDirection, log_price_slope};

/// Added to the sell volume so the ratio stays finite on one-sided flow
pub const VOLUME_RATIO_EPSILON: f64 = 1e-6;

/// Longest accepted trade window (one day)
pub const MAX_WINDOW_SECONDS: u64 = 86_400;

/// Configuration for the rolling aggregator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregatorConfig {
    /// Trade window length in seconds
    pub window_seconds: u64,
    /// Price history capacity (samples)
    pub price_history_capacity: usize,
    /// Samples needed before a slope is reported
    pub min_slope_samples: usize,
    /// Samples needed before divergence is reported
    pub min_divergence_samples: usize,
    /// Half-width of the neutral band used when logging trend direction
    pub neutral_band: f64,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            window_seconds: 5,
            price_history_capacity: 30,
            min_slope_samples: 10,
            min_divergence_samples: 20,
            neutral_band: DEFAULT_NEUTRAL_BAND,
        }
    }
}

/// Time-bounded buffer of recent trades for one instrument
#[derive(Debug, Clone)]
pub struct TradeBuffer {
    window: chrono::Duration,
    trades: VecDeque<Trade>,
    buy_volume: Decimal,
    sell_volume: Decimal,
}

impl TradeBuffer {
    pub fn new(window: chrono::Duration) -> Self {
        Self {
            window,
            trades: VecDeque::new(),
            buy_volume: Decimal::ZERO,
            sell_volume: Decimal::ZERO,
        }
    }

    /// Insert a trade and evict everything older than the window, measured
    /// from this trade's timestamp
    pub fn push(&mut self, trade: Trade) {
        let now = trade.timestamp();
        self.trades.push_back(trade);
        self.evict(now);
    }

    fn evict(&mut self, now: Timestamp) {
        let window = self.window;
        self.trades.retain(|t| now - t.timestamp() <= window);

        self.buy_volume = Decimal::ZERO;
        self.sell_volume = Decimal::ZERO;
        for trade in &self.trades {
            match trade.side() {
                Side::Buy => self.buy_volume += trade.quantity(),
                Side::Sell => self.sell_volume += trade.quantity(),
            }
        }
    }

    pub fn buy_volume(&self) -> Decimal {
        self.buy_volume
    }

    pub fn sell_volume(&self) -> Decimal {
        self.sell_volume
    }

    /// `buy / (sell + 1e-6)`
    pub fn volume_ratio(&self) -> f64 {
        let buy = self.buy_volume.to_f64().unwrap_or(0.0);
        let sell = self.sell_volume.to_f64().unwrap_or(0.0);
        buy / (sell + VOLUME_RATIO_EPSILON)
    }

    pub fn len(&self) -> usize {
        self.trades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Trade> {
        self.trades.iter()
    }
}

/// Fixed-capacity ring of recent trade prices; the oldest sample is dropped
/// once full
#[derive(Debug, Clone)]
pub struct PriceHistory {
    capacity: usize,
    prices: VecDeque<f64>,
}

impl PriceHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            prices: VecDeque::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, price: f64) {
        if self.capacity == 0 {
            return;
        }
        if self.prices.len() >= self.capacity {
            self.prices.pop_front();
        }
        self.prices.push_back(price);
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The most recent `n` prices, oldest first
    pub fn latest(&self, n: usize) -> Vec<f64> {
        let skip = self.prices.len().saturating_sub(n);
        self.prices.iter().skip(skip).copied().collect()
    }
}

/// Metrics emitted for every processed trade
#[derive(Debug, Clone, PartialEq)]
pub struct WindowMetrics {
    pub symbol: Symbol,
    pub price: Decimal,
    pub timestamp: Timestamp,
    pub buy_volume: Decimal,
    pub sell_volume: Decimal,
    pub volume_ratio: f64,
    /// `None` until enough samples exist; never defaulted to zero
    pub slope: Option<f64>,
    pub divergence: Option<f64>,
    pub trades_in_window: usize,
}

#[derive(Debug, Clone)]
struct InstrumentWindow {
    trades: TradeBuffer,
    prices: PriceHistory,
}

/// Rolling aggregator over all monitored instruments
///
/// Windows are created lazily on an instrument's first trade and live for
/// the lifetime of the aggregator.
#[derive(Debug, Clone)]
pub struct RollingAggregator {
    config: AggregatorConfig,
    windows: HashMap<Symbol, InstrumentWindow>,
}

impl RollingAggregator {
    pub fn new(config: AggregatorConfig) -> Self {
        Self {
            config,
            windows: HashMap::new(),
        }
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    /// Fold a trade into its instrument's window and report the new metrics
    pub fn on_trade(&mut self, trade: Trade) -> WindowMetrics {
        let symbol = trade.symbol().clone();
        let price = trade.price();
        let timestamp = trade.timestamp();
        let config = &self.config;

        let window = self
            .windows
            .entry(symbol.clone())
            .or_insert_with(|| InstrumentWindow {
                trades: TradeBuffer::new(chrono::Duration::seconds(
                    config.window_seconds.min(MAX_WINDOW_SECONDS) as i64,
                )),
                prices: PriceHistory::new(config.price_history_capacity),
            });

        window.trades.push(trade);
        window.prices.push(price.to_f64().unwrap_or(0.0));

        let slope = slope_of(&window.prices, config.min_slope_samples);
        let divergence = divergence_of(&window.prices, config);

        if let Some(s) = slope {
            debug!(
                "[RollingAggregator] {} slope={:.6} {}",
                symbol,
                s,
                TrendDirection::classify(s, config.neutral_band)
            );
        }

        WindowMetrics {
            symbol,
            price,
            timestamp,
            buy_volume: window.trades.buy_volume(),
            sell_volume: window.trades.sell_volume(),
            volume_ratio: window.trades.volume_ratio(),
            slope,
            divergence,
            trades_in_window: window.trades.len(),
        }
    }

    /// Current slope for an instrument over the whole history
    pub fn slope(&self, symbol: &Symbol) -> Option<f64> {
        let window = self.windows.get(symbol)?;
        slope_of(&window.prices, self.config.min_slope_samples)
    }

    pub fn instruments(&self) -> usize {
        self.windows.len()
    }
}

/// Slope over the whole history, once it holds at least `min_samples`
fn slope_of(prices: &PriceHistory, min_samples: usize) -> Option<f64> {
    if prices.len() < min_samples {
        return None;
    }
    log_price_slope(&prices.latest(prices.len()))
}

/// Short-horizon slope minus long-horizon slope
fn divergence_of(prices: &PriceHistory, config: &AggregatorConfig) -> Option<f64> {
    if prices.len() < config.min_divergence_samples {
        return None;
    }
    let short = log_price_slope(&prices.latest(config.min_slope_samples))?;
    let long = log_price_slope(&prices.latest(config.min_divergence_samples))?;
    Some(short - long)
}
