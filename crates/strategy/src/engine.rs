//! Strategy Engine
//!
//! Pure decision function. Position state is never cached here: callers
//! read it from the ledger and pass it in for every decision.

use serde::{Deserialize, Serialize};
use sparx_core::SignalMetrics;
use std::fmt;

use crate::fear::{FearConfig, FearGate};

/// Entry and exit thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    /// Entry needs imbalance above this; exit needs it below the negation
    pub imbalance_threshold: f64,
    pub buy_volume_ratio: f64,
    pub sell_volume_ratio: f64,
    /// Entry needs slope above this; exit needs it below the negation
    pub slope_threshold: f64,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            imbalance_threshold: 0.35,
            buy_volume_ratio: 1.5,
            sell_volume_ratio: 0.65,
            slope_threshold: 0.001,
        }
    }
}

/// Market readings for one trade event
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarketInputs {
    pub imbalance: f64,
    pub volume_ratio: f64,
    pub slope: Option<f64>,
    pub divergence: Option<f64>,
}

/// Position state as derived from the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionState {
    NoPosition,
    OpenPosition,
}

impl PositionState {
    pub fn from_open(is_open: bool) -> Self {
        if is_open {
            PositionState::OpenPosition
        } else {
            PositionState::NoPosition
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Buy,
    Sell,
    Hold,
    Vetoed { fear_index: u8 },
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Buy => write!(f, "BUY"),
            Decision::Sell => write!(f, "SELL"),
            Decision::Hold => write!(f, "HOLD"),
            Decision::Vetoed { fear_index } => write!(f, "VETOED(fear={})", fear_index),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct StrategyEngine {
    config: StrategyConfig,
    gate: FearGate,
}

impl StrategyEngine {
    pub fn new(config: StrategyConfig, fear: FearConfig) -> Self {
        Self {
            config,
            gate: FearGate::new(fear),
        }
    }

    pub fn config(&self) -> &StrategyConfig {
        &self.config
    }

    pub fn gate(&self) -> &FearGate {
        &self.gate
    }

    pub fn should_buy(&self, imbalance: f64, volume_ratio: f64, slope: Option<f64>) -> bool {
        imbalance > self.config.imbalance_threshold
            && volume_ratio > self.config.buy_volume_ratio
            && slope.is_some_and(|s| s > self.config.slope_threshold)
    }

    pub fn should_sell(&self, imbalance: f64, volume_ratio: f64, slope: Option<f64>) -> bool {
        imbalance < -self.config.imbalance_threshold
            && volume_ratio < self.config.sell_volume_ratio
            && slope.is_some_and(|s| s < -self.config.slope_threshold)
    }

    /// True when every exit condition already scores enough fear to veto
    /// itself, so an open position can never be closed
    pub fn exits_always_vetoed(&self) -> bool {
        let fear = self.gate.config();
        if !fear.veto_exits {
            return false;
        }
        let mut guaranteed = 0u8;
        if -self.config.imbalance_threshold <= fear.imbalance_below {
            guaranteed += 1;
        }
        if self.config.sell_volume_ratio <= fear.volume_ratio_below {
            guaranteed += 1;
        }
        if self.config.slope_threshold >= 0.0 {
            guaranteed += 1;
        }
        self.gate.is_vetoed(guaranteed)
    }

    /// Score the inputs; the result is what gets recorded with a signal
    pub fn assess(&self, inputs: &MarketInputs) -> SignalMetrics {
        SignalMetrics {
            imbalance: inputs.imbalance,
            volume_ratio: inputs.volume_ratio,
            slope: inputs.slope,
            divergence: inputs.divergence,
            fear_index: self
                .gate
                .fear_index(inputs.imbalance, inputs.volume_ratio, inputs.slope),
        }
    }

    /// True when no decision is possible whatever the position, so the
    /// ledger need not be read
    pub fn is_fully_vetoed(&self, metrics: &SignalMetrics) -> bool {
        self.gate.blocks_exits(metrics.fear_index)
    }

    pub fn decide(&self, metrics: &SignalMetrics, position: PositionState) -> Decision {
        let fear_index = metrics.fear_index;
        let vetoed = match position {
            PositionState::NoPosition => self.gate.is_vetoed(fear_index),
            PositionState::OpenPosition => self.gate.blocks_exits(fear_index),
        };
        if vetoed {
            return Decision::Vetoed { fear_index };
        }

        let (imbalance, volume_ratio, slope) =
            (metrics.imbalance, metrics.volume_ratio, metrics.slope);
        match position {
            PositionState::NoPosition if self.should_buy(imbalance, volume_ratio, slope) => {
                Decision::Buy
            }
            PositionState::OpenPosition if self.should_sell(imbalance, volume_ratio, slope) => {
                Decision::Sell
            }
            _ => Decision::Hold,
        }
    }
}
