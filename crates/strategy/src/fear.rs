//! Fear Gate
//!
//! A discrete risk score in `0..=3` built from three independent stress
//! readings. At or above the veto threshold the strategy is not consulted.

use serde::{Deserialize, Serialize};

/// Configuration for the fear gate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FearConfig {
    /// Imbalance below this counts as book stress
    pub imbalance_below: f64,
    /// Volume ratio below this counts as selling pressure
    pub volume_ratio_below: f64,
    /// Fear index at which decisions are vetoed
    pub veto_threshold: u8,
    /// Whether a veto also blocks closing an open position
    pub veto_exits: bool,
}

impl Default for FearConfig {
    fn default() -> Self {
        Self {
            imbalance_below: -0.3,
            volume_ratio_below: 0.8,
            veto_threshold: 2,
            veto_exits: true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FearGate {
    config: FearConfig,
}

impl FearGate {
    pub fn new(config: FearConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FearConfig {
        &self.config
    }

    /// One point each for a bid-light book, seller-dominated flow and a
    /// known negative slope. An unknown slope adds nothing.
    pub fn fear_index(&self, imbalance: f64, volume_ratio: f64, slope: Option<f64>) -> u8 {
        let mut fear = 0;
        if imbalance < self.config.imbalance_below {
            fear += 1;
        }
        if volume_ratio < self.config.volume_ratio_below {
            fear += 1;
        }
        if slope.is_some_and(|s| s < 0.0) {
            fear += 1;
        }
        fear
    }

    pub fn is_vetoed(&self, fear_index: u8) -> bool {
        fear_index >= self.config.veto_threshold
    }

    /// Vetoed for entries and exits alike
    pub fn blocks_exits(&self, fear_index: u8) -> bool {
        self.config.veto_exits && self.is_vetoed(fear_index)
    }
}
