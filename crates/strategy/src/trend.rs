//! Trend estimation
//!
//! Slope of a least-squares line through `ln(price)` against sample index.
//! On a log scale the slope reads as a per-trade relative drift.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default half-width of the neutral band for [`TrendDirection::classify`]
pub const DEFAULT_NEUTRAL_BAND: f64 = 0.0005;

/// OLS slope of `ln(price)` over sample index `0..n`
///
/// Returns `None` for fewer than two samples or any non-positive price.
pub fn log_price_slope(prices: &[f64]) -> Option<f64> {
    let n = prices.len();
    if n < 2 || prices.iter().any(|p| !p.is_finite() || *p <= 0.0) {
        return None;
    }

    let n_f = n as f64;
    let x_mean = (n_f - 1.0) / 2.0;
    let y_mean = prices.iter().map(|p| p.ln()).sum::<f64>() / n_f;

    let mut covariance = 0.0;
    let mut variance = 0.0;
    for (i, price) in prices.iter().enumerate() {
        let dx = i as f64 - x_mean;
        covariance += dx * (price.ln() - y_mean);
        variance += dx * dx;
    }

    Some(covariance / variance)
}

/// Coarse reading of a slope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendDirection {
    Up,
    Down,
    Neutral,
}

impl TrendDirection {
    /// Classify a slope against a symmetric neutral band
    pub fn classify(slope: f64, neutral_band: f64) -> Self {
        if slope > neutral_band {
            TrendDirection::Up
        } else if slope < -neutral_band {
            TrendDirection::Down
        } else {
            TrendDirection::Neutral
        }
    }
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TrendDirection::Up => "UPTREND",
            TrendDirection::Down => "DOWNTREND",
            TrendDirection::Neutral => "NEUTRAL",
        };
        f.write_str(label)
    }
}
