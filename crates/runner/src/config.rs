//! Runtime configuration
//!
//! Loaded from a JSON file, then overlaid with environment variables:
//!
//! | variable | field |
//! |---|---|
//! | `SPARX_SYMBOLS` | `symbols` (comma separated) |
//! | `SPARX_LEDGER_PATH` | `ledger_path` |
//! | `SPARX_INSTRUMENT_COUNT` | `instrument_count` |
//!
//! Every field has a default, so an empty object `{}` is a valid file.

use log::{info, warn};
use serde::{Deserialize, Serialize};
use sparx_core::Symbol;
use sparx_gateway::universe::{load_tickers, rank_by_quote_volume};
use sparx_strategy::{
    AggregatorConfig, FearConfig, MAX_WINDOW_SECONDS, StrategyConfig, StrategyEngine,
};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {error}")]
    Io { path: String, error: std::io::Error },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid environment override {name}={value}")]
    Env { name: &'static str, value: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to load ticker snapshot: {0}")]
    Universe(#[from] sparx_gateway::GatewayError),
}

/// Root configuration for the signal pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SparxConfig {
    pub aggregator: AggregatorConfig,
    pub strategy: StrategyConfig,
    pub fear: FearConfig,
    /// Explicit instruments to monitor
    pub symbols: Vec<String>,
    /// How many instruments to monitor
    pub instrument_count: usize,
    /// JSON-lines signal ledger
    pub ledger_path: PathBuf,
    pub heartbeat_interval_secs: u64,
    /// 24h ticker snapshot; when set, instruments are ranked from it
    pub tickers_path: Option<PathBuf>,
}

impl Default for SparxConfig {
    fn default() -> Self {
        Self {
            aggregator: AggregatorConfig::default(),
            strategy: StrategyConfig::default(),
            fear: FearConfig::default(),
            symbols: vec!["BTCUSDC".to_string()],
            instrument_count: 10,
            ledger_path: PathBuf::from("data/signals.jsonl"),
            heartbeat_interval_secs: 60,
            tickers_path: None,
        }
    }
}

impl SparxConfig {
    /// Load configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path.as_ref()).map_err(|error| ConfigError::Io {
                path: path.as_ref().display().to_string(),
                error,
            })?;

        Self::from_json(&content)
    }

    /// Parse configuration from JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Overlay `SPARX_*` variables from the process environment
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    /// Overlay overrides from an arbitrary lookup
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("SPARX_SYMBOLS") {
            self.symbols = value
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(value) = lookup("SPARX_LEDGER_PATH") {
            self.ledger_path = PathBuf::from(value);
        }
        if let Some(value) = lookup("SPARX_INSTRUMENT_COUNT") {
            self.instrument_count = value.trim().parse().map_err(|_| ConfigError::Env {
                name: "SPARX_INSTRUMENT_COUNT",
                value,
            })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let agg = &self.aggregator;
        if agg.window_seconds == 0 {
            return Err(ConfigError::Invalid("aggregator.window_seconds must be positive".into()));
        }
        if agg.window_seconds > MAX_WINDOW_SECONDS {
            return Err(ConfigError::Invalid(format!(
                "aggregator.window_seconds must be at most {}",
                MAX_WINDOW_SECONDS
            )));
        }
        if agg.min_slope_samples < 2 {
            return Err(ConfigError::Invalid("aggregator.min_slope_samples must be at least 2".into()));
        }
        if agg.min_divergence_samples <= agg.min_slope_samples {
            return Err(ConfigError::Invalid(
                "aggregator.min_divergence_samples must exceed min_slope_samples".into(),
            ));
        }
        if agg.price_history_capacity < agg.min_divergence_samples {
            return Err(ConfigError::Invalid(
                "aggregator.price_history_capacity must hold min_divergence_samples".into(),
            ));
        }
        if self.strategy.imbalance_threshold < 0.0 || self.strategy.slope_threshold < 0.0 {
            return Err(ConfigError::Invalid("strategy thresholds must be non-negative".into()));
        }
        if self.fear.veto_threshold == 0 {
            return Err(ConfigError::Invalid(
                "fear.veto_threshold of 0 would veto every decision".into(),
            ));
        }
        if self.instrument_count == 0 {
            return Err(ConfigError::Invalid("instrument_count must be positive".into()));
        }
        if self.tickers_path.is_none() && self.symbols.is_empty() {
            return Err(ConfigError::Invalid("no symbols configured and no tickers_path".into()));
        }
        if self.heartbeat_interval_secs == 0 {
            return Err(ConfigError::Invalid("heartbeat_interval_secs must be positive".into()));
        }
        if self.exits_always_vetoed() {
            warn!(
                "[Config] Every exit signal is vetoed with these thresholds and fear.veto_exits=true; \
                 open positions will never be closed"
            );
        }
        Ok(())
    }

    /// Whether the fear gate vetoes every possible exit signal
    pub fn exits_always_vetoed(&self) -> bool {
        StrategyEngine::new(self.strategy.clone(), self.fear.clone()).exits_always_vetoed()
    }

    /// Instruments to monitor: ranked from the ticker snapshot when one is
    /// configured, else the explicit list, capped at `instrument_count`
    pub fn resolve_symbols(&self) -> Result<Vec<Symbol>, ConfigError> {
        let symbols: Vec<Symbol> = match &self.tickers_path {
            Some(path) => {
                let tickers = load_tickers(path)?;
                info!(
                    "[Config] Ranking {} tickers from {}",
                    tickers.len(),
                    path.display()
                );
                rank_by_quote_volume(&tickers, self.instrument_count)
            }
            None => self
                .symbols
                .iter()
                .map(Symbol::new)
                .take(self.instrument_count)
                .collect(),
        };

        if symbols.is_empty() {
            return Err(ConfigError::Invalid("no eligible instruments".into()));
        }
        Ok(symbols)
    }
}
