//! Book Imbalance Tracker
//!
//! Keeps only the latest depth imbalance per instrument. The book consumer
//! writes the board; the trade consumer reads it. Last write wins and a
//! reader may see a value one snapshot old.

use dashmap::DashMap;
use log::debug;
use rust_decimal::prelude::ToPrimitive;
use sparx_core::{BookSnapshot, Symbol};
use std::sync::Arc;

/// Levels per side included in the imbalance
pub const TOP_LEVELS: usize = 5;

const IMBALANCE_EPSILON: f64 = 1e-6;

/// `(bid - ask) / (bid + ask + 1e-6)` over the best `depth` levels
///
/// Always strictly inside (-1, 1); an empty book gives 0.
pub fn depth_imbalance(snapshot: &BookSnapshot, depth: usize) -> f64 {
    let bid = snapshot.bid_volume(depth).to_f64().unwrap_or(0.0).max(0.0);
    let ask = snapshot.ask_volume(depth).to_f64().unwrap_or(0.0).max(0.0);
    (bid - ask) / (bid + ask + IMBALANCE_EPSILON)
}

/// Latest imbalance per instrument, shared between the two consumers
#[derive(Debug, Clone, Default)]
pub struct ImbalanceBoard {
    latest: Arc<DashMap<Symbol, f64>>,
}

impl ImbalanceBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, symbol: Symbol, imbalance: f64) {
        self.latest.insert(symbol, imbalance);
    }

    /// `None` until the first snapshot for the instrument has arrived
    pub fn latest(&self, symbol: &Symbol) -> Option<f64> {
        self.latest.get(symbol).map(|entry| *entry.value())
    }

    pub fn len(&self) -> usize {
        self.latest.len()
    }

    pub fn is_empty(&self) -> bool {
        self.latest.is_empty()
    }
}

/// Computes imbalances from depth snapshots and posts them to the board
#[derive(Debug, Clone)]
pub struct BookImbalanceTracker {
    depth: usize,
    board: ImbalanceBoard,
}

impl BookImbalanceTracker {
    pub fn new(board: ImbalanceBoard) -> Self {
        Self {
            depth: TOP_LEVELS,
            board,
        }
    }

    pub fn with_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    pub fn board(&self) -> &ImbalanceBoard {
        &self.board
    }

    pub fn on_snapshot(&self, snapshot: &BookSnapshot) -> f64 {
        let imbalance = depth_imbalance(snapshot, self.depth);
        debug!(
            "[BookImbalanceTracker] {} imbalance={:.4}",
            snapshot.symbol, imbalance
        );
        self.board.publish(snapshot.symbol.clone(), imbalance);
        imbalance
    }
}
