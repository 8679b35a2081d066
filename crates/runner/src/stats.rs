//! Pipeline counters shared between the consumers and the heartbeat

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct PipelineStats {
    trades: AtomicU64,
    books: AtomicU64,
    malformed: AtomicU64,
    signals: AtomicU64,
    vetoes: AtomicU64,
    ledger_faults: AtomicU64,
}

/// Point-in-time copy of [`PipelineStats`]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub trades: u64,
    pub books: u64,
    pub malformed: u64,
    pub signals: u64,
    pub vetoes: u64,
    pub ledger_faults: u64,
}

impl PipelineStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_trade(&self) {
        self.trades.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_book(&self) {
        self.books.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_malformed(&self) {
        self.malformed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_signal(&self) {
        self.signals.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_veto(&self) {
        self.vetoes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_ledger_fault(&self) {
        self.ledger_faults.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            trades: self.trades.load(Ordering::Relaxed),
            books: self.books.load(Ordering::Relaxed),
            malformed: self.malformed.load(Ordering::Relaxed),
            signals: self.signals.load(Ordering::Relaxed),
            vetoes: self.vetoes.load(Ordering::Relaxed),
            ledger_faults: self.ledger_faults.load(Ordering::Relaxed),
        }
    }
}
