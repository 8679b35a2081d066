//! Liveness heartbeat
//!
//! Logs one line per interval with the pipeline counters so an operator can
//! tell a quiet market from a stalled process.

use log::info;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::stats::{PipelineStats, StatsSnapshot};

pub fn format_heartbeat(snapshot: &StatsSnapshot) -> String {
    format!(
        "alive: trades={} books={} malformed={} signals={} vetoes={} ledger_faults={}",
        snapshot.trades,
        snapshot.books,
        snapshot.malformed,
        snapshot.signals,
        snapshot.vetoes,
        snapshot.ledger_faults
    )
}

/// Spawn the heartbeat task; abort the handle to stop it
pub fn spawn_heartbeat(stats: Arc<PipelineStats>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // First tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;
            info!("[Heartbeat] {}", format_heartbeat(&stats.snapshot()));
        }
    })
}
