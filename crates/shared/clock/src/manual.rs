use chrono::{Duration, Utc};
use sparx_core::Timestamp;
use sparx_ports::Clock;
use std::sync::RwLock;

/// Clock frozen at a given instant, advanced explicitly
pub struct ManualClock {
    current: RwLock<Timestamp>,
}

impl ManualClock {
    /// Freeze time at `start`
    pub fn starting_at(start: Timestamp) -> Self {
        Self {
            current: RwLock::new(start),
        }
    }

    /// Freeze time at the current wall-clock instant
    pub fn frozen_now() -> Self {
        Self::starting_at(Utc::now())
    }

    /// Move time forward by `by`
    pub fn advance(&self, by: Duration) {
        let mut current = self.current.write().unwrap_or_else(|e| e.into_inner());
        *current += by;
    }

    /// Jump to an absolute instant
    pub fn set(&self, to: Timestamp) {
        let mut current = self.current.write().unwrap_or_else(|e| e.into_inner());
        *current = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self.current.read().unwrap_or_else(|e| e.into_inner())
    }

    fn name(&self) -> &str {
        "ManualClock"
    }
}
