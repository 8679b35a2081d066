//! Alert formatting and the log-backed notifier

use async_trait::async_trait;
use log::{info, warn};
use sparx_core::Signal;
use sparx_ports::{Notifier, NotifyError};

/// Plain-text alert for a recorded signal
pub fn format_signal_alert(signal: &Signal) -> String {
    let metrics = signal.metrics();
    let slope = metrics
        .slope
        .map(|s| format!("{:.6}", s))
        .unwrap_or_else(|| "n/a".to_string());

    let mut alert = format!(
        "{} {}\nPrice: {}\nImbalance: {:.4}\nVolume ratio: {:.2}\nSlope: {}\nFear index: {}",
        signal.kind(),
        signal.symbol(),
        signal.price(),
        metrics.imbalance,
        metrics.volume_ratio,
        slope,
        metrics.fear_index
    );
    if let Some(profit) = signal.profit_pct() {
        alert.push_str(&format!("\nProfit: {}%", profit.round_dp(2)));
    }
    alert
}

/// Delivers alerts to the process log
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

impl LogNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify_signal(&self, signal: &Signal) -> Result<(), NotifyError> {
        info!(
            "[Alert] {}",
            format_signal_alert(signal).replace('\n', " | ")
        );
        Ok(())
    }

    async fn notify_fault(&self, context: &str, detail: &str) -> Result<(), NotifyError> {
        warn!("[Alert] Fault in {}: {}", context, detail);
        Ok(())
    }
}
