use async_trait::async_trait;
use sparx_core::Signal;

use crate::error::NotifyError;

/// Port for best-effort outbound alerting
///
/// Callers log and drop any error; a failing notifier never affects the
/// pipeline.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Announce a newly recorded signal
    async fn notify_signal(&self, signal: &Signal) -> Result<(), NotifyError>;

    /// Announce a processing fault (ledger failure, upstream error, ...)
    async fn notify_fault(&self, context: &str, detail: &str) -> Result<(), NotifyError>;
}
