//! Sparx Ports
//!
//! Port definitions (traits) for the Sparx signal pipeline.
//! These define the boundaries between the pipeline core and the external
//! collaborators it talks to: time, the signal ledger and the alert channel.

mod clock;
mod error;
mod ledger;
mod notifier;

pub use clock::Clock;
pub use error::{LedgerError, LedgerResult, NotifyError};
pub use ledger::SignalLedger;
pub use notifier::Notifier;
