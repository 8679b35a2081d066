//! Sparx Clock Infrastructure
//!
//! - [`SystemClock`]: wall-clock time, used by the running service
//! - [`ManualClock`]: frozen time that only moves when told to, used by tests
//!   that need deterministic signal timestamps
//!
//! ## Usage
//!
//! ```ignore
//! use sparx_clock::{Clock, ManualClock};
//! use chrono::Duration;
//!
//! let clock = ManualClock::starting_at(start);
//! clock.advance(Duration::seconds(5));
//! assert_eq!(clock.now(), start + Duration::seconds(5));
//! ```

mod manual;
mod system;

pub use manual::ManualClock;
pub use system::SystemClock;

// Re-export the Clock trait for convenience
pub use sparx_ports::Clock;
