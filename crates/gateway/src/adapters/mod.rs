//! Exchange adapters
//!
//! Adapters turn an exchange's raw stream into [`crate::messages`] and publish
//! them onto the ingress queues.

pub mod binance;
