//! Transport abstraction layer
//!
//! The ingress queues decouple market-data delivery from processing. Any
//! number of producers publish without blocking; exactly one consumer per
//! queue drains it in FIFO order.

pub mod queue;

pub use queue::{IngressReceiver, IngressSender, ingress_queue};

use crate::error::TransportError;
use async_trait::async_trait;

/// Publisher - producer side of an ingress queue
///
/// `publish` must never block the caller: it is invoked from market-data
/// delivery contexts.
pub trait Publisher<M>: Send + Sync {
    /// Enqueue a message
    fn publish(&self, msg: M) -> Result<(), TransportError>;
}

/// Subscriber - the single consumer side of an ingress queue
#[async_trait]
pub trait Subscriber<M>: Send {
    /// Wait for the next message; `None` once every publisher is gone and
    /// the queue is drained
    async fn next(&mut self) -> Option<M>;

    /// Try to receive without waiting (returns None if no message available)
    fn try_next(&mut self) -> Result<Option<M>, TransportError>;
}
