//! Unbounded FIFO ingress queue on tokio channels
//!
//! Enqueue is O(1) and never waits. If the consumer stalls for long the
//! backlog grows without bound; [`IngressReceiver::backlog`] exposes the
//! current depth.

use crate::error::TransportError;
use crate::transport::{Publisher, Subscriber};
use async_trait::async_trait;
use tokio::sync::mpsc;

/// Create an unbounded ingress queue
pub fn ingress_queue<M: Send>() -> (IngressSender<M>, IngressReceiver<M>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (IngressSender { tx }, IngressReceiver { rx })
}

/// Producer handle; cheap to clone, one per delivery context
pub struct IngressSender<M> {
    tx: mpsc::UnboundedSender<M>,
}

impl<M> Clone for IngressSender<M> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<M: Send> IngressSender<M> {
    /// Enqueue without blocking
    pub fn enqueue(&self, msg: M) -> Result<(), TransportError> {
        self.tx.send(msg).map_err(|_| TransportError::ChannelClosed)
    }

    /// True once the consumer has been dropped
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl<M: Send> Publisher<M> for IngressSender<M> {
    fn publish(&self, msg: M) -> Result<(), TransportError> {
        self.enqueue(msg)
    }
}

/// Consumer handle; not clonable, so each queue has exactly one consumer
pub struct IngressReceiver<M> {
    rx: mpsc::UnboundedReceiver<M>,
}

impl<M: Send> IngressReceiver<M> {
    /// Suspend until a message is available
    pub async fn dequeue(&mut self) -> Option<M> {
        self.rx.recv().await
    }

    /// Number of messages waiting
    pub fn backlog(&self) -> usize {
        self.rx.len()
    }
}

#[async_trait]
impl<M: Send> Subscriber<M> for IngressReceiver<M> {
    async fn next(&mut self) -> Option<M> {
        self.dequeue().await
    }

    fn try_next(&mut self) -> Result<Option<M>, TransportError> {
        match self.rx.try_recv() {
            Ok(msg) => Ok(Some(msg)),
            Err(mpsc::error::TryRecvError::Empty) => Ok(None),
            Err(mpsc::error::TryRecvError::Disconnected) => Err(TransportError::ChannelClosed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_fifo_order() {
        let (tx, mut rx) = ingress_queue::<u32>();
        for i in 0..100 {
            tx.enqueue(i).unwrap();
        }
        assert_eq!(rx.backlog(), 100);

        for i in 0..100 {
            assert_eq!(rx.dequeue().await, Some(i));
        }
        assert_eq!(rx.try_next(), Ok(None));
    }

    #[tokio::test]
    async fn test_concurrent_producers_lose_nothing() {
        let (tx, mut rx) = ingress_queue::<(usize, usize)>();

        let producers: Vec<_> = (0..4)
            .map(|p| {
                let tx = tx.clone();
                std::thread::spawn(move || {
                    for i in 0..1000 {
                        tx.enqueue((p, i)).unwrap();
                    }
                })
            })
            .collect();
        for handle in producers {
            handle.join().unwrap();
        }
        drop(tx);

        let mut last_seen = [None::<usize>; 4];
        let mut total = 0;
        while let Some((p, i)) = rx.dequeue().await {
            // Per-producer order is preserved
            if let Some(prev) = last_seen[p] {
                assert!(i > prev);
            }
            last_seen[p] = Some(i);
            total += 1;
        }
        assert_eq!(total, 4000);
    }

    #[tokio::test]
    async fn test_dequeue_waits_for_producer() {
        let (tx, mut rx) = ingress_queue::<&'static str>();

        let handle = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            tx.enqueue("late").unwrap();
        });

        assert_eq!(rx.dequeue().await, Some("late"));
        handle.await.unwrap();
        assert_eq!(rx.dequeue().await, None);
    }

    #[tokio::test]
    async fn test_enqueue_after_consumer_dropped() {
        let (tx, rx) = ingress_queue::<u8>();
        drop(rx);
        assert!(tx.is_closed());
        assert_eq!(tx.enqueue(1), Err(TransportError::ChannelClosed));
    }
}
