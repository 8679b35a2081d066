//! Stream feed - routes decoded stream messages onto the ingress queues
//!
//! The feed is the delivery context of the pipeline. It must never stall on
//! processing, so it only decodes and enqueues. A bad line is reported and
//! skipped; only a closed queue ends the feed early.

use log::{debug, info, warn};
use sparx_core::Symbol;
use std::collections::HashSet;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use super::parsers::{StreamEvent, parse_stream_message};
use crate::error::GatewayError;
use crate::messages::{DepthMessage, TradeMessage};
use crate::transport::Publisher;

/// Counters for what the feed has seen
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FeedStats {
    pub trades: u64,
    pub depths: u64,
    pub malformed: u64,
    pub upstream_errors: u64,
    /// Events for symbols outside the monitored set
    pub filtered: u64,
}

/// Binance combined-stream feed
pub struct StreamFeed {
    /// Publisher for trade prints
    trade_publisher: Box<dyn Publisher<TradeMessage>>,
    /// Publisher for depth snapshots
    depth_publisher: Box<dyn Publisher<DepthMessage>>,
    /// Monitored symbols; `None` accepts everything
    symbols: Option<HashSet<Symbol>>,
    stats: FeedStats,
}

impl StreamFeed {
    /// Create with custom publishers
    pub fn new(
        trade_publisher: Box<dyn Publisher<TradeMessage>>,
        depth_publisher: Box<dyn Publisher<DepthMessage>>,
    ) -> Self {
        Self {
            trade_publisher,
            depth_publisher,
            symbols: None,
            stats: FeedStats::default(),
        }
    }

    /// Only forward events for these symbols
    pub fn with_symbols(mut self, symbols: impl IntoIterator<Item = Symbol>) -> Self {
        self.symbols = Some(symbols.into_iter().collect());
        self
    }

    pub fn stats(&self) -> FeedStats {
        self.stats
    }

    fn is_monitored(&self, symbol: &str) -> bool {
        self.symbols
            .as_ref()
            .is_none_or(|set| set.contains(&Symbol::new(symbol)))
    }

    /// Handle one raw line
    ///
    /// Per-message problems are logged and counted; the returned error is
    /// reserved for a closed queue.
    pub fn handle_line(&mut self, line: &str) -> Result<(), GatewayError> {
        match self.route_line(line) {
            Err(e) if e.is_per_message() => {
                if let GatewayError::Upstream(message) = &e {
                    self.stats.upstream_errors += 1;
                    warn!("[StreamFeed] Upstream channel error: {}", message);
                } else {
                    self.stats.malformed += 1;
                    warn!("[StreamFeed] Discarding malformed message: {}", e);
                }
                Ok(())
            }
            other => other,
        }
    }

    fn route_line(&mut self, line: &str) -> Result<(), GatewayError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(());
        }

        match parse_stream_message(line)? {
            StreamEvent::Trade(msg) => {
                if !self.is_monitored(&msg.symbol) {
                    self.stats.filtered += 1;
                    return Ok(());
                }
                self.trade_publisher.publish(msg)?;
                self.stats.trades += 1;
            }
            StreamEvent::Depth(msg) => {
                if !self.is_monitored(&msg.symbol) {
                    self.stats.filtered += 1;
                    return Ok(());
                }
                self.depth_publisher.publish(msg)?;
                self.stats.depths += 1;
            }
            StreamEvent::Error(message) => return Err(GatewayError::Upstream(message)),
            StreamEvent::Control => debug!("[StreamFeed] Control message: {}", line),
        }
        Ok(())
    }

    /// Read newline-delimited messages until EOF
    pub async fn run<R>(mut self, reader: R) -> Result<FeedStats, GatewayError>
    where
        R: AsyncBufRead + Unpin,
    {
        info!("[StreamFeed] Feed started");
        let mut lines = reader.lines();

        while let Some(line) = lines.next_line().await? {
            self.handle_line(&line)?;
        }

        info!(
            "[StreamFeed] Feed ended: {} trades, {} depth, {} malformed, {} upstream errors",
            self.stats.trades, self.stats.depths, self.stats.malformed, self.stats.upstream_errors
        );
        Ok(self.stats)
    }
}
