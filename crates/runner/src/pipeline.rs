//! Pipeline wiring
//!
//! ```text
//! producers ──► trade queue ──► TradeConsumer ──► PositionLedger ──► Notifier
//!           └─► depth queue ──► BookConsumer ──► ImbalanceBoard ──┘(read)
//! ```

use log::{info, warn};
use sparx_gateway::{DepthMessage, IngressSender, TradeMessage, ingress_queue};
use sparx_ledger::PositionLedger;
use sparx_ports::{Clock, Notifier};
use sparx_strategy::{BookImbalanceTracker, ImbalanceBoard, RollingAggregator, StrategyEngine};
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::config::SparxConfig;
use crate::consumers::{BookConsumer, TradeConsumer};
use crate::stats::PipelineStats;

/// Running pipeline: the producer ends of both queues plus the consumer tasks
pub struct Pipeline {
    trade_tx: IngressSender<TradeMessage>,
    depth_tx: IngressSender<DepthMessage>,
    board: ImbalanceBoard,
    stats: Arc<PipelineStats>,
    trade_task: JoinHandle<()>,
    book_task: JoinHandle<()>,
}

impl Pipeline {
    /// Create both queues and spawn one consumer task per queue
    pub fn spawn(
        config: &SparxConfig,
        positions: PositionLedger,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let (trade_tx, trade_rx) = ingress_queue::<TradeMessage>();
        let (depth_tx, depth_rx) = ingress_queue::<DepthMessage>();
        let board = ImbalanceBoard::new();
        let stats = Arc::new(PipelineStats::new());

        let trades = TradeConsumer::new(
            RollingAggregator::new(config.aggregator.clone()),
            StrategyEngine::new(config.strategy.clone(), config.fear.clone()),
            board.clone(),
            positions,
            notifier,
            clock,
            stats.clone(),
        );
        let books = BookConsumer::new(BookImbalanceTracker::new(board.clone()), stats.clone());

        let trade_task = tokio::spawn(trades.run(trade_rx));
        let book_task = tokio::spawn(books.run(depth_rx));

        info!(
            "[Pipeline] Started (window={}s, history={}, veto>={})",
            config.aggregator.window_seconds,
            config.aggregator.price_history_capacity,
            config.fear.veto_threshold
        );

        Self {
            trade_tx,
            depth_tx,
            board,
            stats,
            trade_task,
            book_task,
        }
    }

    pub fn trade_sender(&self) -> IngressSender<TradeMessage> {
        self.trade_tx.clone()
    }

    pub fn depth_sender(&self) -> IngressSender<DepthMessage> {
        self.depth_tx.clone()
    }

    pub fn board(&self) -> &ImbalanceBoard {
        &self.board
    }

    pub fn stats(&self) -> Arc<PipelineStats> {
        self.stats.clone()
    }

    /// Close the queues and wait for the consumers to drain them
    ///
    /// Only returns once every outstanding sender clone is dropped too.
    pub async fn shutdown(self) {
        let Self {
            trade_tx,
            depth_tx,
            trade_task,
            book_task,
            ..
        } = self;
        drop(trade_tx);
        drop(depth_tx);

        for (name, task) in [("trade", trade_task), ("book", book_task)] {
            if let Err(e) = task.await {
                warn!("[Pipeline] {} consumer ended abnormally: {}", name, e);
            }
        }
        info!("[Pipeline] Stopped");
    }
}
