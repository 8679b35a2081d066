//! Queue consumers
//!
//! Exactly one task drains each ingress queue. All per-instrument state
//! lives inside the consumer that owns it; the only thing the two share is
//! the imbalance board. Each message is handled in isolation: whatever goes
//! wrong with one is logged, counted and left behind.

use log::{debug, info, warn};
use sparx_core::{Signal, Trade};
use sparx_gateway::{DepthMessage, Subscriber, TradeMessage};
use sparx_ledger::{PositionError, PositionLedger};
use sparx_ports::{Clock, Notifier};
use sparx_strategy::{
    BookImbalanceTracker, Decision, ImbalanceBoard, MarketInputs, PositionState,
    RollingAggregator, StrategyEngine,
};
use std::sync::Arc;

use crate::stats::PipelineStats;

/// Drains the trade queue: aggregates, scores and records signals
pub struct TradeConsumer {
    aggregator: RollingAggregator,
    engine: StrategyEngine,
    board: ImbalanceBoard,
    positions: PositionLedger,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    stats: Arc<PipelineStats>,
}

impl TradeConsumer {
    pub fn new(
        aggregator: RollingAggregator,
        engine: StrategyEngine,
        board: ImbalanceBoard,
        positions: PositionLedger,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        stats: Arc<PipelineStats>,
    ) -> Self {
        Self {
            aggregator,
            engine,
            board,
            positions,
            notifier,
            clock,
            stats,
        }
    }

    /// Run until every producer is gone and the queue is drained
    pub async fn run<S>(mut self, mut queue: S)
    where
        S: Subscriber<TradeMessage>,
    {
        info!("[TradeConsumer] Started");
        while let Some(msg) = queue.next().await {
            self.handle(msg).await;
        }
        info!("[TradeConsumer] Trade queue closed, stopping");
    }

    /// Handle one raw trade message
    pub async fn handle(&mut self, msg: TradeMessage) -> Option<Signal> {
        match msg.to_trade() {
            Ok(trade) => self.on_trade(trade).await,
            Err(e) => {
                self.stats.record_malformed();
                warn!("[TradeConsumer] Discarding malformed trade: {}", e);
                None
            }
        }
    }

    /// Process one normalized trade; returns the signal recorded, if any
    pub async fn on_trade(&mut self, trade: Trade) -> Option<Signal> {
        self.stats.record_trade();
        let symbol = trade.symbol().clone();

        // Aggregator state is updated whatever happens next
        let window = self.aggregator.on_trade(trade);

        let Some(imbalance) = self.board.latest(&symbol) else {
            debug!("[TradeConsumer] {} has no book yet, skipping decision", symbol);
            return None;
        };

        let metrics = self.engine.assess(&MarketInputs {
            imbalance,
            volume_ratio: window.volume_ratio,
            slope: window.slope,
            divergence: window.divergence,
        });

        if self.engine.is_fully_vetoed(&metrics) {
            self.stats.record_veto();
            debug!(
                "[TradeConsumer] {} vetoed (fear={})",
                symbol, metrics.fear_index
            );
            return None;
        }

        // Neither entry nor exit conditions hold; no need to touch the ledger
        let (imb, ratio, slope) = (metrics.imbalance, metrics.volume_ratio, metrics.slope);
        if !self.engine.should_buy(imb, ratio, slope) && !self.engine.should_sell(imb, ratio, slope) {
            return None;
        }

        let open = match self.positions.get_open_position(&symbol).await {
            Ok(open) => open,
            Err(e) => {
                self.ledger_fault("position lookup", &e).await;
                return None;
            }
        };

        let decision = self
            .engine
            .decide(&metrics, PositionState::from_open(open.is_some()));

        let recorded = match decision {
            Decision::Buy => {
                self.positions
                    .record_buy(&symbol, window.price, metrics, self.clock.now())
                    .await
            }
            Decision::Sell => {
                self.positions
                    .record_sell(&symbol, window.price, metrics, self.clock.now())
                    .await
            }
            Decision::Vetoed { fear_index } => {
                self.stats.record_veto();
                debug!("[TradeConsumer] {} vetoed (fear={})", symbol, fear_index);
                return None;
            }
            Decision::Hold => return None,
        };

        match recorded {
            Ok(signal) => {
                self.stats.record_signal();
                if let Err(e) = self.notifier.notify_signal(&signal).await {
                    warn!("[TradeConsumer] Alert delivery failed: {}", e);
                }
                Some(signal)
            }
            Err(e) if e.is_ledger_fault() => {
                self.ledger_fault("signal append", &e).await;
                None
            }
            Err(e) => {
                // Position changed between read and write
                warn!("[TradeConsumer] {} {} not recorded: {}", symbol, decision, e);
                None
            }
        }
    }

    async fn ledger_fault(&self, context: &str, error: &PositionError) {
        self.stats.record_ledger_fault();
        warn!(
            "[TradeConsumer] Ledger {} failed, decision skipped: {}",
            context, error
        );
        if let Err(e) = self
            .notifier
            .notify_fault(self.positions.ledger().name(), &error.to_string())
            .await
        {
            warn!("[TradeConsumer] Fault alert delivery failed: {}", e);
        }
    }
}

/// Drains the depth queue into the imbalance board
pub struct BookConsumer {
    tracker: BookImbalanceTracker,
    stats: Arc<PipelineStats>,
}

impl BookConsumer {
    pub fn new(tracker: BookImbalanceTracker, stats: Arc<PipelineStats>) -> Self {
        Self { tracker, stats }
    }

    pub async fn run<S>(mut self, mut queue: S)
    where
        S: Subscriber<DepthMessage>,
    {
        info!("[BookConsumer] Started");
        while let Some(msg) = queue.next().await {
            self.handle(msg);
        }
        info!("[BookConsumer] Depth queue closed, stopping");
    }

    /// Handle one depth snapshot; returns the new imbalance
    pub fn handle(&mut self, msg: DepthMessage) -> Option<f64> {
        match msg.to_snapshot() {
            Ok(snapshot) => {
                self.stats.record_book();
                Some(self.tracker.on_snapshot(&snapshot))
            }
            Err(e) => {
                self.stats.record_malformed();
                warn!("[BookConsumer] Discarding malformed depth snapshot: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use sparx_clock::ManualClock;
    use sparx_core::{Symbol, TradeId};
    use sparx_ledger::InMemoryLedger;
    use sparx_ports::{LedgerError, LedgerResult, NotifyError, SignalLedger};
    use sparx_strategy::AggregatorConfig;
    use std::sync::Mutex;

    /// Ledger whose every call fails
    struct BrokenLedger;

    #[async_trait]
    impl SignalLedger for BrokenLedger {
        async fn find_latest_buy(&self, _symbol: &Symbol) -> LedgerResult<Option<Signal>> {
            Err(LedgerError::Unavailable("connection refused".into()))
        }

        async fn find_paired_sell(&self, _trade_id: &TradeId) -> LedgerResult<Option<Signal>> {
            Err(LedgerError::Unavailable("connection refused".into()))
        }

        async fn append(&self, _signal: Signal) -> LedgerResult<()> {
            Err(LedgerError::Unavailable("connection refused".into()))
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        faults: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn notify_signal(&self, _signal: &Signal) -> Result<(), NotifyError> {
            Err(NotifyError::Delivery("webhook down".into()))
        }

        async fn notify_fault(&self, context: &str, _detail: &str) -> Result<(), NotifyError> {
            self.faults.lock().unwrap().push(context.to_string());
            Ok(())
        }
    }

    fn consumer(
        ledger: Arc<dyn SignalLedger>,
        notifier: Arc<dyn Notifier>,
        board: ImbalanceBoard,
        stats: Arc<PipelineStats>,
    ) -> TradeConsumer {
        TradeConsumer::new(
            RollingAggregator::new(AggregatorConfig::default()),
            StrategyEngine::default(),
            board,
            PositionLedger::new(ledger),
            notifier,
            Arc::new(ManualClock::frozen_now()),
            stats,
        )
    }

    fn rising_trade(i: i64) -> TradeMessage {
        let ts = Utc::now().timestamp_millis() + i * 100;
        TradeMessage::new("BTCUSDC", ts, format!("{}", 100 + i), "1", false)
    }

    #[tokio::test]
    async fn test_malformed_trade_is_counted_and_skipped() {
        let stats = Arc::new(PipelineStats::new());
        let mut trades = consumer(
            Arc::new(InMemoryLedger::new()),
            Arc::new(RecordingNotifier::default()),
            ImbalanceBoard::new(),
            stats.clone(),
        );

        let bad = TradeMessage::new("BTCUSDC", 1_700_000_000_000, "-1", "1", false);
        assert!(trades.handle(bad).await.is_none());
        assert_eq!(stats.snapshot().malformed, 1);
        assert_eq!(stats.snapshot().trades, 0);
    }

    #[tokio::test]
    async fn test_no_decision_without_book() {
        let stats = Arc::new(PipelineStats::new());
        let ledger = Arc::new(InMemoryLedger::new());
        let mut trades = consumer(
            ledger.clone(),
            Arc::new(RecordingNotifier::default()),
            ImbalanceBoard::new(),
            stats.clone(),
        );

        for i in 0..15 {
            assert!(trades.handle(rising_trade(i)).await.is_none());
        }
        assert_eq!(stats.snapshot().trades, 15);
        assert!(ledger.is_empty().await);
    }

    #[tokio::test]
    async fn test_ledger_failure_fails_closed() {
        let stats = Arc::new(PipelineStats::new());
        let notifier = Arc::new(RecordingNotifier::default());
        let board = ImbalanceBoard::new();
        board.publish(Symbol::new("BTCUSDC"), 0.6);
        let mut trades = consumer(Arc::new(BrokenLedger), notifier.clone(), board, stats.clone());

        for i in 0..12 {
            assert!(trades.handle(rising_trade(i)).await.is_none());
        }

        let snap = stats.snapshot();
        assert_eq!(snap.trades, 12);
        assert_eq!(snap.signals, 0);
        // The ledger is consulted once the entry conditions hold (slope from trade 10)
        assert_eq!(snap.ledger_faults, 3);
        assert_eq!(notifier.faults.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_failed_alert_does_not_lose_signal() {
        let stats = Arc::new(PipelineStats::new());
        let ledger = Arc::new(InMemoryLedger::new());
        let board = ImbalanceBoard::new();
        board.publish(Symbol::new("BTCUSDC"), 0.6);
        let mut trades = consumer(
            ledger.clone(),
            Arc::new(RecordingNotifier::default()),
            board,
            stats.clone(),
        );

        let mut signals = Vec::new();
        for i in 0..12 {
            if let Some(signal) = trades.handle(rising_trade(i)).await {
                signals.push(signal);
            }
        }

        assert_eq!(signals.len(), 1);
        assert!(signals[0].is_buy());
        assert_eq!(ledger.len().await, 1);
        assert_eq!(stats.snapshot().signals, 1);
    }

    #[test]
    fn test_book_consumer_updates_board() {
        let stats = Arc::new(PipelineStats::new());
        let board = ImbalanceBoard::new();
        let mut books = BookConsumer::new(BookImbalanceTracker::new(board.clone()), stats.clone());

        let msg = DepthMessage::new(
            "btcusdc",
            vec![["100.0".into(), "8".into()]],
            vec![["100.1".into(), "2".into()]],
            Utc::now(),
        );
        let imbalance = books.handle(msg).unwrap();

        assert!((imbalance - 0.6).abs() < 1e-6);
        assert_eq!(board.latest(&Symbol::new("BTCUSDC")), Some(imbalance));

        let bad = DepthMessage::new("btcusdc", vec![["x".into(), "1".into()]], vec![], Utc::now());
        assert!(books.handle(bad).is_none());

        // A negative level is discarded and the board keeps the last good value
        let negative = DepthMessage::new(
            "btcusdc",
            vec![["100.0".into(), "-1".into()]],
            vec![],
            Utc::now(),
        );
        assert!(books.handle(negative).is_none());
        assert_eq!(board.latest(&Symbol::new("BTCUSDC")), Some(imbalance));
        assert_eq!(stats.snapshot().books, 1);
        assert_eq!(stats.snapshot().malformed, 2);
    }
}
