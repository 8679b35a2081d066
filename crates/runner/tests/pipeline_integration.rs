//! Pipeline Integration Test
//!
//! Runs the full trade/book scenario:
//! 1. A bid-heavy book and ten rising, buyer-initiated trades open a position
//! 2. The book flips ask-heavy and seller-initiated trades drive the price down
//! 3. The position is closed by a SELL sharing the BUY's trade id

use async_trait::async_trait;
use rust_decimal_macros::dec;
use sparx_clock::ManualClock;
use sparx_core::{Signal, SignalKind, Symbol, profit_pct};
use sparx_gateway::{DepthMessage, TradeMessage};
use sparx_ledger::{InMemoryLedger, PositionLedger};
use sparx_ports::{Notifier, NotifyError};
use sparx_runner::{BookConsumer, Pipeline, PipelineStats, SparxConfig, TradeConsumer};
use sparx_strategy::{
    BookImbalanceTracker, FearConfig, ImbalanceBoard, RollingAggregator, StrategyEngine,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const START_MS: i64 = 1_700_000_000_000;

#[derive(Default)]
struct CollectingNotifier {
    signals: Mutex<Vec<Signal>>,
}

#[async_trait]
impl Notifier for CollectingNotifier {
    async fn notify_signal(&self, signal: &Signal) -> Result<(), NotifyError> {
        self.signals.lock().unwrap().push(signal.clone());
        Ok(())
    }

    async fn notify_fault(&self, _context: &str, _detail: &str) -> Result<(), NotifyError> {
        Ok(())
    }
}

fn depth(bid_qty: &str, ask_qty: &str) -> DepthMessage {
    DepthMessage::new(
        "BTCUSDC",
        vec![["99.9".into(), bid_qty.into()]],
        vec![["100.1".into(), ask_qty.into()]],
        chrono::Utc::now(),
    )
}

/// Ten buyer-initiated trades at 100..=109, 100ms apart
fn rising_buys() -> Vec<TradeMessage> {
    (0..10)
        .map(|i| TradeMessage::new("BTCUSDC", START_MS + i * 100, format!("{}", 100 + i), "1", false))
        .collect()
}

/// Seller-initiated trades from 108 down in steps of 2, starting once the
/// buys have left the window
fn falling_sells(count: i64) -> Vec<TradeMessage> {
    (0..count)
        .map(|i| {
            TradeMessage::new(
                "BTCUSDC",
                START_MS + 10_000 + i * 100,
                format!("{}", 108 - 2 * i),
                "1",
                true,
            )
        })
        .collect()
}

fn exits_ungated() -> SparxConfig {
    SparxConfig {
        fear: FearConfig {
            veto_exits: false,
            ..FearConfig::default()
        },
        ..SparxConfig::default()
    }
}

struct Harness {
    trades: TradeConsumer,
    books: BookConsumer,
    ledger: Arc<InMemoryLedger>,
    stats: Arc<PipelineStats>,
}

fn harness(config: &SparxConfig) -> Harness {
    let ledger = Arc::new(InMemoryLedger::new());
    let stats = Arc::new(PipelineStats::new());
    let board = ImbalanceBoard::new();

    let trades = TradeConsumer::new(
        RollingAggregator::new(config.aggregator.clone()),
        StrategyEngine::new(config.strategy.clone(), config.fear.clone()),
        board.clone(),
        PositionLedger::new(ledger.clone()),
        Arc::new(CollectingNotifier::default()),
        Arc::new(ManualClock::frozen_now()),
        stats.clone(),
    );
    let books = BookConsumer::new(BookImbalanceTracker::new(board), stats.clone());

    Harness {
        trades,
        books,
        ledger,
        stats,
    }
}

#[tokio::test]
async fn test_buy_then_sell_round_trip() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut h = harness(&exits_ungated());

    // Phase 1: bid-heavy book, rising buy flow
    h.books.handle(depth("8", "2"));
    let mut signals = Vec::new();
    for msg in rising_buys() {
        signals.extend(h.trades.handle(msg).await);
    }
    assert_eq!(signals.len(), 1, "exactly one BUY once the slope is known");
    let buy = signals[0].clone();
    assert_eq!(buy.kind(), SignalKind::Buy);
    assert_eq!(buy.price(), dec!(109));
    assert_eq!(buy.metrics().fear_index, 0);

    // Phase 2: ask-heavy book, falling sell flow
    h.books.handle(depth("3", "7"));
    let mut exits = Vec::new();
    for msg in falling_sells(12) {
        exits.extend(h.trades.handle(msg).await);
    }

    assert_eq!(exits.len(), 1, "one SELL closes the position");
    let sell = &exits[0];
    assert_eq!(sell.kind(), SignalKind::Sell);
    assert_eq!(sell.trade_id(), buy.trade_id());
    assert_eq!(sell.price(), dec!(96));
    assert_eq!(sell.profit_pct(), profit_pct(dec!(109), dec!(96)));
    assert!(sell.profit_pct().unwrap() < dec!(0));
    assert!(sell.metrics().slope.unwrap() < -0.001);
    assert!(sell.metrics().volume_ratio < 0.65);
    assert!(sell.metrics().fear_index >= 2);

    let recorded = h.ledger.signals().await;
    assert_eq!(recorded.len(), 2);
    assert_eq!(h.stats.snapshot().signals, 2);
    assert_eq!(h.stats.snapshot().trades, 22);
    assert_eq!(h.stats.snapshot().books, 2);
}

#[tokio::test]
async fn test_gated_exits_hold_position_under_fear() {
    let mut h = harness(&SparxConfig::default());

    h.books.handle(depth("8", "2"));
    for msg in rising_buys() {
        h.trades.handle(msg).await;
    }
    h.books.handle(depth("3", "7"));
    for msg in falling_sells(12) {
        assert!(h.trades.handle(msg).await.is_none());
    }

    let recorded = h.ledger.signals().await;
    assert_eq!(recorded.len(), 1);
    assert!(recorded[0].is_buy());
    assert!(h.stats.snapshot().vetoes > 0);

    let positions = PositionLedger::new(h.ledger.clone());
    assert!(positions.is_open(&Symbol::new("BTCUSDC")).await.unwrap());
}

#[tokio::test]
async fn test_selling_pressure_vetoes_entry() {
    let mut h = harness(&SparxConfig::default());

    // Ask-heavy book and sell-only flow: fear 2, then 3 once the slope is known
    h.books.handle(depth("3", "7"));
    for i in 0..15 {
        let msg = TradeMessage::new("BTCUSDC", START_MS + i * 100, format!("{}", 200 - i), "1", true);
        assert!(h.trades.handle(msg).await.is_none());
    }

    assert!(h.ledger.is_empty().await);
    assert_eq!(h.stats.snapshot().vetoes, 15);
}

async fn wait_for_imbalance(pipeline: &Pipeline, symbol: &Symbol, pred: impl Fn(f64) -> bool) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !pipeline.board().latest(symbol).is_some_and(&pred) {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("book consumer did not publish imbalance");
}

#[tokio::test]
async fn test_spawned_pipeline_round_trip() {
    let _ = env_logger::builder().is_test(true).try_init();

    let ledger = Arc::new(InMemoryLedger::new());
    let notifier = Arc::new(CollectingNotifier::default());
    let pipeline = Pipeline::spawn(
        &exits_ungated(),
        PositionLedger::new(ledger.clone()),
        notifier.clone(),
        Arc::new(ManualClock::frozen_now()),
    );
    let symbol = Symbol::new("BTCUSDC");
    let stats = pipeline.stats();

    {
        let trade_tx = pipeline.trade_sender();
        let depth_tx = pipeline.depth_sender();

        // Queues are independent; wait for each book before trading on it
        depth_tx.enqueue(depth("8", "2")).unwrap();
        wait_for_imbalance(&pipeline, &symbol, |v| v > 0.5).await;
        for msg in rising_buys() {
            trade_tx.enqueue(msg).unwrap();
        }

        tokio::time::timeout(Duration::from_secs(5), async {
            while stats.snapshot().signals < 1 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("BUY was not recorded");

        depth_tx.enqueue(depth("3", "7")).unwrap();
        wait_for_imbalance(&pipeline, &symbol, |v| v < -0.3).await;
        for msg in falling_sells(12) {
            trade_tx.enqueue(msg).unwrap();
        }
    }

    // Drains both queues before returning
    tokio::time::timeout(Duration::from_secs(5), pipeline.shutdown())
        .await
        .expect("pipeline did not shut down");

    let recorded = ledger.signals().await;
    let kinds: Vec<SignalKind> = recorded.iter().map(|s| s.kind()).collect();
    assert_eq!(kinds, vec![SignalKind::Buy, SignalKind::Sell]);
    assert_eq!(recorded[0].trade_id(), recorded[1].trade_id());

    let alerted = notifier.signals.lock().unwrap().len();
    assert_eq!(alerted, 2);
    assert_eq!(stats.snapshot().trades, 22);
}
