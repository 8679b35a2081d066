//! Integration test: Binance stream -> StreamFeed -> ingress queues
//!
//! The feed runs in its own task while the consumer side drains the queues
//! and normalizes each message into domain types.

use rust_decimal_macros::dec;
use sparx_core::{Side, Symbol};
use sparx_gateway::{StreamFeed, ingress_queue};
use std::time::Duration;

fn trade_line(symbol: &str, ts: i64, price: &str, qty: &str, buyer_maker: bool) -> String {
    format!(
        r#"{{"stream":"{}@trade","data":{{"e":"trade","E":{},"s":"{}","t":1,"p":"{}","q":"{}","T":{},"m":{},"M":true}}}}"#,
        symbol.to_lowercase(),
        ts,
        symbol,
        price,
        qty,
        ts,
        buyer_maker
    )
}

#[tokio::test]
async fn test_stream_to_domain_round_trip() {
    let _ = env_logger::try_init();

    let (trade_tx, mut trade_rx) = ingress_queue();
    let (depth_tx, mut depth_rx) = ingress_queue();

    let mut input = String::new();
    input.push_str(r#"{"result":null,"id":1}"#);
    input.push('\n');
    for i in 0..5 {
        let price = format!("{}.0", 100 + i);
        input.push_str(&trade_line("BTCUSDC", 1_700_000_000_000 + i, &price, "0.5", i % 2 == 1));
        input.push('\n');
    }
    input.push_str(&trade_line("XRPUSDC", 1_700_000_000_010, "0.5", "10", false));
    input.push('\n');
    input.push_str(
        r#"{"stream":"btcusdc@depth5@100ms","data":{"lastUpdateId":7,"bids":[["99.9","5"],["99.8","3"]],"asks":[["100.1","2"]]}}"#,
    );
    input.push('\n');
    input.push_str("{truncated\n");

    let feed = StreamFeed::new(Box::new(trade_tx), Box::new(depth_tx))
        .with_symbols([Symbol::new("BTCUSDC")]);
    let handle = tokio::spawn(async move { feed.run(std::io::Cursor::new(input)).await });

    let stats = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("feed did not finish")
        .expect("feed task panicked")
        .expect("feed failed");

    assert_eq!(stats.trades, 5);
    assert_eq!(stats.depths, 1);
    assert_eq!(stats.filtered, 1);
    assert_eq!(stats.malformed, 1);

    // Arrival order is preserved and every message normalizes
    let mut prices = Vec::new();
    while let Some(msg) = trade_rx.dequeue().await {
        let trade = msg.to_trade().unwrap();
        assert_eq!(trade.symbol().as_str(), "BTCUSDC");
        prices.push(trade.price());
        if prices.len() == 2 {
            assert_eq!(trade.side(), Side::Sell);
        }
    }
    assert_eq!(prices, vec![dec!(100), dec!(101), dec!(102), dec!(103), dec!(104)]);

    let snapshot = depth_rx.dequeue().await.unwrap().to_snapshot().unwrap();
    assert_eq!(snapshot.symbol.as_str(), "BTCUSDC");
    assert_eq!(snapshot.bid_volume(5), dec!(8));
    assert_eq!(snapshot.ask_volume(5), dec!(2));
    assert!(depth_rx.dequeue().await.is_none());
}
