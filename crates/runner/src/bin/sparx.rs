use log::{error, info};
use sparx_clock::SystemClock;
use sparx_gateway::StreamFeed;
use sparx_ledger::{JsonlLedger, PositionLedger};
use sparx_runner::{LogNotifier, Pipeline, SparxConfig, spawn_heartbeat};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::BufReader;

fn print_help() {
    eprintln!(
        r#"Sparx - microstructure signal pipeline

Reads a Binance combined stream (one JSON message per line) from stdin and
records gated BUY/SELL signals to a JSON-lines ledger.

USAGE:
    sparx [OPTIONS]

OPTIONS:
    --config <PATH>     Load configuration from JSON file
    --help              Print this help message

ENVIRONMENT VARIABLES:
    SPARX_SYMBOLS           Comma-separated symbols to monitor
    SPARX_LEDGER_PATH       Signal ledger file
    SPARX_INSTRUMENT_COUNT  Maximum number of instruments
    RUST_LOG                Log level filter (default: info)

EXAMPLES:
    # Pipe a recorded stream through the pipeline
    sparx --config sparx.json < btcusdc.ndjson
"#
    );
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Parse command line arguments
    let args: Vec<String> = std::env::args().collect();
    let mut config_path: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                return Ok(());
            }
            "--config" | "-c" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: --config requires a path argument");
                    std::process::exit(1);
                }
                config_path = Some(args[i].clone());
            }
            arg => {
                eprintln!("Unknown argument: {}", arg);
                print_help();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let mut config = match config_path {
        Some(path) => {
            info!("Loading configuration from: {}", path);
            SparxConfig::from_file(&path)?
        }
        None => {
            info!("Using default configuration");
            SparxConfig::default()
        }
    };
    config.apply_env()?;
    config.validate()?;

    let symbols = config.resolve_symbols()?;
    info!(
        "Monitoring {} instruments: {}",
        symbols.len(),
        symbols
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );

    let store = Arc::new(JsonlLedger::open(&config.ledger_path).await?);
    let pipeline = Pipeline::spawn(
        &config,
        PositionLedger::new(store),
        Arc::new(LogNotifier::new()),
        Arc::new(SystemClock::new()),
    );
    let heartbeat = spawn_heartbeat(
        pipeline.stats(),
        Duration::from_secs(config.heartbeat_interval_secs),
    );

    let feed = StreamFeed::new(
        Box::new(pipeline.trade_sender()),
        Box::new(pipeline.depth_sender()),
    )
    .with_symbols(symbols);
    let stdin = BufReader::new(tokio::io::stdin());

    tokio::select! {
        result = feed.run(stdin) => match result {
            Ok(stats) => info!("Stream ended after {} trades and {} depth snapshots", stats.trades, stats.depths),
            Err(e) => error!("Stream feed failed: {}", e),
        },
        _ = tokio::signal::ctrl_c() => info!("Interrupted, shutting down"),
    }

    heartbeat.abort();
    pipeline.shutdown().await;

    Ok(())
}
