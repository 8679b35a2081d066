//! JSON-lines file ledger
//!
//! One signal per line, append-only. On open the whole file is replayed into
//! an in-memory index so queries never touch the disk and open positions
//! survive restarts. A torn final line left by a crash mid-write is dropped
//! on open; any other bad record refuses to open.

use async_trait::async_trait;
use log::{error, info, warn};
use sparx_core::{Signal, Symbol, TradeId};
use sparx_ports::{LedgerError, LedgerResult, SignalLedger};
use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::index::SignalIndex;

struct LedgerFile {
    file: File,
    index: SignalIndex,
}

/// Durable signal ledger backed by a `.jsonl` file
pub struct JsonlLedger {
    path: PathBuf,
    state: Mutex<LedgerFile>,
}

impl JsonlLedger {
    /// Open (or create) the ledger file and replay its records
    pub async fn open(path: impl AsRef<Path>) -> LedgerResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut index = SignalIndex::default();
        let mut torn_at = None;
        match tokio::fs::read_to_string(&path).await {
            Ok(contents) => {
                let valid = replay(&contents, &mut index)?;
                if valid < contents.len() {
                    torn_at = Some(valid as u64);
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;

        if let Some(len) = torn_at {
            warn!(
                "[JsonlLedger] Dropping incomplete final record in {} at byte {}",
                path.display(),
                len
            );
            file.set_len(len).await?;
        }

        info!(
            "[JsonlLedger] Opened {} with {} records",
            path.display(),
            index.len()
        );

        Ok(Self {
            path,
            state: Mutex::new(LedgerFile { file, index }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.index.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// Load every record into `index`, returning the length of the valid prefix
///
/// Only an unterminated last line may fail to decode; it is excluded from the
/// prefix so the caller can cut it off.
fn replay(contents: &str, index: &mut SignalIndex) -> LedgerResult<usize> {
    let mut offset = 0;
    for (line_no, chunk) in contents.split_inclusive('\n').enumerate() {
        let line = chunk.trim();
        if line.is_empty() {
            offset += chunk.len();
            continue;
        }
        let signal: Signal = match serde_json::from_str(line) {
            Ok(signal) => signal,
            Err(_) if !chunk.ends_with('\n') => return Ok(offset),
            Err(e) => {
                return Err(LedgerError::Codec(format!("line {}: {}", line_no + 1, e)));
            }
        };
        index
            .check_alternation(&signal)
            .map_err(|e| LedgerError::Codec(format!("line {}: {}", line_no + 1, e)))?;
        index.insert(signal)?;
        offset += chunk.len();
    }
    Ok(offset)
}

async fn write_record(file: &mut File, bytes: &[u8]) -> std::io::Result<()> {
    file.write_all(bytes).await?;
    file.flush().await?;
    file.sync_data().await
}

#[async_trait]
impl SignalLedger for JsonlLedger {
    async fn find_latest_buy(&self, symbol: &Symbol) -> LedgerResult<Option<Signal>> {
        Ok(self.state.lock().await.index.latest_buy(symbol))
    }

    async fn find_paired_sell(&self, trade_id: &TradeId) -> LedgerResult<Option<Signal>> {
        Ok(self.state.lock().await.index.paired_sell(trade_id))
    }

    async fn append(&self, signal: Signal) -> LedgerResult<()> {
        let mut state = self.state.lock().await;
        state.index.check_unique(&signal)?;

        let mut line =
            serde_json::to_string(&signal).map_err(|e| LedgerError::Codec(e.to_string()))?;
        line.push('\n');

        let before = state.file.metadata().await?.len();
        if let Err(e) = write_record(&mut state.file, line.as_bytes()).await {
            // The index must mirror the file: cut the partial record off, or
            // index it if it cannot be removed
            match state.file.set_len(before).await {
                Ok(()) => warn!("[JsonlLedger] Append failed, record rolled back: {}", e),
                Err(truncate) => {
                    error!(
                        "[JsonlLedger] Append failed ({}) and rollback failed ({}); keeping record",
                        e, truncate
                    );
                    state.index.insert(signal)?;
                }
            }
            return Err(e.into());
        }
        state.index.insert(signal)
    }

    fn name(&self) -> &str {
        "JsonlLedger"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use sparx_core::SignalMetrics;

    fn temp_path() -> PathBuf {
        std::env::temp_dir().join(format!("sparx-ledger-{}.jsonl", uuid::Uuid::new_v4()))
    }

    fn metrics() -> SignalMetrics {
        SignalMetrics {
            imbalance: 0.4,
            volume_ratio: 2.0,
            slope: Some(0.002),
            divergence: Some(-0.0001),
            fear_index: 0,
        }
    }

    #[tokio::test]
    async fn test_records_survive_reopen() {
        let path = temp_path();
        let buy = Signal::buy("BTCUSDC", dec!(100), metrics(), Utc::now());
        {
            let ledger = JsonlLedger::open(&path).await.unwrap();
            ledger.append(buy.clone()).await.unwrap();
        }

        let reopened = JsonlLedger::open(&path).await.unwrap();
        assert_eq!(reopened.len().await, 1);
        let latest = reopened
            .find_latest_buy(&Symbol::new("BTCUSDC"))
            .await
            .unwrap();
        assert_eq!(latest, Some(buy));

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn test_duplicate_is_not_written() {
        let path = temp_path();
        let ledger = JsonlLedger::open(&path).await.unwrap();
        let buy = Signal::buy("BTCUSDC", dec!(100), metrics(), Utc::now());

        ledger.append(buy.clone()).await.unwrap();
        assert!(matches!(
            ledger.append(buy).await,
            Err(LedgerError::Duplicate { .. })
        ));

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 1);

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn test_corrupt_file_fails_to_open() {
        let path = temp_path();
        std::fs::write(&path, "{\"trade_id\": oops}\n").unwrap();

        assert!(matches!(
            JsonlLedger::open(&path).await,
            Err(LedgerError::Codec(_))
        ));

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn test_torn_final_line_is_dropped_on_open() {
        let path = temp_path();
        let buy = Signal::buy("BTCUSDC", dec!(100), metrics(), Utc::now());
        let sell = Signal::sell(&buy, dec!(110), metrics(), Utc::now()).unwrap();
        let complete = format!("{}\n", serde_json::to_string(&buy).unwrap());
        let torn = serde_json::to_string(&sell).unwrap();
        std::fs::write(&path, format!("{}{}", complete, &torn[..torn.len() / 2])).unwrap();

        let ledger = JsonlLedger::open(&path).await.unwrap();
        assert_eq!(ledger.len().await, 1);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), complete);

        // The position is still open and can be closed normally
        ledger.append(sell).await.unwrap();
        drop(ledger);
        assert_eq!(JsonlLedger::open(&path).await.unwrap().len().await, 2);

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn test_replay_rejects_broken_alternation() {
        let path = temp_path();
        let first = Signal::buy("BTCUSDC", dec!(100), metrics(), Utc::now());
        let second = Signal::buy("BTCUSDC", dec!(101), metrics(), Utc::now());
        let contents = format!(
            "{}\n{}\n",
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
        std::fs::write(&path, contents).unwrap();

        match JsonlLedger::open(&path).await {
            Err(LedgerError::Codec(message)) => assert!(message.starts_with("line 2")),
            Err(e) => panic!("unexpected error: {}", e),
            Ok(_) => panic!("ledger with two open BUYs should not open"),
        }

        let _ = std::fs::remove_file(&path);
    }
}
