//! In-memory signal index shared by the ledger backends

use sparx_core::{Signal, SignalKind, Symbol, TradeId};
use sparx_ports::{LedgerError, LedgerResult};
use std::collections::{HashMap, HashSet};

/// All recorded signals plus lookups for the two ledger queries
#[derive(Debug, Default)]
pub(crate) struct SignalIndex {
    signals: Vec<Signal>,
    keys: HashSet<(TradeId, SignalKind)>,
    /// Position in `signals` of the most recently appended BUY per symbol
    latest_buy: HashMap<Symbol, usize>,
    /// Position in `signals` of the SELL per trade id
    sells: HashMap<TradeId, usize>,
}

impl SignalIndex {
    /// Reject a signal whose `(trade_id, kind)` is already recorded
    pub(crate) fn check_unique(&self, signal: &Signal) -> LedgerResult<()> {
        if self.keys.contains(&(signal.trade_id(), signal.kind())) {
            return Err(LedgerError::Duplicate {
                trade_id: signal.trade_id(),
                kind: signal.kind(),
            });
        }
        Ok(())
    }

    pub(crate) fn insert(&mut self, signal: Signal) -> LedgerResult<()> {
        self.check_unique(&signal)?;

        let position = self.signals.len();
        self.keys.insert((signal.trade_id(), signal.kind()));
        match signal.kind() {
            SignalKind::Buy => {
                // Recency is append order; signal timestamps may go backwards
                self.latest_buy.insert(signal.symbol().clone(), position);
            }
            SignalKind::Sell => {
                self.sells.insert(signal.trade_id(), position);
            }
        }
        self.signals.push(signal);
        Ok(())
    }

    /// Reject a signal that would break BUY/SELL alternation for its symbol
    pub(crate) fn check_alternation(&self, signal: &Signal) -> LedgerResult<()> {
        let open = self
            .latest_buy
            .get(signal.symbol())
            .map(|&i| &self.signals[i])
            .filter(|buy| !self.sells.contains_key(&buy.trade_id()));

        let consistent = match (signal.kind(), open) {
            (SignalKind::Buy, None) => true,
            (SignalKind::Sell, Some(buy)) => buy.trade_id() == signal.trade_id(),
            _ => false,
        };
        if consistent {
            Ok(())
        } else {
            Err(LedgerError::Codec(format!(
                "{} {} for {} breaks alternation",
                signal.kind(),
                signal.trade_id(),
                signal.symbol()
            )))
        }
    }

    pub(crate) fn latest_buy(&self, symbol: &Symbol) -> Option<Signal> {
        self.latest_buy
            .get(symbol)
            .map(|&i| self.signals[i].clone())
    }

    pub(crate) fn paired_sell(&self, trade_id: &TradeId) -> Option<Signal> {
        self.sells.get(trade_id).map(|&i| self.signals[i].clone())
    }

    pub(crate) fn len(&self) -> usize {
        self.signals.len()
    }

    pub(crate) fn signals(&self) -> &[Signal] {
        &self.signals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use rust_decimal_macros::dec;
    use sparx_core::SignalMetrics;

    fn metrics() -> SignalMetrics {
        SignalMetrics {
            imbalance: 0.5,
            volume_ratio: 2.0,
            slope: Some(0.002),
            divergence: None,
            fear_index: 0,
        }
    }

    #[test]
    fn test_latest_buy_follows_append_order_when_clock_steps_back() {
        let mut index = SignalIndex::default();
        let now = Utc::now();
        let first = Signal::buy("BTCUSDC", dec!(100), metrics(), now);
        let sell = Signal::sell(&first, dec!(101), metrics(), now + Duration::seconds(1)).unwrap();
        let reentry = Signal::buy("BTCUSDC", dec!(99), metrics(), now - Duration::seconds(30));

        index.insert(first).unwrap();
        index.insert(sell).unwrap();
        index.insert(reentry.clone()).unwrap();

        assert_eq!(index.latest_buy(&Symbol::new("BTCUSDC")), Some(reentry.clone()));
        assert_eq!(index.paired_sell(&reentry.trade_id()), None);
    }

    #[test]
    fn test_alternation_check() {
        let mut index = SignalIndex::default();
        let now = Utc::now();
        let buy = Signal::buy("BTCUSDC", dec!(100), metrics(), now);
        let second_buy = Signal::buy("BTCUSDC", dec!(100), metrics(), now);
        let stray = Signal::buy("ETHUSDC", dec!(10), metrics(), now);
        let stray_sell = Signal::sell(&stray, dec!(11), metrics(), now).unwrap();

        assert!(index.check_alternation(&buy).is_ok());
        index.insert(buy.clone()).unwrap();

        assert!(matches!(
            index.check_alternation(&second_buy),
            Err(LedgerError::Codec(_))
        ));
        assert!(index.check_alternation(&stray_sell).is_err());

        let sell = Signal::sell(&buy, dec!(110), metrics(), now).unwrap();
        assert!(index.check_alternation(&sell).is_ok());
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let mut index = SignalIndex::default();
        let buy = Signal::buy("BTCUSDC", dec!(100), metrics(), Utc::now());
        index.insert(buy.clone()).unwrap();

        assert!(matches!(
            index.insert(buy),
            Err(LedgerError::Duplicate { kind: SignalKind::Buy, .. })
        ));
        assert_eq!(index.len(), 1);
    }
}
