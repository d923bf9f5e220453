//! Candle writer: one history row per candle.

use shared::{CandleRecord, CollectorError, HistoryRow, QuotePolicy, TradingPair};
use tracing::warn;

use crate::store::CandleStore;

/// Counts from writing one batch of candles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteReport {
    pub inserted: usize,
    /// Zero-date buckets that carried no data.
    pub empty_buckets: usize,
    /// Rows whose insert failed.
    pub failed: usize,
}

impl WriteReport {
    pub fn skipped(&self) -> usize {
        self.empty_buckets + self.failed
    }
}

/// Write every non-empty candle for `pair`.
///
/// Inserts are independent: a failed insert is logged and counted, and the
/// remaining candles are still written.
pub async fn write_candles(
    store: &dyn CandleStore,
    pair: &TradingPair,
    candles: &[CandleRecord],
    quotes: QuotePolicy,
) -> WriteReport {
    let mut report = WriteReport::default();

    for candle in candles {
        if candle.is_empty_bucket() {
            report.empty_buckets += 1;
            continue;
        }

        let row = HistoryRow::from_candle(pair.id, candle, quotes);
        match store.insert_history_row(&row).await {
            Ok(()) => report.inserted += 1,
            Err(e) => {
                let err = CollectorError::Insert(e);
                warn!(
                    pair_id = pair.id,
                    symbol = %pair.symbol,
                    created_at = %row.created_at,
                    error = %err,
                    "skipping candle"
                );
                report.failed += 1;
            }
        }
    }

    report
}
