use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Legacy value written to `ask`, which the chart endpoint does not report.
pub const PLACEHOLDER_ASK: f64 = 9999.0;
/// Legacy value written to `bid`, which the chart endpoint does not report.
pub const PLACEHOLDER_BID: f64 = 0.0;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TradingPair {
    pub id: i64,
    /// Exchange symbol, e.g. "BTC_ETH"
    pub symbol: String,
}

impl TradingPair {
    pub fn new(id: i64, symbol: impl Into<String>) -> Self {
        Self {
            id,
            symbol: symbol.into(),
        }
    }
}

/// One decoded element of a chart data response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandleRecord {
    pub timestamp: DateTime<Utc>,
    pub low: f64,
    pub high: f64,
    pub weighted_average: f64,
    pub open: f64,
    pub close: f64,
    pub volume: f64,
    pub quote_volume: f64,
}

impl CandleRecord {
    /// The exchange marks a bucket without trades with a zero date.
    pub fn is_empty_bucket(&self) -> bool {
        self.timestamp.timestamp() == 0
    }
}

/// What to write into the `ask`/`bid` columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuotePolicy {
    /// 9999 / 0, as existing readers of the table expect.
    #[default]
    Placeholder,
    /// SQL NULL for both columns.
    Null,
}

impl QuotePolicy {
    pub fn ask(self) -> Option<f64> {
        match self {
            QuotePolicy::Placeholder => Some(PLACEHOLDER_ASK),
            QuotePolicy::Null => None,
        }
    }

    pub fn bid(self) -> Option<f64> {
        match self {
            QuotePolicy::Placeholder => Some(PLACEHOLDER_BID),
            QuotePolicy::Null => None,
        }
    }
}

/// A row of the per-exchange history table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRow {
    pub pair_id: i64,
    pub low: f64,
    pub high: f64,
    pub avg: f64,
    pub open: f64,
    pub close: f64,
    pub ask: Option<f64>,
    pub bid: Option<f64>,
    pub volume: f64,
    pub quote_volume: f64,
    pub created_at: DateTime<Utc>,
}

impl HistoryRow {
    /// Map a candle onto the table layout.
    ///
    /// The table has always stored the exchange's `quoteVolume` under
    /// `volume` and `volume` under `quote_volume`; readers depend on it.
    pub fn from_candle(pair_id: i64, candle: &CandleRecord, quotes: QuotePolicy) -> Self {
        Self {
            pair_id,
            low: candle.low,
            high: candle.high,
            avg: candle.weighted_average,
            open: candle.open,
            close: candle.close,
            ask: quotes.ask(),
            bid: quotes.bid(),
            volume: candle.quote_volume,
            quote_volume: candle.volume,
            created_at: candle.timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_candle() -> CandleRecord {
        CandleRecord {
            timestamp: Utc.timestamp_opt(1483228800, 0).unwrap(),
            low: 900.0,
            high: 1000.0,
            weighted_average: 950.0,
            open: 950.0,
            close: 980.0,
            volume: 10.0,
            quote_volume: 9500.0,
        }
    }

    #[test]
    fn test_history_row_from_candle() {
        let row = HistoryRow::from_candle(1, &sample_candle(), QuotePolicy::Placeholder);

        assert_eq!(row.pair_id, 1);
        assert_eq!(row.low, 900.0);
        assert_eq!(row.high, 1000.0);
        assert_eq!(row.avg, 950.0);
        assert_eq!(row.open, 950.0);
        assert_eq!(row.close, 980.0);
        assert_eq!(row.ask, Some(9999.0));
        assert_eq!(row.bid, Some(0.0));
        assert_eq!(row.volume, 9500.0);
        assert_eq!(row.quote_volume, 10.0);
        assert_eq!(row.created_at.timestamp(), 1483228800);
    }

    #[test]
    fn test_null_quote_policy() {
        let row = HistoryRow::from_candle(2, &sample_candle(), QuotePolicy::Null);
        assert_eq!(row.ask, None);
        assert_eq!(row.bid, None);
    }

    #[test]
    fn test_empty_bucket() {
        let mut candle = sample_candle();
        assert!(!candle.is_empty_bucket());

        candle.timestamp = Utc.timestamp_opt(0, 0).unwrap();
        assert!(candle.is_empty_bucket());
    }
}
