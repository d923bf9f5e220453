//! Exchange chart data sources

pub mod poloniex;

pub use poloniex::PoloniexClient;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::{CandleRecord, FetchError};

/// Something that can return the candles for a pair from `start` to now.
#[async_trait]
pub trait ChartDataSource: Send + Sync {
    /// Fetch every candle of width `period` seconds starting at `start`.
    /// Either the whole decoded sequence is returned or an error.
    async fn fetch_chart_data(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        period: u32,
    ) -> Result<Vec<CandleRecord>, FetchError>;
}
