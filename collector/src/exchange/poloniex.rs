//! Poloniex public API client (`returnChartData`)

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, Request};
use serde::Deserialize;
use shared::{CandleRecord, ExchangeConfig, FetchError};
use tracing::{debug, warn};

use super::ChartDataSource;

/// Raw candle as returned by the chart data endpoint
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PoloniexCandle {
    date: i64,
    high: f64,
    low: f64,
    open: f64,
    close: f64,
    volume: f64,
    quote_volume: f64,
    weighted_average: f64,
}

impl PoloniexCandle {
    fn into_record(self) -> Result<CandleRecord, FetchError> {
        let timestamp =
            DateTime::from_timestamp(self.date, 0).ok_or(FetchError::Timestamp(self.date))?;
        Ok(CandleRecord {
            timestamp,
            low: self.low,
            high: self.high,
            weighted_average: self.weighted_average,
            open: self.open,
            close: self.close,
            volume: self.volume,
            quote_volume: self.quote_volume,
        })
    }
}

/// The endpoint answers with either a candle array or `{"error": "..."}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ChartDataResponse {
    Candles(Vec<PoloniexCandle>),
    Error { error: String },
}

/// Decode a chart data body. Nothing is returned unless every element decodes.
pub fn decode_chart_data(body: &[u8]) -> Result<Vec<CandleRecord>, FetchError> {
    let response: ChartDataResponse =
        serde_json::from_slice(body).map_err(|e| FetchError::Decode(e.to_string()))?;

    match response {
        ChartDataResponse::Candles(candles) => candles
            .into_iter()
            .map(PoloniexCandle::into_record)
            .collect(),
        ChartDataResponse::Error { error } => Err(FetchError::Exchange(error)),
    }
}

pub struct PoloniexClient {
    client: Client,
    base_url: String,
    max_retries: u32,
    retry_backoff: Duration,
}

impl PoloniexClient {
    pub fn new(config: &ExchangeConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            max_retries: config.max_retries,
            retry_backoff: Duration::from_millis(config.retry_backoff_ms),
        })
    }

    /// `GET {base}/public?command=returnChartData&currencyPair=..&start=..&period=..`
    ///
    /// No `end` is sent; the exchange defaults it to the present.
    pub fn build_request(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        period: u32,
    ) -> Result<Request, FetchError> {
        let request = self
            .client
            .get(format!("{}/public", self.base_url))
            .query(&[
                ("command", "returnChartData".to_string()),
                ("currencyPair", symbol.to_string()),
                ("start", start.timestamp().to_string()),
                ("period", period.to_string()),
            ])
            .build()?;
        Ok(request)
    }

    /// Delay before retry number `attempt + 1`, doubling each time.
    fn backoff(&self, attempt: u32) -> Duration {
        self.retry_backoff * 2u32.saturating_pow(attempt.min(16))
    }

    async fn fetch_once(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        period: u32,
    ) -> Result<Vec<CandleRecord>, FetchError> {
        let request = self.build_request(symbol, start, period)?;
        debug!(symbol, url = %request.url(), "requesting chart data");

        let response = self.client.execute(request).await?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown API error".to_string());
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.bytes().await?;
        decode_chart_data(&body)
    }
}

#[async_trait]
impl ChartDataSource for PoloniexClient {
    async fn fetch_chart_data(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        period: u32,
    ) -> Result<Vec<CandleRecord>, FetchError> {
        let mut attempt = 0;
        loop {
            match self.fetch_once(symbol, start, period).await {
                Ok(candles) => return Ok(candles),
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    let delay = self.backoff(attempt);
                    attempt += 1;
                    warn!(
                        symbol,
                        attempt,
                        error = %e,
                        "chart data request failed, retrying in {:?}",
                        delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
