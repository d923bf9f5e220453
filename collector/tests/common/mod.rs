//! In-memory doubles shared by the integration tests.
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use collector::exchange::ChartDataSource;
use collector::store::CandleStore;
use collector::worker::{WorkerContext, WorkerSettings};
use shared::{CandleRecord, FetchError, HistoryRow, QuotePolicy, StoreError};
use tokio::sync::Notify;

pub fn candle(date: i64, close: f64) -> CandleRecord {
    CandleRecord {
        timestamp: Utc.timestamp_opt(date, 0).unwrap(),
        low: close - 10.0,
        high: close + 10.0,
        weighted_average: close,
        open: close,
        close,
        volume: 1.0,
        quote_volume: close,
    }
}

pub fn row(pair_id: i64, date: i64) -> HistoryRow {
    HistoryRow::from_candle(pair_id, &candle(date, 100.0), QuotePolicy::Placeholder)
}

fn store_error(msg: &str) -> StoreError {
    StoreError(sqlx::Error::Protocol(msg.to_string()))
}

#[derive(Default)]
pub struct MemoryStore {
    pub history: Mutex<Vec<HistoryRow>>,
    pub summary: Mutex<Vec<HistoryRow>>,
    pub fail_checkpoint: bool,
    pub fail_consolidate: bool,
    /// `created_at` seconds whose insert should fail
    pub fail_inserts: HashSet<i64>,
}

impl MemoryStore {
    pub fn with_history(rows: Vec<HistoryRow>) -> Self {
        Self {
            history: Mutex::new(rows),
            ..Default::default()
        }
    }

    pub fn history_for(&self, pair_id: i64) -> Vec<HistoryRow> {
        self.history
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.pair_id == pair_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl CandleStore for MemoryStore {
    async fn last_recorded_at(&self, pair_id: i64) -> Result<Option<DateTime<Utc>>, StoreError> {
        if self.fail_checkpoint {
            return Err(store_error("checkpoint lookup failed"));
        }
        Ok(self
            .history
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.pair_id == pair_id)
            .map(|r| r.created_at)
            .max())
    }

    async fn insert_history_row(&self, row: &HistoryRow) -> Result<(), StoreError> {
        if self.fail_inserts.contains(&row.created_at.timestamp()) {
            return Err(store_error("duplicate entry"));
        }
        self.history.lock().unwrap().push(row.clone());
        Ok(())
    }

    async fn consolidate(&self) -> Result<u64, StoreError> {
        if self.fail_consolidate {
            return Err(store_error("lock wait timeout exceeded"));
        }
        let history = self.history.lock().unwrap().clone();
        let rows = history.len() as u64;
        *self.summary.lock().unwrap() = history;
        Ok(rows)
    }

    fn summary_table(&self) -> &str {
        "market_history"
    }
}

/// Canned responses per symbol. Unknown symbols get an exchange error.
#[derive(Default)]
pub struct StaticSource {
    responses: HashMap<String, Vec<CandleRecord>>,
    failures: HashSet<String>,
    pub requests: Mutex<Vec<(String, DateTime<Utc>, u32)>>,
}

impl StaticSource {
    pub fn with(mut self, symbol: &str, candles: Vec<CandleRecord>) -> Self {
        self.responses.insert(symbol.to_string(), candles);
        self
    }

    pub fn failing(mut self, symbol: &str) -> Self {
        self.failures.insert(symbol.to_string());
        self
    }
}

#[async_trait]
impl ChartDataSource for StaticSource {
    async fn fetch_chart_data(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        period: u32,
    ) -> Result<Vec<CandleRecord>, FetchError> {
        self.requests
            .lock()
            .unwrap()
            .push((symbol.to_string(), start, period));

        if self.failures.contains(symbol) {
            return Err(FetchError::Decode("unexpected end of input".to_string()));
        }
        self.responses
            .get(symbol)
            .cloned()
            .ok_or_else(|| FetchError::Exchange("Invalid currency pair.".to_string()))
    }
}

/// Wraps another source and holds one symbol until released.
pub struct StallingSource<S> {
    inner: S,
    stalled: String,
    pub release: Arc<Notify>,
}

impl<S> StallingSource<S> {
    pub fn new(inner: S, stalled: &str) -> Self {
        Self {
            inner,
            stalled: stalled.to_string(),
            release: Arc::new(Notify::new()),
        }
    }
}

#[async_trait]
impl<S: ChartDataSource> ChartDataSource for StallingSource<S> {
    async fn fetch_chart_data(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        period: u32,
    ) -> Result<Vec<CandleRecord>, FetchError> {
        if symbol == self.stalled {
            self.release.notified().await;
        }
        self.inner.fetch_chart_data(symbol, start, period).await
    }
}

/// Panics for one symbol.
pub struct PanickingSource {
    pub symbol: String,
}

#[async_trait]
impl ChartDataSource for PanickingSource {
    async fn fetch_chart_data(
        &self,
        symbol: &str,
        _start: DateTime<Utc>,
        _period: u32,
    ) -> Result<Vec<CandleRecord>, FetchError> {
        if symbol == self.symbol {
            panic!("decoder blew up for {}", symbol);
        }
        Ok(vec![candle(1483228800, 100.0)])
    }
}

pub fn context(
    store: Arc<MemoryStore>,
    source: Arc<dyn ChartDataSource>,
    settings: WorkerSettings,
) -> Arc<WorkerContext> {
    Arc::new(WorkerContext {
        store,
        source,
        settings,
    })
}
