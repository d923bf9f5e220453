//! Pair worker: checkpoint, fetch, write for a single trading pair.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use shared::{CollectorError, Config, QuotePolicy, TradingPair};
use tokio::sync::watch;
use tracing::{error, info};

use crate::checkpoint::{resolve_start, CheckpointPolicy};
use crate::exchange::ChartDataSource;
use crate::store::CandleStore;
use crate::writer::{write_candles, WriteReport};

#[derive(Debug, Clone)]
pub struct WorkerSettings {
    /// Candle width in seconds
    pub period: u32,
    pub checkpoint: CheckpointPolicy,
    pub quotes: QuotePolicy,
    /// Deadline for one pair, fetch and writes included.
    pub timeout: Duration,
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            period: 300,
            checkpoint: CheckpointPolicy::default(),
            quotes: QuotePolicy::Placeholder,
            timeout: Duration::from_secs(300),
        }
    }
}

impl WorkerSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            period: config.exchange.period,
            checkpoint: CheckpointPolicy::from_config(config),
            quotes: config.quote_policy,
            timeout: Duration::from_secs(config.worker_timeout_secs),
        }
    }
}

/// Everything a worker needs, shared by all workers of a run.
pub struct WorkerContext {
    pub store: Arc<dyn CandleStore>,
    pub source: Arc<dyn ChartDataSource>,
    pub settings: WorkerSettings,
}

/// Terminal state of one pair worker.
#[derive(Debug)]
pub struct WorkerOutcome {
    pub pair: TradingPair,
    pub result: Result<WriteReport, CollectorError>,
}

impl WorkerOutcome {
    pub fn is_aborted(&self) -> bool {
        self.result.is_err()
    }

    pub fn inserted(&self) -> usize {
        self.result.as_ref().map(|r| r.inserted).unwrap_or(0)
    }

    pub fn summary(&self) -> String {
        match &self.result {
            Ok(report) => format!("Inserted {} records for pair {}", report.inserted, self.pair.symbol),
            Err(e) => format!("Aborted pair {}: {}", self.pair.symbol, e),
        }
    }
}

/// Resolve the checkpoint, fetch from there and write what came back.
///
/// Only a fetch failure ends the worker early; checkpoint and insert
/// failures are absorbed further down.
pub async fn run_pair(ctx: &WorkerContext, pair: &TradingPair) -> Result<WriteReport, CollectorError> {
    let settings = &ctx.settings;

    let start = resolve_start(ctx.store.as_ref(), pair, &settings.checkpoint, Utc::now()).await;
    info!(pair_id = pair.id, symbol = %pair.symbol, start = %start, "fetching chart data");

    let candles = ctx
        .source
        .fetch_chart_data(&pair.symbol, start, settings.period)
        .await?;

    let report = write_candles(ctx.store.as_ref(), pair, &candles, settings.quotes).await;
    Ok(report)
}

/// Run one pair under the worker deadline, stopping early on shutdown.
pub async fn run_worker(
    ctx: Arc<WorkerContext>,
    pair: TradingPair,
    mut shutdown: watch::Receiver<bool>,
) -> WorkerOutcome {
    let deadline = ctx.settings.timeout;

    let result = tokio::select! {
        res = tokio::time::timeout(deadline, run_pair(&ctx, &pair)) => match res {
            Ok(result) => result,
            Err(_) => Err(CollectorError::WorkerTimeout {
                symbol: pair.symbol.clone(),
                secs: deadline.as_secs(),
            }),
        },
        _ = wait_for_shutdown(&mut shutdown) => Err(CollectorError::Cancelled {
            symbol: pair.symbol.clone(),
        }),
    };

    let outcome = WorkerOutcome { pair, result };
    match &outcome.result {
        Ok(report) => info!(
            pair_id = outcome.pair.id,
            empty_buckets = report.empty_buckets,
            failed = report.failed,
            "{}",
            outcome.summary()
        ),
        Err(_) => error!(pair_id = outcome.pair.id, "{}", outcome.summary()),
    }
    outcome
}

async fn wait_for_shutdown(shutdown: &mut watch::Receiver<bool>) {
    // A dropped sender means nobody can ask us to stop any more.
    if shutdown.wait_for(|stop| *stop).await.is_err() {
        std::future::pending::<()>().await;
    }
}
