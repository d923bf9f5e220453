use std::sync::Arc;

use anyhow::Result;
use collector::consolidation::consolidate;
use collector::coordinator::run_all;
use collector::exchange::PoloniexClient;
use collector::store::{CandleStore, MySqlCandleStore};
use collector::worker::{WorkerContext, WorkerSettings};
use shared::{get_pool, CollectorError, Config};
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!(
        "Starting collector v{} ({} @ {}, built {})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("GIT_BRANCH"),
        env!("BUILD_TIME")
    );

    let config = Config::from_env().map_err(CollectorError::from)?;
    let pool = get_pool(&config.dsn, config.max_connections)
        .await
        .map_err(CollectorError::Connect)?;
    info!("Connected to database successfully");

    let store = Arc::new(MySqlCandleStore::new(
        pool,
        &config.history_table,
        &config.summary_table,
    ));
    let source = Arc::new(PoloniexClient::new(&config.exchange).map_err(CollectorError::from)?);
    let ctx = Arc::new(WorkerContext {
        store: store.clone(),
        source,
        settings: WorkerSettings::from_config(&config),
    });

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Received CTRL+C, cancelling in-flight workers...");
            let _ = shutdown_tx.send(true);
        }
    });

    let summary = run_all(ctx, &config.trading_pairs(), shutdown_rx).await;

    if summary.was_cancelled() {
        warn!("Run cancelled, {} table left untouched", store.summary_table());
        std::process::exit(130);
    }

    let consolidated = consolidate(store.as_ref()).await;
    store.pool().close().await;

    if let Some(err) = summary.first_error() {
        error!(
            aborted = summary.aborted(),
            error = %err,
            "{} of {} pair workers aborted",
            summary.aborted(),
            summary.outcomes.len()
        );
        std::process::exit(1);
    }
    if consolidated.is_err() {
        std::process::exit(1);
    }

    Ok(())
}
