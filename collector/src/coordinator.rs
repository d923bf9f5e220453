//! Fan-out over all configured pairs with a join barrier.

use std::sync::Arc;

use futures::future::join_all;
use shared::{CollectorError, TradingPair};
use tokio::sync::watch;
use tokio::task::JoinError;
use tracing::{error, info};

use crate::worker::{run_worker, WorkerContext, WorkerOutcome};

/// Outcomes of one run, in the order the pairs were given.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub outcomes: Vec<WorkerOutcome>,
}

impl RunSummary {
    pub fn total_inserted(&self) -> usize {
        self.outcomes.iter().map(|o| o.inserted()).sum()
    }

    pub fn aborted(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_aborted()).count()
    }

    pub fn first_error(&self) -> Option<&CollectorError> {
        self.outcomes.iter().find_map(|o| o.result.as_ref().err())
    }

    pub fn was_cancelled(&self) -> bool {
        self.outcomes
            .iter()
            .any(|o| matches!(o.result, Err(CollectorError::Cancelled { .. })))
    }
}

/// Spawn one worker per pair and wait for every one of them.
///
/// Returns only once each worker has reached a terminal state. A worker
/// that panics is reported as aborted; its siblings are unaffected.
pub async fn run_all(
    ctx: Arc<WorkerContext>,
    pairs: &[TradingPair],
    shutdown: watch::Receiver<bool>,
) -> RunSummary {
    info!("Parsing data started for {} pairs", pairs.len());

    let handles: Vec<_> = pairs
        .iter()
        .cloned()
        .map(|pair| tokio::spawn(run_worker(ctx.clone(), pair, shutdown.clone())))
        .collect();

    let outcomes = join_all(handles)
        .await
        .into_iter()
        .zip(pairs)
        .map(|(joined, pair)| match joined {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(pair_id = pair.id, symbol = %pair.symbol, error = %e, "worker task failed");
                failed_outcome(pair, e)
            }
        })
        .collect();

    let summary = RunSummary { outcomes };
    info!(
        inserted = summary.total_inserted(),
        aborted = summary.aborted(),
        "all pair workers finished"
    );
    summary
}

/// Outcome for a worker task that never produced one.
fn failed_outcome(pair: &TradingPair, e: JoinError) -> WorkerOutcome {
    let symbol = pair.symbol.clone();
    let result = if e.is_panic() {
        Err(CollectorError::WorkerPanicked {
            symbol,
            reason: e.to_string(),
        })
    } else {
        Err(CollectorError::Cancelled { symbol })
    };
    WorkerOutcome {
        pair: pair.clone(),
        result,
    }
}
