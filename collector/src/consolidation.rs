//! Summary table rebuild, run once after every worker has finished.

use shared::CollectorError;
use tracing::{error, info};

use crate::store::CandleStore;

/// Replace the summary table with the history table.
///
/// The store performs the swap atomically, so a failure leaves the previous
/// summary contents in place. Errors are logged and returned so the caller
/// can decide on the exit status.
pub async fn consolidate(store: &dyn CandleStore) -> Result<u64, CollectorError> {
    let table = store.summary_table().to_string();

    match store.consolidate().await {
        Ok(rows) => {
            info!(rows, "The {} table was completely updated", table);
            Ok(rows)
        }
        Err(error) => {
            let err = CollectorError::Consolidation { table, error };
            error!(error = %err, "consolidation rolled back");
            Err(err)
        }
    }
}
