//! Persistence seam for candle history.

pub mod mysql;

pub use mysql::MySqlCandleStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::{HistoryRow, StoreError};

/// Storage used by the pair workers and the consolidation step.
///
/// Implementations are shared across all workers, so they must be safe
/// for concurrent use. No cross-worker locking happens above this trait:
/// every worker writes rows for its own pair id only.
#[async_trait]
pub trait CandleStore: Send + Sync {
    /// Most recent `created_at` stored for the pair, if any.
    async fn last_recorded_at(&self, pair_id: i64) -> Result<Option<DateTime<Utc>>, StoreError>;

    /// Append one row to the history table.
    async fn insert_history_row(&self, row: &HistoryRow) -> Result<(), StoreError>;

    /// Replace the summary table with the history table contents.
    /// Returns the number of rows now in the summary table.
    async fn consolidate(&self) -> Result<u64, StoreError>;

    /// Name of the summary table, for log output.
    fn summary_table(&self) -> &str;
}
