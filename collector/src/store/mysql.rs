//! MySQL-backed candle store

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::{DbPool, HistoryRow, StoreError};
use tracing::debug;

use super::CandleStore;

/// Candle store over a shared MySQL pool.
///
/// Statements are built once from the configured table names. sqlx keeps
/// a prepared statement cache per pooled connection, so the insert is
/// prepared once per connection rather than once per row.
pub struct MySqlCandleStore {
    pool: DbPool,
    summary_table: String,
    last_recorded_sql: String,
    insert_sql: String,
    clear_summary_sql: String,
    copy_history_sql: String,
}

impl MySqlCandleStore {
    /// Table names must already be validated identifiers.
    pub fn new(pool: DbPool, history_table: &str, summary_table: &str) -> Self {
        Self {
            pool,
            summary_table: summary_table.to_string(),
            last_recorded_sql: format!(
                "SELECT created_at FROM {} WHERE pair_id = ? ORDER BY created_at DESC LIMIT 1",
                history_table
            ),
            insert_sql: format!(
                "INSERT INTO {} (pair_id, low, high, avg, open, close, ask, bid, volume, quote_volume, created_at) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                history_table
            ),
            // TRUNCATE commits implicitly in MySQL, DELETE keeps the swap atomic
            clear_summary_sql: format!("DELETE FROM {}", summary_table),
            copy_history_sql: format!("INSERT INTO {} SELECT * FROM {}", summary_table, history_table),
        }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl CandleStore for MySqlCandleStore {
    async fn last_recorded_at(&self, pair_id: i64) -> Result<Option<DateTime<Utc>>, StoreError> {
        let last = sqlx::query_scalar::<_, DateTime<Utc>>(&self.last_recorded_sql)
            .bind(pair_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(last)
    }

    async fn insert_history_row(&self, row: &HistoryRow) -> Result<(), StoreError> {
        sqlx::query(&self.insert_sql)
            .bind(row.pair_id)
            .bind(row.low)
            .bind(row.high)
            .bind(row.avg)
            .bind(row.open)
            .bind(row.close)
            .bind(row.ask)
            .bind(row.bid)
            .bind(row.volume)
            .bind(row.quote_volume)
            .bind(row.created_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn consolidate(&self) -> Result<u64, StoreError> {
        let mut tx = self.pool.begin().await?;

        let cleared = sqlx::query(&self.clear_summary_sql).execute(&mut *tx).await?;
        debug!(rows = cleared.rows_affected(), "cleared {}", self.summary_table);

        let copied = sqlx::query(&self.copy_history_sql).execute(&mut *tx).await?;

        // Dropping the transaction on an error above rolls it back.
        tx.commit().await?;
        Ok(copied.rows_affected())
    }

    fn summary_table(&self) -> &str {
        &self.summary_table
    }
}
