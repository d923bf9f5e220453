//! Checkpoint resolution: where the next fetch window for a pair starts.

use chrono::{DateTime, Duration, Utc};
use shared::{CollectorError, Config, TradingPair};
use tracing::{debug, warn};

use crate::store::CandleStore;

#[derive(Debug, Clone, Copy)]
pub struct CheckpointPolicy {
    /// Added to the last stored candle so its bucket is not fetched again.
    pub offset: Duration,
    /// Window used when nothing is stored for the pair yet.
    pub lookback: Duration,
}

impl Default for CheckpointPolicy {
    fn default() -> Self {
        Self {
            offset: Duration::minutes(5),
            lookback: Duration::days(30),
        }
    }
}

impl CheckpointPolicy {
    /// Out-of-range settings keep the matching default.
    pub fn from_config(config: &Config) -> Self {
        let defaults = Self::default();
        Self {
            offset: Duration::try_seconds(config.checkpoint_offset_secs).unwrap_or(defaults.offset),
            lookback: Duration::try_days(config.lookback_days).unwrap_or(defaults.lookback),
        }
    }

    /// Instant overflow falls back to the lookback window, then to `now`.
    pub fn window_start(&self, last: Option<DateTime<Utc>>, now: DateTime<Utc>) -> DateTime<Utc> {
        last.and_then(|last| last.checked_add_signed(self.offset))
            .or_else(|| now.checked_sub_signed(self.lookback))
            .unwrap_or(now)
    }
}

/// Start instant for the next fetch of `pair`.
///
/// Never fails: a missing checkpoint or a failed lookup both fall back to
/// the lookback window.
pub async fn resolve_start(
    store: &dyn CandleStore,
    pair: &TradingPair,
    policy: &CheckpointPolicy,
    now: DateTime<Utc>,
) -> DateTime<Utc> {
    let last = match store.last_recorded_at(pair.id).await {
        Ok(Some(last)) => Some(last),
        Ok(None) => {
            debug!(pair_id = pair.id, symbol = %pair.symbol, "no stored candles, using lookback window");
            None
        }
        Err(e) => {
            let err = CollectorError::Checkpoint(e);
            warn!(pair_id = pair.id, symbol = %pair.symbol, error = %err, "falling back to lookback window");
            None
        }
    };
    policy.window_start(last, now)
}
