//! Collector: incremental Poloniex candle ingestion
//!
//! For every configured trading pair a worker resolves where the last run
//! stopped, pulls the chart data from that point onward and appends it to
//! the per-exchange history table. Once every worker has finished the
//! summary table is rebuilt from the history table in one transaction.
//!
//! # Modules
//!
//! - **checkpoint**: start of the next fetch window per pair
//! - **exchange**: chart data source trait and the Poloniex HTTP client
//! - **store**: candle store trait and its MySQL implementation
//! - **writer**: candle to history row persistence
//! - **worker**: one pair, end to end
//! - **coordinator**: fan-out over all pairs with a join barrier
//! - **consolidation**: summary table rebuild

pub mod checkpoint;
pub mod consolidation;
pub mod coordinator;
pub mod exchange;
pub mod store;
pub mod worker;
pub mod writer;

pub mod prelude {
    pub use crate::checkpoint::*;
    pub use crate::consolidation::*;
    pub use crate::coordinator::*;
    pub use crate::exchange::*;
    pub use crate::store::*;
    pub use crate::worker::*;
    pub use crate::writer::*;

    pub use shared::{CandleRecord, CollectorError, ErrorKind, HistoryRow, QuotePolicy, TradingPair};
}
