//! Error taxonomy for the collector.
//!
//! Every error maps to an [`ErrorKind`] which decides how far it travels:
//! fatal errors stop the process, worker errors end a single pair's run,
//! record errors skip one row, best-effort errors are only logged.

use thiserror::Error;

/// How far an error is allowed to propagate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Aborts the whole process.
    Fatal,
    /// Ends the current pair worker; siblings keep running.
    Worker,
    /// Skips one record; the worker keeps going.
    Record,
    /// Logged and degraded around.
    BestEffort,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("readconfig error: {path}: {error}")]
    Read { path: String, error: std::io::Error },

    #[error("yaml unmarshal error: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("unsupported database driver: {0}")]
    UnsupportedDriver(String),

    #[error("invalid pair list: {0}")]
    InvalidPairs(String),

    #[error("invalid table name: {0:?}")]
    InvalidTable(String),

    #[error("invalid setting {name}: {reason}")]
    InvalidSetting { name: &'static str, reason: String },
}

/// Failures while fetching chart data for one pair.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request error: {0}")]
    Request(reqwest::Error),

    #[error("unexpected HTTP status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("exchange error: {0}")]
    Exchange(String),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("timestamp out of range: {0}")]
    Timestamp(i64),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        FetchError::Request(e)
    }
}

impl FetchError {
    /// Transport failures and server-side errors are worth another attempt.
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Request(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            FetchError::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

#[derive(Debug, Error)]
#[error("sql error: {0}")]
pub struct StoreError(pub sqlx::Error);

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError(e)
    }
}

#[derive(Debug, Error)]
pub enum CollectorError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("db error: {0:#}")]
    Connect(anyhow::Error),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("worker for pair {symbol} timed out after {secs}s")]
    WorkerTimeout { symbol: String, secs: u64 },

    #[error("worker for pair {symbol} cancelled")]
    Cancelled { symbol: String },

    #[error("worker for pair {symbol} panicked: {reason}")]
    WorkerPanicked { symbol: String, reason: String },

    // The wrapped error is part of the message, so none of these
    // variants report it again as a source.
    #[error("insert error: {0}")]
    Insert(StoreError),

    #[error("could not get last updated date: {0}")]
    Checkpoint(StoreError),

    #[error("could not update {table}: {error}")]
    Consolidation { table: String, error: StoreError },
}

impl CollectorError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CollectorError::Config(_) | CollectorError::Connect(_) => ErrorKind::Fatal,
            CollectorError::Fetch(_)
            | CollectorError::WorkerTimeout { .. }
            | CollectorError::Cancelled { .. }
            | CollectorError::WorkerPanicked { .. } => ErrorKind::Worker,
            CollectorError::Insert(_) => ErrorKind::Record,
            CollectorError::Checkpoint(_) | CollectorError::Consolidation { .. } => {
                ErrorKind::BestEffort
            }
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.kind() == ErrorKind::Fatal
    }
}
