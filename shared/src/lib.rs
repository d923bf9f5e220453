pub mod config;
pub mod database;
pub mod error;
pub mod models;

pub use config::{Config, ExchangeConfig, PairConfig};
pub use database::{get_pool, DbPool};
pub use error::{CollectorError, ConfigError, ErrorKind, FetchError, StoreError};
pub use models::*;
