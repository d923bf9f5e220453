use sqlx::mysql::MySqlPoolOptions;
use sqlx::MySqlPool;
use anyhow::Result;
use tracing::info;

pub async fn get_pool(database_url: &str, max_connections: u32) -> Result<MySqlPool> {
    info!("Connecting to database at: {}", redact_url(database_url));
    let pool = MySqlPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;
    Ok(pool)
}

/// Strip the password from a connection URL before it reaches the logs.
fn redact_url(database_url: &str) -> String {
    let Some((scheme, rest)) = database_url.split_once("://") else {
        return database_url.to_string();
    };
    let Some((credentials, host)) = rest.rsplit_once('@') else {
        return database_url.to_string();
    };
    let user = credentials.split(':').next().unwrap_or_default();
    format!("{}://{}:***@{}", scheme, user, host)
}

pub type DbPool = MySqlPool;
