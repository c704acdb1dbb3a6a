use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::config::AppConfig;

/// Open a pool against the contact store named by `DATABASE_URL`.
///
/// The run only issues one lookup at a time, so the pool is small; its size
/// still follows `AppConfig::db_max_connections`.
pub async fn connect_contact_store(config: &AppConfig) -> anyhow::Result<PgPool> {
    let database_url = config.require_database_url()?;

    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await
        .map_err(|e| anyhow::anyhow!("could not connect to contact store: {e}"))?;

    tracing::info!(
        max_connections = config.db_max_connections,
        "Connected to contact store"
    );
    Ok(pool)
}
