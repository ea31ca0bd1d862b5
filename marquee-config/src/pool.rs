use std::str::FromStr;

use marquee_core::{Store, StoreError};
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use tracing::info;

use crate::models::DatabaseConfig;

/// Build a bounded pool from `config` and check that the database answers
/// within the configured query timeout.
///
/// The pool belongs to the caller; hand it to [`Store::postgres`] (or use
/// [`connect_store`]).
pub async fn open_pool(config: &DatabaseConfig) -> Result<PgPool, StoreError> {
    let connect_options = PgConnectOptions::from_str(&config.url)?;

    let pool = PgPoolOptions::new()
        .max_connections(config.max_open_conns)
        .min_connections(config.max_idle_conns.min(config.max_open_conns))
        .idle_timeout(config.max_idle_time)
        .acquire_timeout(config.query_timeout)
        .connect_lazy_with(connect_options);

    tokio::time::timeout(config.query_timeout, sqlx::query("SELECT 1").execute(&pool))
        .await
        .map_err(|_| StoreError::Timeout)??;

    info!(
        url = %config.redacted_url(),
        max_connections = config.max_open_conns,
        min_connections = config.max_idle_conns,
        "Database pool ready"
    );
    Ok(pool)
}

/// Open a pool and wrap it in a PostgreSQL-backed [`Store`] whose statement
/// deadline is the configured query timeout.
pub async fn connect_store(config: &DatabaseConfig) -> Result<Store, StoreError> {
    let pool = open_pool(config).await?;
    Ok(Store::postgres(pool, config.query_timeout))
}
