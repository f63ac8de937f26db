//! Connection pool bootstrap.

use crate::error::DbError;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

/// Connect to Postgres and return a shared connection pool.
///
/// The pool is the process-scoped store handle: it is created once at
/// startup and passed explicitly to every component that touches the
/// database.
///
/// # Errors
///
/// Returns `DbError::ConnectionFailed` when the database is unreachable or
/// the credentials are rejected.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<PgPool, DbError> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url)
        .await
        .map_err(DbError::ConnectionFailed)?;

    tracing::info!(max_connections, "Database pool ready");

    Ok(pool)
}
