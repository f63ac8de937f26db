//! Error types for the portside-db crate.

use thiserror::Error;

/// Database operation errors.
///
/// Wraps `SQLx` errors with enough context to tell a connectivity problem
/// apart from a failed query or migration.
#[derive(Debug, Error)]
pub enum DbError {
    /// Failed to establish or acquire a database connection.
    #[error("Database connection failed: {0}")]
    ConnectionFailed(#[source] sqlx::Error),

    /// A database migration failed to apply.
    #[error("Migration failed: {0}")]
    MigrationFailed(#[source] sqlx::migrate::MigrateError),

    /// A database query failed to execute.
    #[error("Query failed: {0}")]
    QueryFailed(#[from] sqlx::Error),
}

impl DbError {
    /// Check if this error indicates a connection problem.
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(self, DbError::ConnectionFailed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_error_classification() {
        let err = DbError::ConnectionFailed(sqlx::Error::PoolTimedOut);
        assert!(err.is_connection_error());

        let err = DbError::QueryFailed(sqlx::Error::RowNotFound);
        assert!(!err.is_connection_error());
    }
}
