//! Shared application state.

use portside_reconciler::Reconciler;
use sqlx::PgPool;

/// State handed to every HTTP handler.
#[derive(Clone)]
pub struct AppState {
    /// Store pool for the read endpoints.
    pub pool: PgPool,
    /// Reconciler backing the approval endpoints; shares the same pool.
    pub reconciler: Reconciler,
}
