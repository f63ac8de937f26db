//! Router assembly.

use crate::openapi::openapi_handler;
use crate::routes::accounts::{
    approve_account_handler, get_account_handler, list_accounts_handler,
};
use crate::routes::health::health_handler;
use crate::routes::subscriptions::{
    approve_subscription_handler, get_subscription_handler, list_subscriptions_handler,
    recover_account_handler,
};
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

/// Build the application router.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/openapi.json", get(openapi_handler))
        .route("/accounts", get(list_accounts_handler))
        .route("/accounts/:procurement_account_id", get(get_account_handler))
        .route(
            "/accounts/:procurement_account_id/approve",
            post(approve_account_handler),
        )
        .route("/subscriptions", get(list_subscriptions_handler))
        .route("/subscriptions/:subscription_id", get(get_subscription_handler))
        .route(
            "/subscriptions/:subscription_id/approve",
            post(approve_subscription_handler),
        )
        .route(
            "/subscriptions/:subscription_id/recover",
            post(recover_account_handler),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
