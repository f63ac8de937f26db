//! OpenAPI document generation.

use crate::error::ErrorResponse;
use crate::routes::accounts::{AccountApprovalResponse, AccountResponse};
use crate::routes::health::HealthResponse;
use crate::routes::subscriptions::SubscriptionResponse;
use axum::Json;
use utoipa::OpenApi;

/// API documentation for the marketplace integration surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "portside",
        description = "Marketplace account and subscription reconciliation API"
    ),
    paths(
        crate::routes::health::health_handler,
        crate::routes::accounts::list_accounts_handler,
        crate::routes::accounts::get_account_handler,
        crate::routes::accounts::approve_account_handler,
        crate::routes::subscriptions::list_subscriptions_handler,
        crate::routes::subscriptions::get_subscription_handler,
        crate::routes::subscriptions::approve_subscription_handler,
        crate::routes::subscriptions::recover_account_handler,
    ),
    components(schemas(
        AccountResponse,
        AccountApprovalResponse,
        SubscriptionResponse,
        HealthResponse,
        ErrorResponse,
    ))
)]
pub struct ApiDoc;

/// GET /openapi.json
pub async fn openapi_handler() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
