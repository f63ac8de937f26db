//! Subscription endpoints: reads, approval, and the recovery path.

use crate::error::{ApiError, ErrorResponse};
use crate::routes::accounts::AccountResponse;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use chrono::NaiveDateTime;
use portside_core::EntitlementId;
use portside_db::Subscription;
use serde::Serialize;
use uuid::Uuid;

/// Subscription representation returned by the API.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct SubscriptionResponse {
    pub subscription_id: String,
    /// Owning account row id; null while the subscription is unattached.
    pub account_id: Option<Uuid>,
    pub product_id: Option<String>,
    pub plan_id: Option<String>,
    pub consumer_id: Option<String>,
    pub start_time: Option<NaiveDateTime>,
    pub status: String,
}

impl From<Subscription> for SubscriptionResponse {
    fn from(subscription: Subscription) -> Self {
        Self {
            subscription_id: subscription.subscription_id,
            account_id: subscription.account_id,
            product_id: subscription.product_id,
            plan_id: subscription.plan_id,
            consumer_id: subscription.consumer_id,
            start_time: subscription.start_time,
            status: subscription.status.as_str().to_string(),
        }
    }
}

/// GET /subscriptions
#[utoipa::path(
    get,
    path = "/subscriptions",
    responses(
        (status = 200, description = "All subscriptions", body = [SubscriptionResponse]),
    ),
    tag = "Subscriptions"
)]
pub async fn list_subscriptions_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<SubscriptionResponse>>, ApiError> {
    let subscriptions = Subscription::list_all(&state.pool).await?;
    Ok(Json(subscriptions.into_iter().map(Into::into).collect()))
}

/// GET /subscriptions/:subscription_id
#[utoipa::path(
    get,
    path = "/subscriptions/{subscription_id}",
    params(("subscription_id" = String, Path, description = "External entitlement id")),
    responses(
        (status = 200, description = "The subscription", body = SubscriptionResponse),
        (status = 404, description = "Subscription not found", body = ErrorResponse),
    ),
    tag = "Subscriptions"
)]
pub async fn get_subscription_handler(
    State(state): State<AppState>,
    Path(subscription_id): Path<String>,
) -> Result<Json<SubscriptionResponse>, ApiError> {
    let subscription = Subscription::find_by_external_id(&state.pool, &subscription_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Subscription {subscription_id} not found")))?;
    Ok(Json(subscription.into()))
}

/// POST /subscriptions/:subscription_id/approve
///
/// Approve a subscription whose activation the procurement service is
/// waiting on.
#[utoipa::path(
    post,
    path = "/subscriptions/{subscription_id}/approve",
    params(("subscription_id" = String, Path, description = "External entitlement id")),
    responses(
        (status = 200, description = "Subscription approved", body = SubscriptionResponse),
        (status = 404, description = "Subscription not found", body = ErrorResponse),
        (status = 422, description = "Entitlement not awaiting activation", body = ErrorResponse),
        (status = 502, description = "Procurement service failure", body = ErrorResponse),
    ),
    tag = "Subscriptions"
)]
pub async fn approve_subscription_handler(
    State(state): State<AppState>,
    Path(subscription_id): Path<String>,
) -> Result<Json<SubscriptionResponse>, ApiError> {
    let id = EntitlementId::new(subscription_id);
    let subscription = state.reconciler.approve_subscription(&id).await?;
    Ok(Json(subscription.into()))
}

/// POST /subscriptions/:subscription_id/recover
///
/// Repair path for split-brain: rebuild the owning account from
/// procurement ground truth, approve it, then approve this entitlement.
#[utoipa::path(
    post,
    path = "/subscriptions/{subscription_id}/recover",
    params(("subscription_id" = String, Path, description = "External entitlement id")),
    responses(
        (status = 200, description = "Account recovered and approved", body = AccountResponse),
        (status = 502, description = "Procurement service failure", body = ErrorResponse),
    ),
    tag = "Subscriptions"
)]
pub async fn recover_account_handler(
    State(state): State<AppState>,
    Path(subscription_id): Path<String>,
) -> Result<Json<AccountResponse>, ApiError> {
    let id = EntitlementId::new(subscription_id);
    let account = state.reconciler.recover_and_approve_account(&id).await?;
    Ok(Json(account.into()))
}
