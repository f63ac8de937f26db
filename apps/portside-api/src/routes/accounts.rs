//! Account endpoints: reads plus the synchronous approval path.

use crate::error::{ApiError, ErrorResponse};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use chrono::NaiveDateTime;
use portside_core::ProcurementAccountId;
use portside_db::Account;
use portside_reconciler::approval::CascadeSummary;
use serde::Serialize;
use uuid::Uuid;

/// Account representation returned by the API.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct AccountResponse {
    pub procurement_account_id: String,
    pub internal_account_id: Uuid,
    pub status: String,
    pub plan_id: Option<String>,
    pub consumer_id: Option<String>,
    pub start_time: Option<NaiveDateTime>,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            procurement_account_id: account.procurement_account_id,
            internal_account_id: account.internal_account_id,
            status: account.status.as_str().to_string(),
            plan_id: account.plan_id,
            consumer_id: account.consumer_id,
            start_time: account.start_time,
        }
    }
}

/// Result of an account approval, including the cascade over pending
/// subscriptions.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct AccountApprovalResponse {
    pub account: AccountResponse,
    pub subscriptions_approved: usize,
    pub subscriptions_failed: usize,
}

impl AccountApprovalResponse {
    fn new(account: Account, summary: CascadeSummary) -> Self {
        Self {
            account: account.into(),
            subscriptions_approved: summary.approved,
            subscriptions_failed: summary.failed,
        }
    }
}

/// GET /accounts
#[utoipa::path(
    get,
    path = "/accounts",
    responses(
        (status = 200, description = "All accounts", body = [AccountResponse]),
    ),
    tag = "Accounts"
)]
pub async fn list_accounts_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<AccountResponse>>, ApiError> {
    let accounts = Account::list_all(&state.pool).await?;
    Ok(Json(accounts.into_iter().map(Into::into).collect()))
}

/// GET /accounts/:procurement_account_id
#[utoipa::path(
    get,
    path = "/accounts/{procurement_account_id}",
    params(("procurement_account_id" = String, Path, description = "External account id")),
    responses(
        (status = 200, description = "The account", body = AccountResponse),
        (status = 404, description = "Account not found", body = ErrorResponse),
    ),
    tag = "Accounts"
)]
pub async fn get_account_handler(
    State(state): State<AppState>,
    Path(procurement_account_id): Path<String>,
) -> Result<Json<AccountResponse>, ApiError> {
    let account = Account::find_by_procurement_id(&state.pool, &procurement_account_id)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound(format!("Account {procurement_account_id} not found"))
        })?;
    Ok(Json(account.into()))
}

/// POST /accounts/:procurement_account_id/approve
///
/// Approve a pending account against the procurement service and
/// cascade-approve its pending subscriptions. Cascade failures are
/// reported in the response, not as an error: the account transition has
/// already committed.
#[utoipa::path(
    post,
    path = "/accounts/{procurement_account_id}/approve",
    params(("procurement_account_id" = String, Path, description = "External account id")),
    responses(
        (status = 200, description = "Account approved", body = AccountApprovalResponse),
        (status = 404, description = "Account not found", body = ErrorResponse),
        (status = 409, description = "Account not pending", body = ErrorResponse),
        (status = 502, description = "Procurement service failure", body = ErrorResponse),
    ),
    tag = "Accounts"
)]
pub async fn approve_account_handler(
    State(state): State<AppState>,
    Path(procurement_account_id): Path<String>,
) -> Result<Json<AccountApprovalResponse>, ApiError> {
    let id = ProcurementAccountId::new(procurement_account_id);
    let (account, summary) = state.reconciler.approve_account(&id).await?;
    Ok(Json(AccountApprovalResponse::new(account, summary)))
}
