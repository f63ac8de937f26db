//! HTTP error mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use portside_reconciler::ApprovalError;
use serde::Serialize;
use thiserror::Error;

/// Errors surfaced by the HTTP handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found.
    #[error("{0}")]
    NotFound(String),

    /// The request conflicts with current state.
    #[error("{0}")]
    Conflict(String),

    /// The request is valid but cannot be processed right now.
    #[error("{0}")]
    Unprocessable(String),

    /// The procurement service failed or answered nonsense.
    #[error("Upstream procurement error: {0}")]
    Upstream(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

/// Error response body.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::NotFound(_) => "not_found",
            ApiError::Conflict(_) => "conflict",
            ApiError::Unprocessable(_) => "unprocessable",
            ApiError::Upstream(_) => "upstream_error",
            ApiError::Database(_) => "internal_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorResponse {
            error: self.code().to_string(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<ApprovalError> for ApiError {
    fn from(err: ApprovalError) -> Self {
        match err {
            ApprovalError::AccountNotFound(_) | ApprovalError::SubscriptionNotFound(_) => {
                ApiError::NotFound(err.to_string())
            }
            ApprovalError::AccountNotPending { .. } => ApiError::Conflict(err.to_string()),
            ApprovalError::NotAwaitingActivation { .. } => ApiError::Unprocessable(err.to_string()),
            ApprovalError::MissingAccountReference { .. } | ApprovalError::Gateway(_) => {
                ApiError::Upstream(err.to_string())
            }
            ApprovalError::Db(e) => ApiError::Database(e.to_string()),
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::Database(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn approval_errors_map_to_expected_statuses() {
        let not_found: ApiError = ApprovalError::AccountNotFound("acc-1".to_string()).into();
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);

        let conflict: ApiError = ApprovalError::AccountNotPending {
            procurement_account_id: "acc-1".to_string(),
            status: "active",
        }
        .into();
        assert_eq!(conflict.status(), StatusCode::CONFLICT);

        let unprocessable: ApiError = ApprovalError::NotAwaitingActivation {
            entitlement_id: "sub-1".to_string(),
            state: "ENTITLEMENT_ACTIVE".to_string(),
        }
        .into();
        assert_eq!(unprocessable.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
