//! Error types for the portside-procurement crate.

use thiserror::Error;

/// Errors from procurement service calls.
///
/// The reconciler treats every gateway failure uniformly (retry is a
/// delivery-layer concern), so the taxonomy here exists for logging and
/// for the synchronous API's response mapping, not for retry decisions.
#[derive(Debug, Error)]
pub enum ProcurementError {
    /// Client construction or configuration problem.
    #[error("Invalid procurement client configuration: {0}")]
    InvalidConfig(String),

    /// Network-level failure reaching the service.
    #[error("Procurement request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("Procurement service returned {status} for {operation}: {body}")]
    Status {
        operation: &'static str,
        status: reqwest::StatusCode,
        body: String,
    },

    /// The response body did not match the expected shape.
    #[error("Malformed procurement response for {operation}: {cause}")]
    MalformedResponse {
        operation: &'static str,
        cause: String,
    },
}
