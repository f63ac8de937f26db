//! Error types for the portside-reconciler crate.

use portside_procurement::ProcurementError;
use thiserror::Error;

/// Failures from the event-driven reconcile path.
///
/// Any value of this type means the triggering message must NOT be
/// acknowledged: the store or the gateway was unreachable and redelivery
/// may succeed. Permanent conditions (missing rows, duplicate creates) are
/// [`crate::Outcome::Skipped`] values, not errors.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// Store access failed.
    #[error("Store error: {0}")]
    Db(#[from] sqlx::Error),

    /// A procurement gateway call failed.
    #[error("Gateway error: {0}")]
    Gateway(#[from] ProcurementError),
}

/// Failures from the synchronous approval operations.
///
/// Unlike the event path, there is no delivery-layer retry behind these,
/// so every failure is surfaced to the caller.
#[derive(Debug, Error)]
pub enum ApprovalError {
    /// No local account for this procurement id.
    #[error("Account {0} not found")]
    AccountNotFound(String),

    /// No local subscription for this entitlement id.
    #[error("Subscription {0} not found")]
    SubscriptionNotFound(String),

    /// The account is not awaiting approval.
    #[error("Account {procurement_account_id} is not pending (status: {status})")]
    AccountNotPending {
        procurement_account_id: String,
        status: &'static str,
    },

    /// The procurement service does not consider the entitlement
    /// approvable right now.
    #[error("Entitlement {entitlement_id} is not awaiting activation (state: {state})")]
    NotAwaitingActivation {
        entitlement_id: String,
        state: String,
    },

    /// The procurement service returned entitlement details without a
    /// usable owning-account reference.
    #[error("Entitlement {entitlement_id} has no usable account reference")]
    MissingAccountReference { entitlement_id: String },

    /// Store access failed.
    #[error("Store error: {0}")]
    Db(#[from] sqlx::Error),

    /// A procurement gateway call failed.
    #[error("Gateway error: {0}")]
    Gateway(#[from] ProcurementError),
}
