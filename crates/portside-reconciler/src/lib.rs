//! # portside-reconciler
//!
//! The lifecycle reconciler: applies procurement lifecycle events to the
//! local store and issues compensating approval calls.
//!
//! Every event kind maps to exactly one handler via an exhaustive match,
//! and every handler re-reads current state inside its own transaction, so
//! duplicate and out-of-order delivery converge on the same end state. The
//! synchronous approval operations reuse the same transition rules, which
//! keeps the asynchronous and operator-driven paths from diverging.

pub mod accounts;
pub mod approval;
pub mod error;
pub mod subscriptions;

pub use error::{ApprovalError, ReconcileError};

use async_trait::async_trait;
use portside_events::{LifecycleEvent, LifecycleHandler};
use portside_procurement::ProcurementGateway;
use sqlx::PgPool;
use std::fmt;
use std::sync::Arc;
use tracing::{instrument, warn};

/// Result of applying one lifecycle event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The store was changed (and any required gateway call succeeded).
    Applied,
    /// Nothing to do; the event is acknowledged as handled.
    Skipped(SkipReason),
}

/// Why an event produced no state change.
///
/// All of these are permanent from the reconciler's viewpoint: redelivery
/// cannot conjure a row that was never created, and a duplicate create
/// must not touch identity fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// An account with this procurement id already exists.
    AccountExists,
    /// The referenced account does not exist locally.
    AccountMissing,
    /// The referenced subscription does not exist locally.
    SubscriptionMissing,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::AccountExists => "account already exists",
            Self::AccountMissing => "account not found",
            Self::SubscriptionMissing => "subscription not found",
        };
        f.write_str(s)
    }
}

/// Applies lifecycle transitions to the store.
///
/// Holds the process-scoped store pool and gateway handle; both are passed
/// in at construction so tests can substitute fakes for the gateway and
/// point the pool at a test database.
#[derive(Clone)]
pub struct Reconciler {
    pool: PgPool,
    gateway: Arc<dyn ProcurementGateway>,
}

impl Reconciler {
    /// Create a reconciler over a store pool and a procurement gateway.
    pub fn new(pool: PgPool, gateway: Arc<dyn ProcurementGateway>) -> Self {
        Self { pool, gateway }
    }

    pub(crate) fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub(crate) fn gateway(&self) -> &dyn ProcurementGateway {
        self.gateway.as_ref()
    }

    /// Apply one lifecycle event.
    ///
    /// `Err` means a transient store/gateway failure: the caller must leave
    /// the message unacknowledged. `Ok`, whether applied or skipped, means
    /// the event is done and must be acknowledged.
    #[instrument(skip(self), fields(event_kind = event.kind()))]
    pub async fn apply(&self, event: LifecycleEvent) -> Result<Outcome, ReconcileError> {
        match event {
            LifecycleEvent::AccountCreated {
                procurement_account_id,
            } => self.handle_account_created(&procurement_account_id).await,
            LifecycleEvent::AccountDeleted {
                procurement_account_id,
            } => self.handle_account_deleted(&procurement_account_id).await,
            LifecycleEvent::EntitlementCreationRequested { entitlement_id } => {
                self.handle_entitlement_creation_requested(&entitlement_id)
                    .await
            }
            LifecycleEvent::EntitlementActive { entitlement_id } => {
                self.handle_entitlement_active(&entitlement_id).await
            }
            LifecycleEvent::EntitlementCancelled { entitlement_id } => {
                self.handle_entitlement_cancelled(&entitlement_id).await
            }
            LifecycleEvent::EntitlementDeleted { entitlement_id } => {
                self.handle_entitlement_deleted(&entitlement_id).await
            }
            LifecycleEvent::EntitlementPlanChangeRequested {
                entitlement_id,
                new_plan,
            } => {
                self.handle_entitlement_plan_change_requested(&entitlement_id, &new_plan)
                    .await
            }
            LifecycleEvent::EntitlementPlanChanged { entitlement_id } => {
                self.handle_entitlement_plan_changed(&entitlement_id).await
            }
        }
    }
}

#[async_trait]
impl LifecycleHandler for Reconciler {
    async fn handle(
        &self,
        event: LifecycleEvent,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let kind = event.kind();
        match self.apply(event).await {
            Ok(Outcome::Applied) => Ok(()),
            Ok(Outcome::Skipped(reason)) => {
                warn!(event_kind = kind, %reason, "Event skipped");
                Ok(())
            }
            Err(e) => Err(Box::new(e)),
        }
    }
}
