//! Subscription (entitlement) lifecycle handlers.

use crate::error::ReconcileError;
use crate::{Outcome, Reconciler, SkipReason};
use portside_core::EntitlementId;
use portside_db::{Account, AccountStatus, Subscription, SubscriptionStatus, UpsertSubscription};
use tracing::{info, warn};

impl Reconciler {
    /// A customer requested a new entitlement.
    ///
    /// Ground truth comes from the procurement service, not the event
    /// payload: the details are fetched first, then applied in one
    /// transaction. When the owning account is not yet known locally the
    /// subscription is stored unattached; a replay after the account
    /// arrives re-links it.
    pub(crate) async fn handle_entitlement_creation_requested(
        &self,
        entitlement_id: &EntitlementId,
    ) -> Result<Outcome, ReconcileError> {
        let details = self.gateway().get_entitlement_details(entitlement_id).await?;

        let account_ref = details.procurement_account_id();
        if account_ref.is_none() {
            warn!(
                entitlement_id = %entitlement_id,
                account = %details.account,
                "Entitlement details carry no usable account reference; storing unattached"
            );
        }

        let start_time = details.start_time_naive();

        let mut tx = self.pool().begin().await?;

        let account = match &account_ref {
            Some(account_ref) => {
                Account::find_by_procurement_id(&mut *tx, account_ref.as_str()).await?
            }
            None => None,
        };

        let subscription = Subscription::upsert(
            &mut *tx,
            &UpsertSubscription {
                subscription_id: entitlement_id.to_string(),
                account_id: account.as_ref().map(|a| a.id),
                product_id: details.product.clone(),
                plan_id: details.plan.clone(),
                consumer_id: details.usage_reporting_id.clone(),
                start_time,
            },
        )
        .await?;

        // The account mirrors the latest entitlement's plan details.
        if let Some(account) = &account {
            Account::update_plan_details(
                &mut *tx,
                account.id,
                details.plan.as_deref(),
                start_time,
                details.usage_reporting_id.as_deref(),
            )
            .await?;
        }

        tx.commit().await?;

        info!(
            entitlement_id = %entitlement_id,
            attached = subscription.account_id.is_some(),
            "Entitlement creation recorded"
        );
        Ok(Outcome::Applied)
    }

    /// An entitlement became active on the procurement side.
    pub(crate) async fn handle_entitlement_active(
        &self,
        entitlement_id: &EntitlementId,
    ) -> Result<Outcome, ReconcileError> {
        let mut tx = self.pool().begin().await?;
        let updated = Subscription::update_status(
            &mut *tx,
            entitlement_id.as_str(),
            SubscriptionStatus::Active,
        )
        .await?;
        tx.commit().await?;

        match updated {
            Some(_) => {
                info!(entitlement_id = %entitlement_id, "Entitlement activated");
                Ok(Outcome::Applied)
            }
            None => Ok(Outcome::Skipped(SkipReason::SubscriptionMissing)),
        }
    }

    /// An entitlement was cancelled by the customer.
    ///
    /// Cancellation is not terminal: the row stays, marked `canceled`, and
    /// the owning account is flagged so the vendor can follow up.
    pub(crate) async fn handle_entitlement_cancelled(
        &self,
        entitlement_id: &EntitlementId,
    ) -> Result<Outcome, ReconcileError> {
        let mut tx = self.pool().begin().await?;

        let Some(subscription) = Subscription::update_status(
            &mut *tx,
            entitlement_id.as_str(),
            SubscriptionStatus::Canceled,
        )
        .await?
        else {
            return Ok(Outcome::Skipped(SkipReason::SubscriptionMissing));
        };

        if let Some(account_id) = subscription.account_id {
            let updated =
                Account::update_status(&mut *tx, account_id, AccountStatus::EntitlementCanceled)
                    .await?;
            if updated.is_none() {
                warn!(
                    entitlement_id = %entitlement_id,
                    %account_id,
                    "Owning account row missing while cancelling entitlement"
                );
            }
        }

        tx.commit().await?;

        info!(entitlement_id = %entitlement_id, "Entitlement cancelled");
        Ok(Outcome::Applied)
    }

    /// An entitlement was deleted. Terminal: the row is removed and later
    /// events for the id surface as skipped anomalies.
    pub(crate) async fn handle_entitlement_deleted(
        &self,
        entitlement_id: &EntitlementId,
    ) -> Result<Outcome, ReconcileError> {
        let mut tx = self.pool().begin().await?;
        let removed =
            Subscription::delete_by_external_id(&mut *tx, entitlement_id.as_str()).await?;
        tx.commit().await?;

        if removed == 0 {
            return Ok(Outcome::Skipped(SkipReason::SubscriptionMissing));
        }

        info!(entitlement_id = %entitlement_id, "Entitlement deleted");
        Ok(Outcome::Applied)
    }

    /// A customer requested a plan change.
    ///
    /// The local rows are committed first; the gateway approval follows.
    /// If the approval call fails the message is redelivered and the local
    /// update replays idempotently before the approval is retried.
    pub(crate) async fn handle_entitlement_plan_change_requested(
        &self,
        entitlement_id: &EntitlementId,
        new_plan: &str,
    ) -> Result<Outcome, ReconcileError> {
        let mut tx = self.pool().begin().await?;

        let Some(subscription) =
            Subscription::set_plan_change(&mut *tx, entitlement_id.as_str(), new_plan).await?
        else {
            return Ok(Outcome::Skipped(SkipReason::SubscriptionMissing));
        };

        if let Some(account_id) = subscription.account_id {
            Account::update_plan_id(&mut *tx, account_id, new_plan).await?;
        }

        tx.commit().await?;

        self.gateway()
            .approve_plan_change(entitlement_id, new_plan)
            .await?;

        info!(
            entitlement_id = %entitlement_id,
            new_plan,
            "Entitlement plan change requested and approved"
        );
        Ok(Outcome::Applied)
    }

    /// A previously requested plan change took effect.
    pub(crate) async fn handle_entitlement_plan_changed(
        &self,
        entitlement_id: &EntitlementId,
    ) -> Result<Outcome, ReconcileError> {
        let mut tx = self.pool().begin().await?;
        let updated = Subscription::update_status(
            &mut *tx,
            entitlement_id.as_str(),
            SubscriptionStatus::Active,
        )
        .await?;
        tx.commit().await?;

        match updated {
            Some(_) => {
                info!(entitlement_id = %entitlement_id, "Entitlement plan change applied");
                Ok(Outcome::Applied)
            }
            None => Ok(Outcome::Skipped(SkipReason::SubscriptionMissing)),
        }
    }
}
