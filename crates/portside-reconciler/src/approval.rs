//! Synchronous approval operations.
//!
//! These are the operator/signup entry points. They run the same
//! transitions as the event handlers against the same store, so an
//! approval triggered over HTTP and one replayed from the feed converge
//! on identical end state.

use crate::error::ApprovalError;
use crate::Reconciler;
use portside_core::{EntitlementId, InternalAccountId, ProcurementAccountId};
use portside_db::{Account, AccountStatus, Subscription, SubscriptionStatus};
use tracing::{error, info, instrument};

/// What happened to each pending subscription during a cascade approval.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CascadeSummary {
    /// Subscriptions approved and marked active.
    pub approved: usize,
    /// Subscriptions whose gateway approval failed; left pending.
    pub failed: usize,
}

impl Reconciler {
    /// Approve a pending account and cascade-approve its pending
    /// subscriptions.
    ///
    /// The `active` write is contingent on the remote approval, so this is
    /// the one transition that holds its transaction across a gateway
    /// call: a gateway failure rolls the account back to exactly its
    /// prior state. The cascade runs after the account transition has
    /// committed and its failures are isolated per subscription.
    #[instrument(skip(self), fields(procurement_account_id = %procurement_account_id))]
    pub async fn approve_account(
        &self,
        procurement_account_id: &ProcurementAccountId,
    ) -> Result<(Account, CascadeSummary), ApprovalError> {
        let mut tx = self.pool().begin().await?;

        let Some(account) =
            Account::find_by_procurement_id(&mut *tx, procurement_account_id.as_str()).await?
        else {
            return Err(ApprovalError::AccountNotFound(
                procurement_account_id.to_string(),
            ));
        };

        if account.status != AccountStatus::Pending {
            return Err(ApprovalError::AccountNotPending {
                procurement_account_id: procurement_account_id.to_string(),
                status: account.status.as_str(),
            });
        }

        self.gateway().approve_account(procurement_account_id).await?;

        let account = Account::update_status(&mut *tx, account.id, AccountStatus::Active)
            .await?
            .ok_or_else(|| ApprovalError::AccountNotFound(procurement_account_id.to_string()))?;
        tx.commit().await?;

        info!(procurement_account_id = %procurement_account_id, "Account approved");

        let summary = self.cascade_approve_pending(&account).await?;
        Ok((account, summary))
    }

    /// Approve every pending subscription owned by a newly active account.
    ///
    /// Each subscription is approved independently: one gateway failure is
    /// logged and leaves that subscription pending, without blocking its
    /// siblings or unwinding the already committed account transition.
    pub(crate) async fn cascade_approve_pending(
        &self,
        account: &Account,
    ) -> Result<CascadeSummary, ApprovalError> {
        let pending = Subscription::list_pending_for_account(self.pool(), account.id).await?;

        let mut summary = CascadeSummary::default();
        for subscription in pending {
            let entitlement_id = EntitlementId::new(subscription.subscription_id.clone());
            match self.gateway().approve_entitlement(&entitlement_id).await {
                Ok(()) => {
                    Subscription::update_status(
                        self.pool(),
                        entitlement_id.as_str(),
                        SubscriptionStatus::Active,
                    )
                    .await?;
                    info!(entitlement_id = %entitlement_id, "Entitlement approved");
                    summary.approved += 1;
                }
                Err(e) => {
                    error!(
                        entitlement_id = %entitlement_id,
                        error = %e,
                        "Entitlement approval failed; left pending"
                    );
                    summary.failed += 1;
                }
            }
        }

        Ok(summary)
    }

    /// Approve a single subscription after checking the procurement
    /// service still expects an activation approval.
    #[instrument(skip(self), fields(entitlement_id = %entitlement_id))]
    pub async fn approve_subscription(
        &self,
        entitlement_id: &EntitlementId,
    ) -> Result<Subscription, ApprovalError> {
        let existing =
            Subscription::find_by_external_id(self.pool(), entitlement_id.as_str()).await?;
        if existing.is_none() {
            return Err(ApprovalError::SubscriptionNotFound(
                entitlement_id.to_string(),
            ));
        }

        let details = self.gateway().get_entitlement_details(entitlement_id).await?;
        if !details.is_activation_requested() {
            return Err(ApprovalError::NotAwaitingActivation {
                entitlement_id: entitlement_id.to_string(),
                state: details.state.unwrap_or_else(|| "<unknown>".to_string()),
            });
        }

        // Refresh the owning account's denormalized plan details from
        // ground truth before approving.
        if let Some(account_ref) = details.procurement_account_id() {
            if let Some(account) =
                Account::find_by_procurement_id(self.pool(), account_ref.as_str()).await?
            {
                Account::update_plan_details(
                    self.pool(),
                    account.id,
                    details.plan.as_deref(),
                    details.start_time_naive(),
                    details.usage_reporting_id.as_deref(),
                )
                .await?;
            }
        }

        self.gateway().approve_entitlement(entitlement_id).await?;

        let subscription = Subscription::update_status(
            self.pool(),
            entitlement_id.as_str(),
            SubscriptionStatus::Active,
        )
        .await?
        .ok_or_else(|| ApprovalError::SubscriptionNotFound(entitlement_id.to_string()))?;

        info!(entitlement_id = %entitlement_id, "Subscription approved");
        Ok(subscription)
    }

    /// Repair path for local state that has fallen behind the procurement
    /// service: rebuild the account from remote ground truth, approve it,
    /// then approve the entitlement.
    ///
    /// Used when the account creation event was never delivered. The
    /// account is created pending (with a fresh internal id) if absent,
    /// or refreshed and reset to pending if present; either way it ends
    /// active once the remote approval succeeds.
    #[instrument(skip(self), fields(entitlement_id = %entitlement_id))]
    pub async fn recover_and_approve_account(
        &self,
        entitlement_id: &EntitlementId,
    ) -> Result<Account, ApprovalError> {
        let details = self.gateway().get_entitlement_details(entitlement_id).await?;

        let Some(account_ref) = details.procurement_account_id() else {
            return Err(ApprovalError::MissingAccountReference {
                entitlement_id: entitlement_id.to_string(),
            });
        };

        let internal_id = InternalAccountId::generate();
        let account = Account::upsert_from_details(
            self.pool(),
            account_ref.as_str(),
            *internal_id.as_uuid(),
            details.plan.as_deref(),
            details.start_time_naive(),
            details.usage_reporting_id.as_deref(),
        )
        .await?;

        self.gateway().approve_account(&account_ref).await?;

        let account = Account::update_status(self.pool(), account.id, AccountStatus::Active)
            .await?
            .ok_or_else(|| ApprovalError::AccountNotFound(account_ref.to_string()))?;

        self.gateway().approve_entitlement(entitlement_id).await?;

        info!(
            procurement_account_id = %account_ref,
            entitlement_id = %entitlement_id,
            "Account recovered and approved"
        );
        Ok(account)
    }
}
