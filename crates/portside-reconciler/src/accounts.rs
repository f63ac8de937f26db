//! Account lifecycle handlers.

use crate::error::ReconcileError;
use crate::{Outcome, Reconciler, SkipReason};
use portside_core::{InternalAccountId, ProcurementAccountId};
use portside_db::{Account, Subscription};
use tracing::info;

impl Reconciler {
    /// An account was created on the procurement side.
    ///
    /// Idempotent: the internal account id is minted only when the row is
    /// first inserted; a replayed creation event leaves identity fields
    /// untouched.
    pub(crate) async fn handle_account_created(
        &self,
        procurement_account_id: &ProcurementAccountId,
    ) -> Result<Outcome, ReconcileError> {
        let internal_id = InternalAccountId::generate();

        let mut tx = self.pool().begin().await?;
        let inserted = Account::insert_pending_if_absent(
            &mut *tx,
            procurement_account_id.as_str(),
            *internal_id.as_uuid(),
        )
        .await?;
        tx.commit().await?;

        match inserted {
            Some(account) => {
                info!(
                    procurement_account_id = %procurement_account_id,
                    internal_account_id = %account.internal_account_id,
                    "Account created"
                );
                Ok(Outcome::Applied)
            }
            None => {
                info!(
                    procurement_account_id = %procurement_account_id,
                    "Account already exists"
                );
                Ok(Outcome::Skipped(SkipReason::AccountExists))
            }
        }
    }

    /// An account was deleted on the procurement side.
    ///
    /// Owned subscriptions are removed before the account row, in one
    /// transaction, so a concurrent reader never sees an orphaned
    /// subscription referencing a deleted account.
    pub(crate) async fn handle_account_deleted(
        &self,
        procurement_account_id: &ProcurementAccountId,
    ) -> Result<Outcome, ReconcileError> {
        let mut tx = self.pool().begin().await?;

        let Some(account) =
            Account::find_by_procurement_id(&mut *tx, procurement_account_id.as_str()).await?
        else {
            return Ok(Outcome::Skipped(SkipReason::AccountMissing));
        };

        let removed = Subscription::delete_for_account(&mut *tx, account.id).await?;
        Account::delete(&mut *tx, account.id).await?;
        tx.commit().await?;

        info!(
            procurement_account_id = %procurement_account_id,
            subscriptions_removed = removed,
            "Account deleted"
        );
        Ok(Outcome::Applied)
    }
}
