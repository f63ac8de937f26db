//! Account entity model.
//!
//! Local record of a procurement-side customer account. The external
//! `procurement_account_id` is the lookup key; `internal_account_id` is the
//! identity handed to downstream vendor systems and is assigned exactly once.

use chrono::{DateTime, NaiveDateTime, Utc};
use portside_core::InternalAccountId;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Lifecycle state of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "account_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    /// Created locally, awaiting approval against the procurement service.
    Pending,
    /// Approved and serving.
    Active,
    /// At least one owned entitlement was cancelled.
    EntitlementCanceled,
    /// Marked for removal; owned subscriptions are deleted first.
    DeletedPendingRemoval,
}

impl AccountStatus {
    /// Stable string form, matching the Postgres enum labels.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::EntitlementCanceled => "entitlement_canceled",
            Self::DeletedPendingRemoval => "deleted_pending_removal",
        }
    }
}

/// A marketplace customer account.
#[derive(Debug, Clone, FromRow)]
pub struct Account {
    /// Local row identity; subscriptions reference this.
    pub id: Uuid,

    /// External identity assigned by the procurement service.
    pub procurement_account_id: String,

    /// Locally generated identity, assigned once and immutable.
    pub internal_account_id: Uuid,

    /// Lifecycle state.
    pub status: AccountStatus,

    /// Plan of the most recently reconciled entitlement.
    pub plan_id: Option<String>,

    /// Usage-reporting consumer of the most recently reconciled entitlement.
    pub consumer_id: Option<String>,

    /// Start instant of the most recently reconciled entitlement, stored as
    /// a timezone-naive UTC wall clock.
    pub start_time: Option<NaiveDateTime>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Get the internal account id as its typed form.
    #[must_use]
    pub fn internal_account_id(&self) -> InternalAccountId {
        InternalAccountId::from_uuid(self.internal_account_id)
    }

    /// Find an account by its external procurement id.
    pub async fn find_by_procurement_id<'e, E>(
        executor: E,
        procurement_account_id: &str,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        sqlx::query_as("SELECT * FROM accounts WHERE procurement_account_id = $1")
            .bind(procurement_account_id)
            .fetch_optional(executor)
            .await
    }

    /// Find an account by its local row id.
    pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<Self>, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        sqlx::query_as("SELECT * FROM accounts WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Insert a pending account unless one already exists for this
    /// procurement id.
    ///
    /// Returns `None` when the row already existed, leaving its identity
    /// fields untouched. Safe under concurrent delivery of the same
    /// creation event: the unique constraint arbitrates and the loser sees
    /// `None`.
    pub async fn insert_pending_if_absent<'e, E>(
        executor: E,
        procurement_account_id: &str,
        internal_account_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        sqlx::query_as(
            r"
            INSERT INTO accounts (procurement_account_id, internal_account_id, status)
            VALUES ($1, $2, 'pending')
            ON CONFLICT (procurement_account_id) DO NOTHING
            RETURNING *
            ",
        )
        .bind(procurement_account_id)
        .bind(internal_account_id)
        .fetch_optional(executor)
        .await
    }

    /// Create the account from procurement ground truth, or refresh an
    /// existing one back to `pending` with the latest entitlement details.
    ///
    /// Used by the recovery path when the creation event was never
    /// delivered. `internal_account_id` is only consumed on insert; an
    /// existing row keeps its identity.
    pub async fn upsert_from_details<'e, E>(
        executor: E,
        procurement_account_id: &str,
        internal_account_id: Uuid,
        plan_id: Option<&str>,
        start_time: Option<NaiveDateTime>,
        consumer_id: Option<&str>,
    ) -> Result<Self, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        sqlx::query_as(
            r"
            INSERT INTO accounts
                (procurement_account_id, internal_account_id, status, plan_id, start_time, consumer_id)
            VALUES ($1, $2, 'pending', $3, $4, $5)
            ON CONFLICT (procurement_account_id) DO UPDATE SET
                status = 'pending',
                plan_id = EXCLUDED.plan_id,
                start_time = EXCLUDED.start_time,
                consumer_id = EXCLUDED.consumer_id,
                updated_at = now()
            RETURNING *
            ",
        )
        .bind(procurement_account_id)
        .bind(internal_account_id)
        .bind(plan_id)
        .bind(start_time)
        .bind(consumer_id)
        .fetch_one(executor)
        .await
    }

    /// Set the lifecycle status of an account.
    pub async fn update_status<'e, E>(
        executor: E,
        id: Uuid,
        status: AccountStatus,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        sqlx::query_as(
            r"
            UPDATE accounts SET status = $2, updated_at = now()
            WHERE id = $1
            RETURNING *
            ",
        )
        .bind(id)
        .bind(status)
        .fetch_optional(executor)
        .await
    }

    /// Refresh the denormalized plan details from entitlement ground truth.
    pub async fn update_plan_details<'e, E>(
        executor: E,
        id: Uuid,
        plan_id: Option<&str>,
        start_time: Option<NaiveDateTime>,
        consumer_id: Option<&str>,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        sqlx::query_as(
            r"
            UPDATE accounts SET
                plan_id = $2,
                start_time = $3,
                consumer_id = $4,
                updated_at = now()
            WHERE id = $1
            RETURNING *
            ",
        )
        .bind(id)
        .bind(plan_id)
        .bind(start_time)
        .bind(consumer_id)
        .fetch_optional(executor)
        .await
    }

    /// Set only the denormalized plan id, leaving start time and consumer
    /// untouched. Used when a plan change is requested.
    pub async fn update_plan_id<'e, E>(
        executor: E,
        id: Uuid,
        plan_id: &str,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        sqlx::query_as(
            r"
            UPDATE accounts SET plan_id = $2, updated_at = now()
            WHERE id = $1
            RETURNING *
            ",
        )
        .bind(id)
        .bind(plan_id)
        .fetch_optional(executor)
        .await
    }

    /// Delete an account row. Owned subscriptions must be removed first.
    pub async fn delete<'e, E>(executor: E, id: Uuid) -> Result<u64, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    /// List all accounts, oldest first.
    pub async fn list_all<'e, E>(executor: E) -> Result<Vec<Self>, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        sqlx::query_as("SELECT * FROM accounts ORDER BY created_at")
            .fetch_all(executor)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_labels_match_postgres_enum() {
        assert_eq!(AccountStatus::Pending.as_str(), "pending");
        assert_eq!(
            AccountStatus::EntitlementCanceled.as_str(),
            "entitlement_canceled"
        );
        assert_eq!(
            AccountStatus::DeletedPendingRemoval.as_str(),
            "deleted_pending_removal"
        );
    }

    #[test]
    fn status_serde_uses_snake_case() {
        let json = serde_json::to_string(&AccountStatus::EntitlementCanceled).unwrap();
        assert_eq!(json, "\"entitlement_canceled\"");
    }
}
