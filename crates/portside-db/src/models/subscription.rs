//! Subscription (entitlement) entity model.
//!
//! A subscription can legally exist with `account_id = NULL` when its
//! creation event arrives before the owning account is known locally. The
//! creation-requested upsert re-links such rows once the account appears.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Lifecycle state of a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "subscription_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    /// Awaiting approval.
    Pending,
    /// An update to the grant is awaiting approval.
    PendingUpdate,
    /// Approved and serving.
    Active,
    /// A plan change was requested and forwarded for approval.
    PlanChangeRequested,
    /// Cancelled by the customer; may be recreated later.
    Canceled,
}

impl SubscriptionStatus {
    /// Stable string form, matching the Postgres enum labels.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::PendingUpdate => "pending_update",
            Self::Active => "active",
            Self::PlanChangeRequested => "plan_change_requested",
            Self::Canceled => "canceled",
        }
    }
}

/// A product+plan grant under an account.
#[derive(Debug, Clone, FromRow)]
pub struct Subscription {
    /// Local row identity.
    pub id: Uuid,

    /// External entitlement id assigned by the procurement service.
    pub subscription_id: String,

    /// Owning account row, when resolved. `None` while unattached.
    pub account_id: Option<Uuid>,

    pub product_id: Option<String>,
    pub plan_id: Option<String>,
    pub consumer_id: Option<String>,

    /// Timezone-naive UTC wall clock; second precision only.
    pub start_time: Option<NaiveDateTime>,

    /// Lifecycle state.
    pub status: SubscriptionStatus,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Descriptive fields applied by the creation-requested upsert.
#[derive(Debug, Clone)]
pub struct UpsertSubscription {
    pub subscription_id: String,
    /// Owning account row id, when the account is already known locally.
    pub account_id: Option<Uuid>,
    pub product_id: Option<String>,
    pub plan_id: Option<String>,
    pub consumer_id: Option<String>,
    pub start_time: Option<NaiveDateTime>,
}

impl Subscription {
    /// Find a subscription by its external entitlement id.
    pub async fn find_by_external_id<'e, E>(
        executor: E,
        subscription_id: &str,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        sqlx::query_as("SELECT * FROM subscriptions WHERE subscription_id = $1")
            .bind(subscription_id)
            .fetch_optional(executor)
            .await
    }

    /// Insert a subscription, or overwrite the descriptive fields of an
    /// existing row and reset it to `pending`.
    ///
    /// `account_id` only ever strengthens the relation: a `NULL` incoming
    /// value never detaches a previously attached row, while a resolved
    /// value re-links a row that was stored unattached.
    pub async fn upsert<'e, E>(
        executor: E,
        fields: &UpsertSubscription,
    ) -> Result<Self, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        sqlx::query_as(
            r"
            INSERT INTO subscriptions
                (subscription_id, account_id, product_id, plan_id, consumer_id, start_time, status)
            VALUES ($1, $2, $3, $4, $5, $6, 'pending')
            ON CONFLICT (subscription_id) DO UPDATE SET
                account_id = COALESCE(EXCLUDED.account_id, subscriptions.account_id),
                product_id = EXCLUDED.product_id,
                plan_id = EXCLUDED.plan_id,
                consumer_id = EXCLUDED.consumer_id,
                start_time = EXCLUDED.start_time,
                status = 'pending',
                updated_at = now()
            RETURNING *
            ",
        )
        .bind(&fields.subscription_id)
        .bind(fields.account_id)
        .bind(&fields.product_id)
        .bind(&fields.plan_id)
        .bind(&fields.consumer_id)
        .bind(fields.start_time)
        .fetch_one(executor)
        .await
    }

    /// Set the lifecycle status by external id.
    pub async fn update_status<'e, E>(
        executor: E,
        subscription_id: &str,
        status: SubscriptionStatus,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        sqlx::query_as(
            r"
            UPDATE subscriptions SET status = $2, updated_at = now()
            WHERE subscription_id = $1
            RETURNING *
            ",
        )
        .bind(subscription_id)
        .bind(status)
        .fetch_optional(executor)
        .await
    }

    /// Record a requested plan change: new plan plus the matching status.
    pub async fn set_plan_change<'e, E>(
        executor: E,
        subscription_id: &str,
        new_plan: &str,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        sqlx::query_as(
            r"
            UPDATE subscriptions SET
                plan_id = $2,
                status = 'plan_change_requested',
                updated_at = now()
            WHERE subscription_id = $1
            RETURNING *
            ",
        )
        .bind(subscription_id)
        .bind(new_plan)
        .fetch_optional(executor)
        .await
    }

    /// List the pending subscriptions owned by an account, oldest first.
    ///
    /// Feeds the cascade approval that follows account activation.
    pub async fn list_pending_for_account<'e, E>(
        executor: E,
        account_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        sqlx::query_as(
            r"
            SELECT * FROM subscriptions
            WHERE account_id = $1 AND status = 'pending'
            ORDER BY created_at
            ",
        )
        .bind(account_id)
        .fetch_all(executor)
        .await
    }

    /// Delete a subscription by its external id.
    pub async fn delete_by_external_id<'e, E>(
        executor: E,
        subscription_id: &str,
    ) -> Result<u64, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM subscriptions WHERE subscription_id = $1")
            .bind(subscription_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    /// Delete every subscription owned by an account.
    ///
    /// Runs before the account row itself is removed (children first).
    pub async fn delete_for_account<'e, E>(
        executor: E,
        account_id: Uuid,
    ) -> Result<u64, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM subscriptions WHERE account_id = $1")
            .bind(account_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    /// List all subscriptions, oldest first.
    pub async fn list_all<'e, E>(executor: E) -> Result<Vec<Self>, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        sqlx::query_as("SELECT * FROM subscriptions ORDER BY created_at")
            .fetch_all(executor)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_labels_match_postgres_enum() {
        assert_eq!(SubscriptionStatus::Pending.as_str(), "pending");
        assert_eq!(SubscriptionStatus::PendingUpdate.as_str(), "pending_update");
        assert_eq!(
            SubscriptionStatus::PlanChangeRequested.as_str(),
            "plan_change_requested"
        );
        assert_eq!(SubscriptionStatus::Canceled.as_str(), "canceled");
    }

    #[test]
    fn status_serde_uses_snake_case() {
        let json = serde_json::to_string(&SubscriptionStatus::PlanChangeRequested).unwrap();
        assert_eq!(json, "\"plan_change_requested\"");
    }
}
