//! Wire types for the procurement approval surface.

use chrono::{DateTime, NaiveDateTime, Timelike, Utc};
use portside_core::{last_segment, ProcurementAccountId};
use serde::{Deserialize, Serialize};

/// Entitlement state reported by the procurement service when activation
/// has been requested and is awaiting vendor approval.
pub const STATE_ACTIVATION_REQUESTED: &str = "ENTITLEMENT_ACTIVATION_REQUESTED";

/// Entitlement details as returned by the procurement service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitlementDetails {
    /// Resource name of the owning account,
    /// e.g. `providers/{provider}/accounts/{account_id}`.
    pub account: String,

    /// Purchased product.
    #[serde(default)]
    pub product: Option<String>,

    /// Purchased plan.
    #[serde(default)]
    pub plan: Option<String>,

    /// Identifier used for usage reporting ("consumer id" locally).
    #[serde(default)]
    pub usage_reporting_id: Option<String>,

    /// Creation instant, RFC 3339 with a `Z` suffix.
    #[serde(default)]
    pub create_time: Option<DateTime<Utc>>,

    /// Procurement-side entitlement state.
    #[serde(default)]
    pub state: Option<String>,
}

impl EntitlementDetails {
    /// The bare procurement account id from the `account` resource name.
    ///
    /// `None` when the resource name is empty or malformed.
    #[must_use]
    pub fn procurement_account_id(&self) -> Option<ProcurementAccountId> {
        last_segment(&self.account).map(ProcurementAccountId::new)
    }

    /// The creation instant normalized for storage: UTC wall clock,
    /// truncated to whole seconds.
    #[must_use]
    pub fn start_time_naive(&self) -> Option<NaiveDateTime> {
        self.create_time
            .and_then(|t| t.naive_utc().with_nanosecond(0))
    }

    /// Whether the entitlement is awaiting vendor activation approval.
    #[must_use]
    pub fn is_activation_requested(&self) -> bool {
        self.state.as_deref() == Some(STATE_ACTIVATION_REQUESTED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details(json: &str) -> EntitlementDetails {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn parses_camel_case_wire_shape() {
        let d = details(
            r#"{
                "account": "providers/p/accounts/acc-1",
                "product": "prod-x",
                "plan": "plan-a",
                "usageReportingId": "cons-1",
                "createTime": "2024-01-01T00:00:00Z",
                "state": "ENTITLEMENT_ACTIVATION_REQUESTED"
            }"#,
        );

        assert_eq!(
            d.procurement_account_id().unwrap(),
            ProcurementAccountId::new("acc-1")
        );
        assert_eq!(d.product.as_deref(), Some("prod-x"));
        assert_eq!(d.usage_reporting_id.as_deref(), Some("cons-1"));
        assert!(d.is_activation_requested());
    }

    #[test]
    fn start_time_round_trips_at_second_precision() {
        let d = details(r#"{"account":"a","createTime":"2024-06-01T12:00:00.654321Z"}"#);
        let stored = d.start_time_naive().unwrap();
        assert_eq!(stored.to_string(), "2024-06-01 12:00:00");
    }

    #[test]
    fn absent_fields_default_to_none() {
        let d = details(r#"{"account":"providers/p/accounts/acc-2"}"#);
        assert!(d.plan.is_none());
        assert!(d.start_time_naive().is_none());
        assert!(!d.is_activation_requested());
    }
}
