//! Gateway trait for the procurement approval surface.

use crate::error::ProcurementError;
use crate::types::EntitlementDetails;
use async_trait::async_trait;
use portside_core::{EntitlementId, ProcurementAccountId};

/// Approval operations against the procurement service.
///
/// All four calls are synchronous remote operations that may fail; callers
/// decide what a failure means for their own transaction. Implemented by
/// [`crate::HttpProcurementClient`] in production and by fakes in tests.
#[async_trait]
pub trait ProcurementGateway: Send + Sync {
    /// Approve a customer account signup.
    async fn approve_account(
        &self,
        account_id: &ProcurementAccountId,
    ) -> Result<(), ProcurementError>;

    /// Approve an entitlement activation.
    async fn approve_entitlement(
        &self,
        entitlement_id: &EntitlementId,
    ) -> Result<(), ProcurementError>;

    /// Approve a pending plan change on an entitlement.
    async fn approve_plan_change(
        &self,
        entitlement_id: &EntitlementId,
        new_plan: &str,
    ) -> Result<(), ProcurementError>;

    /// Fetch the current details of an entitlement.
    async fn get_entitlement_details(
        &self,
        entitlement_id: &EntitlementId,
    ) -> Result<EntitlementDetails, ProcurementError>;
}
