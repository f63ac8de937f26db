//! Procurement HTTP client (reqwest-based).
//!
//! Talks to the procurement service's REST surface. Accounts and
//! entitlements are addressed by resource name under a provider, and
//! approvals are custom verbs on those resources
//! (`.../accounts/{id}:approve`).

use crate::error::ProcurementError;
use crate::traits::ProcurementGateway;
use crate::types::EntitlementDetails;
use async_trait::async_trait;
use portside_core::{EntitlementId, ProcurementAccountId};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, instrument};

/// Default public endpoint of the procurement service.
pub const DEFAULT_BASE_URL: &str = "https://cloudcommerceprocurement.googleapis.com/v1";

/// HTTP implementation of [`ProcurementGateway`].
#[derive(Debug, Clone)]
pub struct HttpProcurementClient {
    /// Base URL of the procurement API.
    base_url: String,
    /// Provider under which accounts and entitlements live.
    provider_id: String,
    /// API key appended to every request.
    api_key: String,
    /// Underlying HTTP client.
    http_client: Client,
}

impl HttpProcurementClient {
    /// Create a new client.
    pub fn new(
        base_url: impl Into<String>,
        provider_id: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ProcurementError> {
        let http_client = Client::builder()
            .timeout(timeout)
            .user_agent("portside/0.1")
            .build()
            .map_err(|e| {
                ProcurementError::InvalidConfig(format!("Failed to build HTTP client: {e}"))
            })?;

        Ok(Self::with_http_client(
            base_url,
            provider_id,
            api_key,
            http_client,
        ))
    }

    /// Create a client with a pre-built `reqwest::Client` (for testing).
    #[must_use]
    pub fn with_http_client(
        base_url: impl Into<String>,
        provider_id: impl Into<String>,
        api_key: impl Into<String>,
        http_client: Client,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            provider_id: provider_id.into(),
            api_key: api_key.into(),
            http_client,
        }
    }

    fn account_url(&self, account_id: &ProcurementAccountId, verb: &str) -> String {
        format!(
            "{}/providers/{}/accounts/{}{verb}",
            self.base_url, self.provider_id, account_id
        )
    }

    fn entitlement_url(&self, entitlement_id: &EntitlementId, verb: &str) -> String {
        format!(
            "{}/providers/{}/entitlements/{}{verb}",
            self.base_url, self.provider_id, entitlement_id
        )
    }

    /// POST a custom-verb request whose response body is irrelevant.
    async fn post_verb(
        &self,
        operation: &'static str,
        url: String,
        body: serde_json::Value,
    ) -> Result<(), ProcurementError> {
        debug!(operation, %url, "Calling procurement service");

        let response = self
            .http_client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        Self::check_status(operation, response).await?;
        Ok(())
    }

    /// GET a resource and deserialize the response body.
    async fn get_json<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        url: String,
    ) -> Result<T, ProcurementError> {
        debug!(operation, %url, "Calling procurement service");

        let response = self
            .http_client
            .get(&url)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await?;

        let response = Self::check_status(operation, response).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ProcurementError::MalformedResponse {
                operation,
                cause: e.to_string(),
            })
    }

    async fn check_status(
        operation: &'static str,
        response: reqwest::Response,
    ) -> Result<reqwest::Response, ProcurementError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| String::from("<unreadable body>"));
        Err(ProcurementError::Status {
            operation,
            status,
            body,
        })
    }
}

#[async_trait]
impl ProcurementGateway for HttpProcurementClient {
    #[instrument(skip(self), fields(account_id = %account_id))]
    async fn approve_account(
        &self,
        account_id: &ProcurementAccountId,
    ) -> Result<(), ProcurementError> {
        self.post_verb(
            "accounts.approve",
            self.account_url(account_id, ":approve"),
            json!({ "approvalName": "signup" }),
        )
        .await
    }

    #[instrument(skip(self), fields(entitlement_id = %entitlement_id))]
    async fn approve_entitlement(
        &self,
        entitlement_id: &EntitlementId,
    ) -> Result<(), ProcurementError> {
        self.post_verb(
            "entitlements.approve",
            self.entitlement_url(entitlement_id, ":approve"),
            json!({}),
        )
        .await
    }

    #[instrument(skip(self), fields(entitlement_id = %entitlement_id, new_plan))]
    async fn approve_plan_change(
        &self,
        entitlement_id: &EntitlementId,
        new_plan: &str,
    ) -> Result<(), ProcurementError> {
        self.post_verb(
            "entitlements.approvePlanChange",
            self.entitlement_url(entitlement_id, ":approvePlanChange"),
            json!({ "pendingPlanName": new_plan }),
        )
        .await
    }

    #[instrument(skip(self), fields(entitlement_id = %entitlement_id))]
    async fn get_entitlement_details(
        &self,
        entitlement_id: &EntitlementId,
    ) -> Result<EntitlementDetails, ProcurementError> {
        self.get_json(
            "entitlements.get",
            self.entitlement_url(entitlement_id, ""),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_follow_the_resource_name_scheme() {
        let client = HttpProcurementClient::with_http_client(
            "https://example.test/v1/",
            "landgriffon",
            "key",
            Client::new(),
        );

        assert_eq!(
            client.account_url(&ProcurementAccountId::new("acc-1"), ":approve"),
            "https://example.test/v1/providers/landgriffon/accounts/acc-1:approve"
        );
        assert_eq!(
            client.entitlement_url(&EntitlementId::new("sub-1"), ""),
            "https://example.test/v1/providers/landgriffon/entitlements/sub-1"
        );
    }
}
