//! Provider traits: the seams to the external identity and billing APIs.
//!
//! The AWS implementations live in the `aws` module; tests substitute
//! fixtures to exercise the aggregation semantics without a live account.

use crate::error::AccessInsightResult;
use crate::types::{
    AccessDecision, AccountSummary, CallerIdentity, CostUsage, CostWindow, Principal,
    PrincipalInfo, PrincipalDetail, TagFilter,
};
use async_trait::async_trait;

/// External identity API: principal enumeration, policy simulation, and
/// per-principal detail lookups.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Enumerate all users and roles in the account.
    async fn list_principals(&self) -> AccessInsightResult<Vec<Principal>>;

    /// Evaluate, without side effects, whether the principal's policies
    /// permit `action` on `resource`.
    async fn simulate_action(
        &self,
        principal_arn: &str,
        action: &str,
        resource: &str,
    ) -> AccessInsightResult<AccessDecision>;

    /// Identity behind the calling credentials.
    async fn caller_identity(&self) -> AccessInsightResult<CallerIdentity>;

    /// Policies, groups, MFA, and trust-policy details for one principal.
    async fn describe_principal(
        &self,
        principal: &PrincipalInfo,
    ) -> AccessInsightResult<PrincipalDetail>;

    /// Account-wide IAM entity counters.
    async fn account_summary(&self) -> AccessInsightResult<AccountSummary>;
}

/// External billing API: cost-and-usage over a date window.
#[async_trait]
pub trait BillingProvider: Send + Sync {
    /// Daily per-service cost lines for `[window.start, window.end)`,
    /// optionally restricted to resources carrying `tag_filter`.
    async fn cost_and_usage(
        &self,
        window: &CostWindow,
        tag_filter: Option<&TagFilter>,
    ) -> AccessInsightResult<CostUsage>;
}
