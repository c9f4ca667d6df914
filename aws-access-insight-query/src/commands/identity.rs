//! Caller identity reporting for the Access Insight service

use crate::aws::principal::resolve_principal;
use crate::error::AccessInsightResult;
use crate::types::{AccountSummary, CallerDetail, CallerProfile};

impl super::service::AccessInsightService {
    /// Identify the calling credentials: account, ARN, and the resolved
    /// user or role behind them (None for principals that are neither,
    /// such as the account root).
    pub async fn whoami(&self) -> AccessInsightResult<CallerProfile> {
        let identity = self.identity.caller_identity().await?;
        let principal = resolve_principal(&identity.arn).ok();
        Ok(CallerProfile {
            account_id: identity.account_id,
            arn: identity.arn,
            principal,
        })
    }

    /// Full report on the calling identity: attached and inline policies,
    /// group membership and MFA status for users, trust policy for roles.
    pub async fn describe_caller(&self) -> AccessInsightResult<CallerDetail> {
        let identity = self.identity.caller_identity().await?;
        let principal = resolve_principal(&identity.arn)?;
        let detail = self.identity.describe_principal(&principal).await?;
        Ok(CallerDetail {
            profile: CallerProfile {
                account_id: identity.account_id,
                arn: identity.arn,
                principal: Some(principal),
            },
            detail,
        })
    }

    /// IAM entity counters for the account (users, roles, policies, ...).
    pub async fn account_summary(&self) -> AccessInsightResult<AccountSummary> {
        self.identity.account_summary().await
    }
}
