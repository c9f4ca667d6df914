use crate::tools::insight;
use anyhow::Error;
use aws_access_insight_query::CallerDetail;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
#[schemars(description = "Input for describing the calling identity (no parameters)")]
pub struct DescribeCallerInput {}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
#[schemars(description = "Identity, policies, groups, and MFA status of the calling credentials")]
pub struct DescribeCallerOutput {
    pub account_id: String,
    pub arn: String,
    #[schemars(description = "'User' or 'Role'")]
    pub kind: String,
    pub name: String,
    pub attached_policies: Vec<String>,
    pub inline_policies: Vec<String>,
    #[schemars(description = "Group membership; empty for roles")]
    pub groups: Vec<String>,
    #[schemars(description = "MFA status; only present for users")]
    pub mfa_enabled: Option<bool>,
    #[schemars(description = "Trust policy document; only present for roles")]
    pub trust_policy: Option<serde_json::Value>,
}

impl From<CallerDetail> for DescribeCallerOutput {
    fn from(caller: CallerDetail) -> Self {
        let kind = caller
            .profile
            .principal
            .as_ref()
            .map_or("Unknown", |p| p.kind.as_str())
            .to_string();
        Self {
            account_id: caller.profile.account_id,
            arn: caller.profile.arn,
            kind,
            name: caller.detail.principal.name,
            attached_policies: caller.detail.attached_policies,
            inline_policies: caller.detail.inline_policies,
            groups: caller.detail.groups,
            mfa_enabled: caller.detail.mfa_enabled,
            trust_policy: caller.detail.trust_policy,
        }
    }
}

pub async fn describe_caller_identity(
    _input: DescribeCallerInput,
) -> Result<DescribeCallerOutput, Error> {
    let caller = insight::describe_caller().await?;
    Ok(caller.into())
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
#[schemars(description = "Input for the IAM account summary (no parameters)")]
pub struct AccountSummaryInput {}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
#[schemars(description = "IAM entity counters for the account")]
pub struct AccountSummaryOutput {
    pub summary: BTreeMap<String, i32>,
}

pub async fn account_summary(_input: AccountSummaryInput) -> Result<AccountSummaryOutput, Error> {
    let summary = insight::account_summary().await?;
    Ok(AccountSummaryOutput { summary })
}

#[cfg(test)]
#[serial_test::serial]
mod tests {
    use super::*;
    use aws_access_insight_query::{CallerProfile, PrincipalDetail, PrincipalInfo, PrincipalKind};

    #[tokio::test]
    async fn test_describe_caller_identity_flattens_detail() {
        let principal = PrincipalInfo::new(PrincipalKind::User, "alice");
        insight::set_mock_caller(Ok(CallerDetail {
            profile: CallerProfile {
                account_id: "123456789012".to_string(),
                arn: "arn:aws:iam::123456789012:user/alice".to_string(),
                principal: Some(principal.clone()),
            },
            detail: PrincipalDetail {
                principal,
                attached_policies: vec!["ReadOnlyAccess".to_string()],
                inline_policies: Vec::new(),
                groups: vec!["engineers".to_string()],
                mfa_enabled: Some(false),
                trust_policy: None,
            },
        }));

        let output = describe_caller_identity(DescribeCallerInput {})
            .await
            .expect("tool succeeds");

        assert_eq!(output.kind, "User");
        assert_eq!(output.name, "alice");
        assert_eq!(output.groups, vec!["engineers"]);
        assert_eq!(output.mfa_enabled, Some(false));
    }

    #[tokio::test]
    async fn test_account_summary_passthrough() {
        let mut counters = BTreeMap::new();
        counters.insert("Users".to_string(), 12);
        counters.insert("Roles".to_string(), 34);
        insight::set_mock_summary(Ok(counters));

        let output = account_summary(AccountSummaryInput {})
            .await
            .expect("tool succeeds");

        assert_eq!(output.summary.get("Users"), Some(&12));
        assert_eq!(output.summary.get("Roles"), Some(&34));
    }
}
