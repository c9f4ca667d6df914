//! AWS identity provider over the IAM and STS clients

use crate::aws::{classify_sdk_error, with_retry, RetryPolicy};
use crate::error::{AccessInsightError, AccessInsightResult};
use crate::provider::IdentityProvider;
use crate::types::{
    AccessDecision, AccountSummary, CallerIdentity, Principal, PrincipalDetail, PrincipalInfo,
    PrincipalKind,
};
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_iam::types::PolicyEvaluationDecisionType;
use aws_sdk_iam::Client as IamClient;
use aws_sdk_sts::Client as StsClient;
use log::debug;

const MAX_PAGE_ITEMS: i32 = 100;

pub struct AwsIdentityProvider {
    iam: IamClient,
    sts: StsClient,
    retry: RetryPolicy,
}

impl AwsIdentityProvider {
    pub fn from_config(config: &SdkConfig) -> Self {
        Self {
            iam: IamClient::new(config),
            sts: StsClient::new(config),
            retry: RetryPolicy::default(),
        }
    }

    async fn list_users(&self) -> AccessInsightResult<Vec<Principal>> {
        let mut principals = Vec::new();
        let mut marker: Option<String> = None;

        loop {
            let page = with_retry(&self.retry, "ListUsers", || {
                let mut request = self.iam.list_users().max_items(MAX_PAGE_ITEMS);
                if let Some(m) = &marker {
                    request = request.marker(m);
                }
                async move {
                    request
                        .send()
                        .await
                        .map_err(|e| classify_sdk_error("ListUsers", &e))
                }
            })
            .await?;

            for user in page.users {
                principals.push(Principal {
                    arn: user.arn,
                    name: user.user_name,
                    kind: PrincipalKind::User,
                });
            }

            if !page.is_truncated {
                break;
            }
            marker = page.marker;
            if marker.is_none() {
                break;
            }
        }

        Ok(principals)
    }

    async fn list_roles(&self) -> AccessInsightResult<Vec<Principal>> {
        let mut principals = Vec::new();
        let mut marker: Option<String> = None;

        loop {
            let page = with_retry(&self.retry, "ListRoles", || {
                let mut request = self.iam.list_roles().max_items(MAX_PAGE_ITEMS);
                if let Some(m) = &marker {
                    request = request.marker(m);
                }
                async move {
                    request
                        .send()
                        .await
                        .map_err(|e| classify_sdk_error("ListRoles", &e))
                }
            })
            .await?;

            for role in page.roles {
                principals.push(Principal {
                    arn: role.arn,
                    name: role.role_name,
                    kind: PrincipalKind::Role,
                });
            }

            if !page.is_truncated {
                break;
            }
            marker = page.marker;
            if marker.is_none() {
                break;
            }
        }

        Ok(principals)
    }

    async fn attached_policy_names(
        &self,
        principal: &PrincipalInfo,
    ) -> AccessInsightResult<Vec<String>> {
        let attached = match principal.kind {
            PrincipalKind::User => {
                let response = with_retry(&self.retry, "ListAttachedUserPolicies", || {
                    let request = self
                        .iam
                        .list_attached_user_policies()
                        .user_name(&principal.name);
                    async move {
                        request
                            .send()
                            .await
                            .map_err(|e| classify_sdk_error("ListAttachedUserPolicies", &e))
                    }
                })
                .await?;
                response.attached_policies.unwrap_or_default()
            }
            PrincipalKind::Role => {
                let response = with_retry(&self.retry, "ListAttachedRolePolicies", || {
                    let request = self
                        .iam
                        .list_attached_role_policies()
                        .role_name(&principal.name);
                    async move {
                        request
                            .send()
                            .await
                            .map_err(|e| classify_sdk_error("ListAttachedRolePolicies", &e))
                    }
                })
                .await?;
                response.attached_policies.unwrap_or_default()
            }
        };

        Ok(attached
            .into_iter()
            .filter_map(|p| p.policy_name)
            .collect())
    }

    async fn inline_policy_names(
        &self,
        principal: &PrincipalInfo,
    ) -> AccessInsightResult<Vec<String>> {
        match principal.kind {
            PrincipalKind::User => {
                let response = with_retry(&self.retry, "ListUserPolicies", || {
                    let request = self.iam.list_user_policies().user_name(&principal.name);
                    async move {
                        request
                            .send()
                            .await
                            .map_err(|e| classify_sdk_error("ListUserPolicies", &e))
                    }
                })
                .await?;
                Ok(response.policy_names)
            }
            PrincipalKind::Role => {
                let response = with_retry(&self.retry, "ListRolePolicies", || {
                    let request = self.iam.list_role_policies().role_name(&principal.name);
                    async move {
                        request
                            .send()
                            .await
                            .map_err(|e| classify_sdk_error("ListRolePolicies", &e))
                    }
                })
                .await?;
                Ok(response.policy_names)
            }
        }
    }

    async fn groups_for_user(&self, user_name: &str) -> AccessInsightResult<Vec<String>> {
        let response = with_retry(&self.retry, "ListGroupsForUser", || {
            let request = self.iam.list_groups_for_user().user_name(user_name);
            async move {
                request
                    .send()
                    .await
                    .map_err(|e| classify_sdk_error("ListGroupsForUser", &e))
            }
        })
        .await?;
        Ok(response
            .groups
            .into_iter()
            .map(|g| g.group_name)
            .collect())
    }

    async fn mfa_enabled(&self, user_name: &str) -> AccessInsightResult<bool> {
        let response = with_retry(&self.retry, "ListMFADevices", || {
            let request = self.iam.list_mfa_devices().user_name(user_name);
            async move {
                request
                    .send()
                    .await
                    .map_err(|e| classify_sdk_error("ListMFADevices", &e))
            }
        })
        .await?;
        Ok(!response.mfa_devices.is_empty())
    }

    async fn trust_policy(&self, role_name: &str) -> AccessInsightResult<serde_json::Value> {
        let response = with_retry(&self.retry, "GetRole", || {
            let request = self.iam.get_role().role_name(role_name);
            async move {
                request
                    .send()
                    .await
                    .map_err(|e| classify_sdk_error("GetRole", &e))
            }
        })
        .await?;

        let document = response
            .role
            .and_then(|r| r.assume_role_policy_document)
            .ok_or_else(|| {
                AccessInsightError::provider(format!(
                    "GetRole returned no trust policy for '{role_name}'"
                ))
            })?;

        // The IAM API returns the document URL-encoded
        let decoded = percent_encoding::percent_decode_str(&document)
            .decode_utf8()
            .map_err(|e| {
                AccessInsightError::provider(format!("failed to URL-decode trust policy: {e}"))
            })?;

        serde_json::from_str(&decoded).map_err(|e| {
            AccessInsightError::provider(format!("failed to parse trust policy JSON: {e}"))
        })
    }
}

#[async_trait]
impl IdentityProvider for AwsIdentityProvider {
    async fn list_principals(&self) -> AccessInsightResult<Vec<Principal>> {
        let mut principals = self.list_users().await?;
        principals.extend(self.list_roles().await?);
        debug!("enumerated {} principals", principals.len());
        Ok(principals)
    }

    async fn simulate_action(
        &self,
        principal_arn: &str,
        action: &str,
        resource: &str,
    ) -> AccessInsightResult<AccessDecision> {
        let response = with_retry(&self.retry, "SimulatePrincipalPolicy", || {
            let request = self
                .iam
                .simulate_principal_policy()
                .policy_source_arn(principal_arn)
                .action_names(action)
                .resource_arns(resource);
            async move {
                request
                    .send()
                    .await
                    .map_err(|e| classify_sdk_error("SimulatePrincipalPolicy", &e))
            }
        })
        .await?;

        let results = response.evaluation_results.unwrap_or_default();
        let Some(evaluation) = results.first() else {
            return Err(AccessInsightError::provider(format!(
                "SimulatePrincipalPolicy returned no evaluation for '{principal_arn}'"
            )));
        };

        let decision = if evaluation.eval_decision == PolicyEvaluationDecisionType::Allowed {
            AccessDecision::Allowed
        } else {
            AccessDecision::Denied
        };
        debug!("{principal_arn}: {action} on {resource} -> {}", decision.as_str());
        Ok(decision)
    }

    async fn caller_identity(&self) -> AccessInsightResult<CallerIdentity> {
        let response = with_retry(&self.retry, "GetCallerIdentity", || {
            let request = self.sts.get_caller_identity();
            async move {
                request
                    .send()
                    .await
                    .map_err(|e| classify_sdk_error("GetCallerIdentity", &e))
            }
        })
        .await?;

        let account_id = response.account.ok_or_else(|| {
            AccessInsightError::provider("GetCallerIdentity response missing Account")
        })?;
        let arn = response
            .arn
            .ok_or_else(|| AccessInsightError::provider("GetCallerIdentity response missing Arn"))?;

        Ok(CallerIdentity { account_id, arn })
    }

    async fn describe_principal(
        &self,
        principal: &PrincipalInfo,
    ) -> AccessInsightResult<PrincipalDetail> {
        let attached_policies = self.attached_policy_names(principal).await?;
        let inline_policies = self.inline_policy_names(principal).await?;

        let (groups, mfa_enabled, trust_policy) = match principal.kind {
            PrincipalKind::User => {
                let groups = self.groups_for_user(&principal.name).await?;
                let mfa = self.mfa_enabled(&principal.name).await?;
                (groups, Some(mfa), None)
            }
            PrincipalKind::Role => {
                let trust = self.trust_policy(&principal.name).await?;
                (Vec::new(), None, Some(trust))
            }
        };

        Ok(PrincipalDetail {
            principal: principal.clone(),
            attached_policies,
            inline_policies,
            groups,
            mfa_enabled,
            trust_policy,
        })
    }

    async fn account_summary(&self) -> AccessInsightResult<AccountSummary> {
        let response = with_retry(&self.retry, "GetAccountSummary", || {
            let request = self.iam.get_account_summary();
            async move {
                request
                    .send()
                    .await
                    .map_err(|e| classify_sdk_error("GetAccountSummary", &e))
            }
        })
        .await?;

        Ok(response
            .summary_map
            .unwrap_or_default()
            .into_iter()
            .map(|(key, value)| (key.as_str().to_string(), value))
            .collect())
    }
}
