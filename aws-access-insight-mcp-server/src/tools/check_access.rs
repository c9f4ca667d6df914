use crate::tools::insight;
use anyhow::Error;
use aws_access_insight_query::{AccessDecision, IdentityAccessQuery};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
#[schemars(description = "Input for checking one principal's access")]
pub struct CheckAccessInput {
    #[schemars(description = "Principal ARN: an IAM user, IAM role, or STS assumed-role ARN")]
    pub identity: String,
    #[schemars(description = "Action to evaluate, e.g. 's3:ListBucket'")]
    pub action: String,
    #[schemars(description = "Resource ARN pattern the action applies to; defaults to '*'")]
    pub resource: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
#[schemars(description = "Simulated decision for the principal")]
pub struct CheckAccessOutput {
    #[schemars(description = "IAM ARN the simulation ran against")]
    pub principal_arn: String,
    #[schemars(description = "'User' or 'Role'")]
    pub kind: String,
    #[schemars(description = "'Allowed' or 'Denied'")]
    pub decision: String,
    #[schemars(description = "True when the decision is Allowed")]
    pub allowed: bool,
}

pub async fn check_access(input: CheckAccessInput) -> Result<CheckAccessOutput, Error> {
    let query = IdentityAccessQuery::new(
        input.identity,
        input.action,
        input.resource.unwrap_or_else(|| "*".to_string()),
    );
    let entry = insight::check_access(&query).await?;

    Ok(CheckAccessOutput {
        principal_arn: entry.principal_arn,
        kind: entry.kind.as_str().to_string(),
        allowed: entry.decision == AccessDecision::Allowed,
        decision: entry.decision.as_str().to_string(),
    })
}

#[cfg(test)]
#[serial_test::serial]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use aws_access_insight_query::{AccessEntry, PrincipalKind};

    #[tokio::test]
    async fn test_check_access_reports_allowed() {
        insight::set_mock_check(Ok(AccessEntry {
            principal_arn: "arn:aws:iam::123456789012:user/alice".to_string(),
            kind: PrincipalKind::User,
            decision: AccessDecision::Allowed,
        }));

        let output = check_access(CheckAccessInput {
            identity: "arn:aws:iam::123456789012:user/alice".to_string(),
            action: "s3:ListBucket".to_string(),
            resource: Some("arn:aws:s3:::my-bucket".to_string()),
        })
        .await
        .expect("tool succeeds");

        assert!(output.allowed);
        assert_eq!(output.decision, "Allowed");
        assert_eq!(output.kind, "User");
    }

    #[tokio::test]
    async fn test_check_access_reports_denied() {
        insight::set_mock_check(Ok(AccessEntry {
            principal_arn: "arn:aws:iam::123456789012:role/ci".to_string(),
            kind: PrincipalKind::Role,
            decision: AccessDecision::Denied,
        }));

        let output = check_access(CheckAccessInput {
            identity: "arn:aws:iam::123456789012:role/ci".to_string(),
            action: "s3:DeleteObject".to_string(),
            resource: None,
        })
        .await
        .expect("tool succeeds");

        assert!(!output.allowed);
        assert_eq!(output.decision, "Denied");
    }

    #[tokio::test]
    async fn test_check_access_propagates_not_found() {
        insight::set_mock_check(Err(anyhow!("not found: NoSuchEntity")));

        let result = check_access(CheckAccessInput {
            identity: "arn:aws:iam::123456789012:user/ghost".to_string(),
            action: "s3:ListBucket".to_string(),
            resource: None,
        })
        .await;

        assert!(result.is_err());
    }
}
