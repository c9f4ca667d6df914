use crate::tools::insight;
use anyhow::Error;
use aws_access_insight_query::{AccessEntry, AccessQuery, AccessReport};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
#[schemars(description = "Input for searching which principals can perform an action")]
pub struct SearchAccessInput {
    #[schemars(description = "Action to evaluate, e.g. 's3:ListBucket'")]
    pub action: String,
    #[schemars(description = "Resource ARN pattern the action applies to; defaults to '*'")]
    pub resource: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct AccessEntryView {
    #[schemars(description = "ARN of the principal")]
    pub principal_arn: String,
    #[schemars(description = "'User' or 'Role'")]
    pub kind: String,
    #[schemars(description = "'Allowed', 'Denied', or 'Unknown'")]
    pub decision: String,
}

impl From<AccessEntry> for AccessEntryView {
    fn from(entry: AccessEntry) -> Self {
        Self {
            principal_arn: entry.principal_arn,
            kind: entry.kind.as_str().to_string(),
            decision: entry.decision.as_str().to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
#[schemars(description = "Principals allowed to perform the action, plus Unknown markers \
    for principals whose simulation failed")]
pub struct SearchAccessOutput {
    #[schemars(description = "Allowed principals and Unknown markers; denied principals are omitted")]
    pub entries: Vec<AccessEntryView>,
    #[schemars(description = "Number of distinct principals examined")]
    pub scanned: usize,
    #[schemars(description = "True when some simulations failed or timed out")]
    pub incomplete: bool,
}

impl From<AccessReport> for SearchAccessOutput {
    fn from(report: AccessReport) -> Self {
        Self {
            entries: report.entries.into_iter().map(Into::into).collect(),
            scanned: report.scanned,
            incomplete: report.incomplete,
        }
    }
}

pub async fn search_access(input: SearchAccessInput) -> Result<SearchAccessOutput, Error> {
    let query = AccessQuery::new(
        input.action,
        input.resource.unwrap_or_else(|| "*".to_string()),
    );
    let report = insight::search_access(&query).await?;
    Ok(report.into())
}

#[cfg(test)]
#[serial_test::serial]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use aws_access_insight_query::{AccessDecision, PrincipalKind};

    fn sample_report() -> AccessReport {
        AccessReport {
            action: "s3:ListBucket".to_string(),
            resource: "*".to_string(),
            entries: vec![
                AccessEntry {
                    principal_arn: "arn:aws:iam::123456789012:user/alice".to_string(),
                    kind: PrincipalKind::User,
                    decision: AccessDecision::Allowed,
                },
                AccessEntry {
                    principal_arn: "arn:aws:iam::123456789012:role/ci".to_string(),
                    kind: PrincipalKind::Role,
                    decision: AccessDecision::Unknown,
                },
            ],
            scanned: 3,
            incomplete: true,
        }
    }

    #[tokio::test]
    async fn test_search_access_maps_report_to_output() {
        insight::set_mock_search(Ok(sample_report()));

        let output = search_access(SearchAccessInput {
            action: "s3:ListBucket".to_string(),
            resource: None,
        })
        .await
        .expect("tool succeeds");

        assert_eq!(output.entries.len(), 2);
        assert_eq!(output.entries[0].kind, "User");
        assert_eq!(output.entries[0].decision, "Allowed");
        assert_eq!(output.entries[1].decision, "Unknown");
        assert_eq!(output.scanned, 3);
        assert!(output.incomplete);
    }

    #[tokio::test]
    async fn test_search_access_propagates_errors() {
        insight::set_mock_search(Err(anyhow!("validation error: bad action")));

        let result = search_access(SearchAccessInput {
            action: "nonsense".to_string(),
            resource: None,
        })
        .await;

        assert!(result.is_err());
        assert!(result
            .expect_err("propagated")
            .to_string()
            .contains("bad action"));
    }

    #[test]
    fn test_search_access_output_serialization() {
        let output = SearchAccessOutput::from(sample_report());
        let json = serde_json::to_string(&output).expect("serializable");

        assert!(json.contains("\"Entries\":"));
        assert!(json.contains("\"PrincipalArn\":"));
        assert!(json.contains("\"Scanned\":3"));
    }
}
