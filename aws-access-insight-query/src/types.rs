//! Core type definitions for Access Insight (pure Rust)

use crate::error::{AccessInsightError, AccessInsightResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Kind of IAM principal
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PrincipalKind {
    User,
    Role,
}

impl PrincipalKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Role => "Role",
        }
    }
}

/// Resolved principal kind and name (path included for pathed principals)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct PrincipalInfo {
    pub kind: PrincipalKind,
    pub name: String,
}

impl PrincipalInfo {
    #[must_use]
    pub fn new(kind: PrincipalKind, name: &str) -> Self {
        Self {
            kind,
            name: name.to_string(),
        }
    }
}

/// An enumerated account principal as returned by the identity API
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct Principal {
    pub arn: String,
    pub name: String,
    pub kind: PrincipalKind,
}

/// Outcome of a policy simulation for one principal
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AccessDecision {
    Allowed,
    Denied,
    /// Simulation failed or timed out; the real decision is not known
    Unknown,
}

impl AccessDecision {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Allowed => "Allowed",
            Self::Denied => "Denied",
            Self::Unknown => "Unknown",
        }
    }
}

/// Account-wide access search: which principals can perform `action` on `resource`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct AccessQuery {
    pub action: String,
    pub resource: String,
}

impl AccessQuery {
    pub fn new(action: impl Into<String>, resource: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            resource: resource.into(),
        }
    }

    pub fn validate(&self) -> AccessInsightResult<()> {
        validate_action(&self.action)?;
        validate_resource(&self.resource)
    }
}

/// Single-principal access check
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct IdentityAccessQuery {
    pub identity: String,
    pub action: String,
    pub resource: String,
}

impl IdentityAccessQuery {
    pub fn new(
        identity: impl Into<String>,
        action: impl Into<String>,
        resource: impl Into<String>,
    ) -> Self {
        Self {
            identity: identity.into(),
            action: action.into(),
            resource: resource.into(),
        }
    }

    pub fn validate(&self) -> AccessInsightResult<()> {
        if self.identity.trim().is_empty() {
            return Err(AccessInsightError::validation(
                "identity must be a principal ARN",
            ));
        }
        validate_action(&self.action)?;
        validate_resource(&self.resource)
    }
}

/// One row of an access report
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct AccessEntry {
    pub principal_arn: String,
    pub kind: PrincipalKind,
    pub decision: AccessDecision,
}

/// Result of `search_access`: allowed principals plus unknown markers for
/// simulations that failed or timed out. Denied principals are omitted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct AccessReport {
    pub action: String,
    pub resource: String,
    pub entries: Vec<AccessEntry>,
    /// Number of distinct principals that were examined
    pub scanned: usize,
    /// True when any simulation failed or the deadline expired
    pub incomplete: bool,
}

impl AccessReport {
    /// Entries with a definitive Allowed decision
    pub fn allowed(&self) -> impl Iterator<Item = &AccessEntry> {
        self.entries
            .iter()
            .filter(|e| e.decision == AccessDecision::Allowed)
    }

    #[must_use]
    pub fn is_allowed(&self, principal_arn: &str) -> bool {
        self.allowed().any(|e| e.principal_arn == principal_arn)
    }
}

/// Tag key/value pair restricting cost aggregation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct TagFilter {
    pub key: String,
    pub value: String,
}

impl TagFilter {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Build an optional filter from loose key/value options, rejecting a
    /// key without a value and vice versa.
    pub fn from_parts(
        key: Option<String>,
        value: Option<String>,
    ) -> AccessInsightResult<Option<Self>> {
        match (key, value) {
            (Some(key), Some(value)) => Ok(Some(Self::new(key, value))),
            (None, None) => Ok(None),
            _ => Err(AccessInsightError::validation(
                "tag key and tag value must be provided together",
            )),
        }
    }
}

/// Trailing-window cost query
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct CostQuery {
    pub lookback_days: i64,
    pub tag_filter: Option<TagFilter>,
}

impl CostQuery {
    #[must_use]
    pub fn new(lookback_days: i64, tag_filter: Option<TagFilter>) -> Self {
        Self {
            lookback_days,
            tag_filter,
        }
    }

    pub fn validate(&self) -> AccessInsightResult<()> {
        if self.lookback_days < 1 {
            return Err(AccessInsightError::validation(
                "lookback_days must be at least 1",
            ));
        }
        if let Some(tag) = &self.tag_filter {
            if tag.key.trim().is_empty() || tag.value.trim().is_empty() {
                return Err(AccessInsightError::validation(
                    "tag filter key and value must be non-empty",
                ));
            }
        }
        Ok(())
    }
}

/// Half-open date interval `[start, end)` used for billing queries
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct CostWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// One billing line item: a service's cost on a single day
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct CostLine {
    pub date: NaiveDate,
    pub service: String,
    pub amount: f64,
    pub currency: String,
}

/// Raw billing response: line items plus a truncation marker set when
/// pagination was abandoned mid-way with partial results in hand.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CostUsage {
    pub lines: Vec<CostLine>,
    pub truncated: bool,
}

/// Cost for a single day of the window
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct DailyCost {
    pub date: NaiveDate,
    pub amount: f64,
}

/// Aggregate cost attributed to one service over the whole window
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct ServiceCost {
    pub service: String,
    pub amount: f64,
}

/// Result of `get_cost_analysis`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct CostReport {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub daily: Vec<DailyCost>,
    pub by_service: Vec<ServiceCost>,
    pub total: f64,
    pub currency: String,
    pub incomplete: bool,
}

/// STS caller identity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct CallerIdentity {
    pub account_id: String,
    pub arn: String,
}

/// Caller identity with the resolved principal, when it is a user or role
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct CallerProfile {
    pub account_id: String,
    pub arn: String,
    pub principal: Option<PrincipalInfo>,
}

/// Policies, groups, MFA, and trust-policy details for one principal
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct PrincipalDetail {
    pub principal: PrincipalInfo,
    pub attached_policies: Vec<String>,
    pub inline_policies: Vec<String>,
    /// Group membership; roles do not belong to groups
    pub groups: Vec<String>,
    /// MFA status; only meaningful for users
    pub mfa_enabled: Option<bool>,
    /// Parsed trust policy document; only present for roles
    pub trust_policy: Option<serde_json::Value>,
}

/// Result of `describe_caller`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct CallerDetail {
    pub profile: CallerProfile,
    pub detail: PrincipalDetail,
}

/// IAM account summary counters, keyed by the provider's summary key names
pub type AccountSummary = BTreeMap<String, i32>;

/// An action must look like `service:Operation`, e.g. `s3:ListBucket`.
/// Wildcards are accepted in the operation part.
pub(crate) fn validate_action(action: &str) -> AccessInsightResult<()> {
    let Some((service, operation)) = action.split_once(':') else {
        return Err(AccessInsightError::validation(format!(
            "action '{action}' must be of the form service:Operation"
        )));
    };
    if service.is_empty()
        || !service
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
    {
        return Err(AccessInsightError::validation(format!(
            "action '{action}' has an invalid service part"
        )));
    }
    if operation.is_empty()
        || !operation
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '*')
    {
        return Err(AccessInsightError::validation(format!(
            "action '{action}' has an invalid operation part"
        )));
    }
    Ok(())
}

/// A resource must be `*` or an ARN pattern.
pub(crate) fn validate_resource(resource: &str) -> AccessInsightResult<()> {
    if resource.is_empty() {
        return Err(AccessInsightError::validation("resource must be non-empty"));
    }
    if resource == "*" || resource.starts_with("arn:") {
        return Ok(());
    }
    Err(AccessInsightError::validation(format!(
        "resource '{resource}' must be '*' or an ARN pattern"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_action_accepts_service_operation() {
        assert!(validate_action("s3:ListBucket").is_ok());
        assert!(validate_action("dynamodb:GetItem").is_ok());
        assert!(validate_action("execute-api:Invoke").is_ok());
        assert!(validate_action("s3:Get*").is_ok());
    }

    #[test]
    fn test_validate_action_rejects_malformed_input() {
        assert!(validate_action("s3ListBucket").is_err());
        assert!(validate_action(":ListBucket").is_err());
        assert!(validate_action("s3:").is_err());
        assert!(validate_action("").is_err());
        assert!(validate_action("s3:List Bucket").is_err());
    }

    #[test]
    fn test_validate_resource() {
        assert!(validate_resource("*").is_ok());
        assert!(validate_resource("arn:aws:s3:::my-bucket/*").is_ok());
        assert!(validate_resource("").is_err());
        assert!(validate_resource("my-bucket").is_err());
    }

    #[test]
    fn test_cost_query_validation() {
        assert!(CostQuery::new(1, None).validate().is_ok());
        assert!(CostQuery::new(0, None).validate().is_err());
        assert!(CostQuery::new(-7, None).validate().is_err());

        let tagged = CostQuery::new(7, Some(TagFilter::new("team", "analytics")));
        assert!(tagged.validate().is_ok());

        let blank_value = CostQuery::new(7, Some(TagFilter::new("team", " ")));
        assert!(blank_value.validate().is_err());
    }

    #[test]
    fn test_tag_filter_from_parts() {
        assert_eq!(TagFilter::from_parts(None, None).expect("valid"), None);

        let filter = TagFilter::from_parts(Some("team".into()), Some("analytics".into()))
            .expect("valid")
            .expect("present");
        assert_eq!(filter.key, "team");
        assert_eq!(filter.value, "analytics");

        assert!(TagFilter::from_parts(Some("team".into()), None).is_err());
        assert!(TagFilter::from_parts(None, Some("analytics".into())).is_err());
    }

    #[test]
    fn test_access_report_allowed_filter() {
        let report = AccessReport {
            action: "s3:ListBucket".into(),
            resource: "*".into(),
            entries: vec![
                AccessEntry {
                    principal_arn: "arn:aws:iam::123456789012:user/alice".into(),
                    kind: PrincipalKind::User,
                    decision: AccessDecision::Allowed,
                },
                AccessEntry {
                    principal_arn: "arn:aws:iam::123456789012:role/ci".into(),
                    kind: PrincipalKind::Role,
                    decision: AccessDecision::Unknown,
                },
            ],
            scanned: 3,
            incomplete: true,
        };

        assert_eq!(report.allowed().count(), 1);
        assert!(report.is_allowed("arn:aws:iam::123456789012:user/alice"));
        assert!(!report.is_allowed("arn:aws:iam::123456789012:role/ci"));
    }

    #[test]
    fn test_access_entry_serialization() {
        let entry = AccessEntry {
            principal_arn: "arn:aws:iam::123456789012:user/alice".into(),
            kind: PrincipalKind::User,
            decision: AccessDecision::Allowed,
        };

        let json = serde_json::to_string(&entry).expect("serializable");

        // PascalCase field names for AWS-flavored JSON
        assert!(json.contains("\"PrincipalArn\""));
        assert!(json.contains("\"Kind\":\"User\""));
        assert!(json.contains("\"Decision\":\"Allowed\""));
    }
}
