//! This crate provides the core logic for AWS Access Insight:
//! - account-wide access search over policy simulation
//! - single-principal access checks
//! - trailing-window cost analysis
//! - caller identity reporting
//!
//! Adapters (CLI, MCP server) drive the [`AccessInsightService`]; tests
//! substitute the provider traits with fixtures.

mod aws;
pub mod commands;
mod config;
mod error;
mod provider;
mod types;

// Re-exports for a small, focused public API
pub use aws::principal::{resolve_principal, simulation_arn};
pub use commands::{AccessInsightService, QueryLimits};
pub use config::{AwsSettings, CredentialSource};
pub use error::{AccessInsightError, AccessInsightResult};
pub use provider::{BillingProvider, IdentityProvider};
pub use types::{
    AccessDecision, AccessEntry, AccessQuery, AccessReport, AccountSummary, CallerDetail,
    CallerIdentity, CallerProfile, CostLine, CostQuery, CostReport, CostUsage, CostWindow,
    DailyCost, IdentityAccessQuery, Principal, PrincipalDetail, PrincipalInfo, PrincipalKind,
    ServiceCost, TagFilter,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_construction_and_validation() {
        let query = AccessQuery::new("s3:ListBucket", "*");
        assert!(query.validate().is_ok());

        let query = AccessQuery::new("not an action", "*");
        assert!(matches!(
            query.validate(),
            Err(AccessInsightError::Validation(_))
        ));
    }
}
