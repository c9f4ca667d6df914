//! Single-principal access check for the Access Insight service

use crate::aws::principal::{resolve_principal, simulation_arn};
use crate::error::AccessInsightResult;
use crate::types::{AccessEntry, IdentityAccessQuery};

impl super::service::AccessInsightService {
    /// Check whether one principal can perform `action` on `resource`.
    ///
    /// The identity may be an IAM user ARN, an IAM role ARN, or an STS
    /// assumed-role ARN (which is checked against its underlying role).
    /// This is a single-shot operation: any provider error surfaces
    /// directly, including NotFound for a principal that does not exist.
    pub async fn check_access(
        &self,
        query: &IdentityAccessQuery,
    ) -> AccessInsightResult<AccessEntry> {
        query.validate()?;
        let info = resolve_principal(&query.identity)?;
        let principal_arn = simulation_arn(&query.identity)?;

        let decision = self
            .identity
            .simulate_action(&principal_arn, &query.action, &query.resource)
            .await?;

        Ok(AccessEntry {
            principal_arn,
            kind: info.kind,
            decision,
        })
    }
}
