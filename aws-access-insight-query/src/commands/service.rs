//! Access Insight service layer
//!
//! This module provides the main service interface that encapsulates the
//! query logic. The service holds the identity and billing providers and
//! exposes high-level operations (search_access, check_access,
//! get_cost_analysis, whoami, describe_caller, account_summary) that can be
//! used by different adapters (CLI, MCP).

use crate::aws::billing::AwsBillingProvider;
use crate::aws::identity::AwsIdentityProvider;
use crate::config::AwsSettings;
use crate::error::AccessInsightResult;
use crate::provider::{BillingProvider, IdentityProvider};
use std::sync::Arc;
use std::time::Duration;

/// Bounds on the fan-out a single query may generate
#[derive(Debug, Clone)]
pub struct QueryLimits {
    /// Concurrent policy simulations during `search_access`
    pub simulate_concurrency: usize,
    /// Budget for a single policy simulation
    pub simulate_timeout: Duration,
    /// Overall wall-clock budget for a search; on expiry the partial result
    /// is returned with still-pending principals marked Unknown
    pub search_deadline: Duration,
}

impl Default for QueryLimits {
    fn default() -> Self {
        Self {
            simulate_concurrency: 8,
            simulate_timeout: Duration::from_secs(10),
            search_deadline: Duration::from_secs(60),
        }
    }
}

/// Main service struct that holds providers and implements the query logic
pub struct AccessInsightService {
    pub(crate) identity: Arc<dyn IdentityProvider>,
    pub(crate) billing: Arc<dyn BillingProvider>,
    pub(crate) limits: QueryLimits,
}

impl AccessInsightService {
    /// Create a service backed by the AWS identity and billing APIs.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings resolve to an invalid credential
    /// configuration.
    pub async fn new(settings: &AwsSettings) -> AccessInsightResult<Self> {
        let config = settings.load_sdk_config().await;
        Ok(Self::with_providers(
            Arc::new(AwsIdentityProvider::from_config(&config)),
            Arc::new(AwsBillingProvider::from_config(&config)),
            QueryLimits::default(),
        ))
    }

    /// Create a service over explicit providers; used by adapters with their
    /// own client construction and by tests with fixture providers.
    pub fn with_providers(
        identity: Arc<dyn IdentityProvider>,
        billing: Arc<dyn BillingProvider>,
        limits: QueryLimits,
    ) -> Self {
        Self {
            identity,
            billing,
            limits,
        }
    }

    /// Replace the query limits, e.g. to tighten the search deadline.
    #[must_use]
    pub fn with_limits(mut self, limits: QueryLimits) -> Self {
        self.limits = limits;
        self
    }

    // search_access() is implemented in search.rs
    // check_access() is implemented in check.rs
    // get_cost_analysis() is implemented in cost.rs
    // whoami() / describe_caller() / account_summary() are in identity.rs
}
