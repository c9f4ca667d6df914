mod check_access;
mod cost_analysis;
mod identity;
mod search_access;

pub(crate) use check_access::{check_access, CheckAccessInput, CheckAccessOutput};
pub(crate) use cost_analysis::{analyze_costs, AnalyzeCostsInput, AnalyzeCostsOutput};
pub(crate) use identity::{
    account_summary, describe_caller_identity, AccountSummaryInput, AccountSummaryOutput,
    DescribeCallerInput, DescribeCallerOutput,
};
pub(crate) use search_access::{search_access, SearchAccessInput, SearchAccessOutput};

/// Wrapper for `aws_access_insight_query::AccessInsightService`.
/// We mock this implementation with #[cfg(test)] to help with unit testing.
#[cfg(not(test))]
pub(crate) mod insight {
    use anyhow::{Context, Result};
    use aws_access_insight_query::{
        AccessEntry, AccessInsightService, AccessQuery, AccessReport, AccountSummary, AwsSettings,
        CallerDetail, CostQuery, CostReport, IdentityAccessQuery,
    };

    async fn service() -> Result<AccessInsightService> {
        AccessInsightService::new(&AwsSettings::default())
            .await
            .context("Failed to initialize Access Insight service")
    }

    pub async fn search_access(query: &AccessQuery) -> Result<AccessReport> {
        service().await?
            .search_access(query)
            .await
            .map_err(|e| anyhow::anyhow!(e))
    }

    pub async fn check_access(query: &IdentityAccessQuery) -> Result<AccessEntry> {
        service().await?
            .check_access(query)
            .await
            .map_err(|e| anyhow::anyhow!(e))
    }

    pub async fn get_cost_analysis(query: &CostQuery) -> Result<CostReport> {
        service().await?
            .get_cost_analysis(query)
            .await
            .map_err(|e| anyhow::anyhow!(e))
    }

    pub async fn describe_caller() -> Result<CallerDetail> {
        service().await?
            .describe_caller()
            .await
            .map_err(|e| anyhow::anyhow!(e))
    }

    pub async fn account_summary() -> Result<AccountSummary> {
        service().await?
            .account_summary()
            .await
            .map_err(|e| anyhow::anyhow!(e))
    }
}

#[cfg(test)]
pub(crate) mod insight {
    use anyhow::Result;
    use aws_access_insight_query::{
        AccessEntry, AccessQuery, AccessReport, AccountSummary, CallerDetail, CostQuery,
        CostReport, IdentityAccessQuery,
    };
    use std::sync::Mutex;

    static MOCK_SEARCH: Mutex<Option<Result<AccessReport>>> = Mutex::new(None);
    static MOCK_CHECK: Mutex<Option<Result<AccessEntry>>> = Mutex::new(None);
    static MOCK_COST: Mutex<Option<Result<CostReport>>> = Mutex::new(None);
    static MOCK_CALLER: Mutex<Option<Result<CallerDetail>>> = Mutex::new(None);
    static MOCK_SUMMARY: Mutex<Option<Result<AccountSummary>>> = Mutex::new(None);

    pub async fn search_access(_query: &AccessQuery) -> Result<AccessReport> {
        MOCK_SEARCH
            .lock()
            .expect("mock lock")
            .take()
            .expect("mock search result not set")
    }

    pub async fn check_access(_query: &IdentityAccessQuery) -> Result<AccessEntry> {
        MOCK_CHECK
            .lock()
            .expect("mock lock")
            .take()
            .expect("mock check result not set")
    }

    pub async fn get_cost_analysis(_query: &CostQuery) -> Result<CostReport> {
        MOCK_COST
            .lock()
            .expect("mock lock")
            .take()
            .expect("mock cost result not set")
    }

    pub async fn describe_caller() -> Result<CallerDetail> {
        MOCK_CALLER
            .lock()
            .expect("mock lock")
            .take()
            .expect("mock caller result not set")
    }

    pub async fn account_summary() -> Result<AccountSummary> {
        MOCK_SUMMARY
            .lock()
            .expect("mock lock")
            .take()
            .expect("mock summary result not set")
    }

    pub fn set_mock_search(value: Result<AccessReport>) {
        *MOCK_SEARCH.lock().expect("mock lock") = Some(value);
    }

    pub fn set_mock_check(value: Result<AccessEntry>) {
        *MOCK_CHECK.lock().expect("mock lock") = Some(value);
    }

    pub fn set_mock_cost(value: Result<CostReport>) {
        *MOCK_COST.lock().expect("mock lock") = Some(value);
    }

    pub fn set_mock_caller(value: Result<CallerDetail>) {
        *MOCK_CALLER.lock().expect("mock lock") = Some(value);
    }

    pub fn set_mock_summary(value: Result<AccountSummary>) {
        *MOCK_SUMMARY.lock().expect("mock lock") = Some(value);
    }
}
