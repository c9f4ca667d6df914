use crate::tools::insight;
use anyhow::Error;
use aws_access_insight_query::{CostQuery, CostReport, TagFilter};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

const DEFAULT_LOOKBACK_DAYS: i64 = 30;

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
#[schemars(description = "Input for the trailing-window cost analysis")]
pub struct AnalyzeCostsInput {
    #[schemars(description = "Trailing window length in days; defaults to 30, must be at least 1")]
    pub lookback_days: Option<i64>,
    #[schemars(description = "Restrict costs to resources carrying this tag key (requires TagValue)")]
    pub tag_key: Option<String>,
    #[schemars(description = "Tag value to match (requires TagKey)")]
    pub tag_value: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct DailyCostView {
    #[schemars(description = "Day in YYYY-MM-DD format")]
    pub date: String,
    pub amount: f64,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct ServiceCostView {
    pub service: String,
    pub amount: f64,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
#[schemars(description = "Cost breakdown for the requested window")]
pub struct AnalyzeCostsOutput {
    #[schemars(description = "Window start, inclusive (YYYY-MM-DD)")]
    pub start: String,
    #[schemars(description = "Window end, exclusive (YYYY-MM-DD)")]
    pub end: String,
    pub daily: Vec<DailyCostView>,
    #[schemars(description = "Per-service totals, largest first")]
    pub by_service: Vec<ServiceCostView>,
    #[schemars(description = "Sum of all daily amounts")]
    pub total: f64,
    pub currency: String,
    #[schemars(description = "True when billing pagination was cut short")]
    pub incomplete: bool,
}

impl From<CostReport> for AnalyzeCostsOutput {
    fn from(report: CostReport) -> Self {
        Self {
            start: report.start.to_string(),
            end: report.end.to_string(),
            daily: report
                .daily
                .into_iter()
                .map(|d| DailyCostView {
                    date: d.date.to_string(),
                    amount: d.amount,
                })
                .collect(),
            by_service: report
                .by_service
                .into_iter()
                .map(|s| ServiceCostView {
                    service: s.service,
                    amount: s.amount,
                })
                .collect(),
            total: report.total,
            currency: report.currency,
            incomplete: report.incomplete,
        }
    }
}

pub async fn analyze_costs(input: AnalyzeCostsInput) -> Result<AnalyzeCostsOutput, Error> {
    let tag_filter = TagFilter::from_parts(input.tag_key, input.tag_value)?;
    let query = CostQuery::new(
        input.lookback_days.unwrap_or(DEFAULT_LOOKBACK_DAYS),
        tag_filter,
    );
    let report = insight::get_cost_analysis(&query).await?;
    Ok(report.into())
}
