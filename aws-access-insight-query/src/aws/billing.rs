//! AWS billing provider over the Cost Explorer client

use crate::aws::{classify_sdk_error, with_retry, RetryPolicy};
use crate::error::{AccessInsightError, AccessInsightResult};
use crate::provider::BillingProvider;
use crate::types::{CostLine, CostUsage, CostWindow, TagFilter};
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_costexplorer::types::{
    DateInterval, Expression, Granularity, GroupDefinition, GroupDefinitionType, MatchOption,
    TagValues,
};
use aws_sdk_costexplorer::Client as CostExplorerClient;
use chrono::NaiveDate;
use log::warn;

/// Cost metric queried; matches what the account's billing console shows
const COST_METRIC: &str = "BlendedCost";
const DATE_FORMAT: &str = "%Y-%m-%d";
const DEFAULT_CURRENCY: &str = "USD";

pub struct AwsBillingProvider {
    client: CostExplorerClient,
    retry: RetryPolicy,
}

impl AwsBillingProvider {
    pub fn from_config(config: &SdkConfig) -> Self {
        Self {
            client: CostExplorerClient::new(config),
            retry: RetryPolicy::default(),
        }
    }
}

#[async_trait]
impl BillingProvider for AwsBillingProvider {
    async fn cost_and_usage(
        &self,
        window: &CostWindow,
        tag_filter: Option<&TagFilter>,
    ) -> AccessInsightResult<CostUsage> {
        let period = DateInterval::builder()
            .start(window.start.format(DATE_FORMAT).to_string())
            .end(window.end.format(DATE_FORMAT).to_string())
            .build()
            .map_err(|e| AccessInsightError::provider(format!("invalid cost window: {e}")))?;

        let filter = tag_filter.map(|tag| {
            Expression::builder()
                .tags(
                    TagValues::builder()
                        .key(&tag.key)
                        .values(&tag.value)
                        .match_options(MatchOption::Equals)
                        .build(),
                )
                .build()
        });

        let group_by = GroupDefinition::builder()
            .r#type(GroupDefinitionType::Dimension)
            .key("SERVICE")
            .build();

        let mut lines = Vec::new();
        let mut next_token: Option<String> = None;
        let mut truncated = false;

        loop {
            let result = with_retry(&self.retry, "GetCostAndUsage", || {
                let mut request = self
                    .client
                    .get_cost_and_usage()
                    .time_period(period.clone())
                    .granularity(Granularity::Daily)
                    .metrics(COST_METRIC)
                    .group_by(group_by.clone());
                if let Some(filter) = &filter {
                    request = request.filter(filter.clone());
                }
                if let Some(token) = &next_token {
                    request = request.next_page_token(token);
                }
                async move {
                    request
                        .send()
                        .await
                        .map_err(|e| classify_sdk_error("GetCostAndUsage", &e))
                }
            })
            .await;

            let page = match result {
                Ok(page) => page,
                // Keep what we already have rather than discarding the run
                Err(err) if err.is_transient() && !lines.is_empty() => {
                    warn!("cost pagination abandoned after retries: {err}");
                    truncated = true;
                    break;
                }
                Err(err) => return Err(err),
            };

            for result_by_time in page.results_by_time.unwrap_or_default() {
                let Some(date) = result_by_time
                    .time_period
                    .as_ref()
                    .and_then(|p| NaiveDate::parse_from_str(&p.start, DATE_FORMAT).ok())
                else {
                    return Err(AccessInsightError::provider(
                        "GetCostAndUsage returned a result without a parsable date",
                    ));
                };

                for group in result_by_time.groups.unwrap_or_default() {
                    let service = group
                        .keys
                        .as_ref()
                        .and_then(|keys| keys.first())
                        .cloned()
                        .unwrap_or_else(|| "Unknown".to_string());

                    let Some(metric) = group.metrics.as_ref().and_then(|m| m.get(COST_METRIC))
                    else {
                        continue;
                    };

                    let amount: f64 = metric
                        .amount
                        .as_deref()
                        .unwrap_or("0")
                        .parse()
                        .map_err(|e| {
                            AccessInsightError::provider(format!(
                                "unparsable cost amount for {service} on {date}: {e}"
                            ))
                        })?;
                    let currency = metric
                        .unit
                        .clone()
                        .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());

                    lines.push(CostLine {
                        date,
                        service,
                        amount,
                        currency,
                    });
                }
            }

            next_token = page.next_page_token;
            if next_token.is_none() {
                break;
            }
        }

        Ok(CostUsage { lines, truncated })
    }
}
