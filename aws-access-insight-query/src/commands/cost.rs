//! Cost analysis for the Access Insight service

use crate::error::AccessInsightResult;
use crate::types::{CostQuery, CostReport, CostUsage, CostWindow, DailyCost, ServiceCost};
use chrono::{Days, Utc};
use std::collections::BTreeMap;

impl super::service::AccessInsightService {
    /// Break down the account's cost over the trailing
    /// `[today - lookback_days, today)` window, grouped by day and by
    /// service, optionally restricted to one tag key/value pair.
    ///
    /// A window with no cost entries yields an empty breakdown with a zero
    /// total, not an error. The total always equals the sum of the daily
    /// amounts that were returned.
    pub async fn get_cost_analysis(&self, query: &CostQuery) -> AccessInsightResult<CostReport> {
        query.validate()?;

        let end = Utc::now().date_naive();
        let start = end
            .checked_sub_days(Days::new(query.lookback_days.unsigned_abs()))
            .unwrap_or(end);
        let window = CostWindow { start, end };

        let usage = self
            .billing
            .cost_and_usage(&window, query.tag_filter.as_ref())
            .await?;

        Ok(aggregate_usage(&window, usage))
    }
}

/// Reduce raw billing lines into the daily/per-service breakdown and total.
fn aggregate_usage(window: &CostWindow, usage: CostUsage) -> CostReport {
    let mut daily: BTreeMap<chrono::NaiveDate, f64> = BTreeMap::new();
    let mut by_service: BTreeMap<String, f64> = BTreeMap::new();
    let mut total = 0.0;
    let mut currency: Option<String> = None;

    for line in usage.lines {
        *daily.entry(line.date).or_insert(0.0) += line.amount;
        *by_service.entry(line.service).or_insert(0.0) += line.amount;
        total += line.amount;
        currency.get_or_insert(line.currency);
    }

    let daily = daily
        .into_iter()
        .map(|(date, amount)| DailyCost { date, amount })
        .collect();

    let mut by_service: Vec<ServiceCost> = by_service
        .into_iter()
        .map(|(service, amount)| ServiceCost { service, amount })
        .collect();
    // Largest spenders first; ties keep the alphabetical map order
    by_service.sort_by(|a, b| b.amount.total_cmp(&a.amount));

    CostReport {
        start: window.start,
        end: window.end,
        daily,
        by_service,
        total,
        currency: currency.unwrap_or_else(|| "USD".to_string()),
        incomplete: usage.truncated,
    }
}
