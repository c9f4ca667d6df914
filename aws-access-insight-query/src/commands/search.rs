//! Account-wide access search for the Access Insight service

use crate::error::{AccessInsightError, AccessInsightResult};
use crate::types::{AccessDecision, AccessEntry, AccessQuery, AccessReport, Principal};
use futures::stream::{self, StreamExt};
use log::warn;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::time::{timeout, timeout_at, Instant};

/// Per-principal simulation outcome collected during fan-out
enum SimOutcome {
    Decision(AccessDecision),
    Failed(AccessInsightError),
    TimedOut,
}

impl super::service::AccessInsightService {
    /// Search which users and roles can perform `action` on `resource`.
    ///
    /// Enumerates every principal in the account and simulates the action
    /// for each with bounded concurrency. A failure or timeout for one
    /// principal does not abort the rest: that principal is reported with an
    /// Unknown decision and the report is marked incomplete. Denied
    /// principals are omitted from the report.
    ///
    /// The entry order follows the provider's enumeration order; callers
    /// must not rely on it being stable across invocations.
    pub async fn search_access(&self, query: &AccessQuery) -> AccessInsightResult<AccessReport> {
        query.validate()?;

        let principals = self.identity.list_principals().await?;
        let deadline = Instant::now() + self.limits.search_deadline;

        let mut outcomes: Vec<(usize, Principal, SimOutcome)> =
            stream::iter(principals.into_iter().enumerate())
                .map(|(index, principal)| {
                    let identity = Arc::clone(&self.identity);
                    let action = query.action.clone();
                    let resource = query.resource.clone();
                    let per_call = self.limits.simulate_timeout;
                    async move {
                        let simulation = async {
                            identity
                                .simulate_action(&principal.arn, &action, &resource)
                                .await
                        };
                        let outcome = match timeout_at(deadline, timeout(per_call, simulation)).await
                        {
                            Ok(Ok(Ok(decision))) => SimOutcome::Decision(decision),
                            Ok(Ok(Err(err))) => SimOutcome::Failed(err),
                            Ok(Err(_)) | Err(_) => SimOutcome::TimedOut,
                        };
                        (index, principal, outcome)
                    }
                })
                .buffer_unordered(self.limits.simulate_concurrency.max(1))
                .collect()
                .await;

        // Completion order is arbitrary; restore enumeration order so the
        // result is deterministic for deterministic providers.
        outcomes.sort_by_key(|(index, _, _)| *index);

        // A denial for every single simulation means the calling credentials
        // lack simulation permission; surface that instead of a report full
        // of unknowns.
        let all_authorization = !outcomes.is_empty()
            && outcomes
                .iter()
                .all(|(_, _, o)| matches!(o, SimOutcome::Failed(e) if e.is_authorization()));
        if all_authorization {
            return Err(outcomes
                .into_iter()
                .find_map(|(_, _, outcome)| match outcome {
                    SimOutcome::Failed(err) => Some(err),
                    _ => None,
                })
                .unwrap_or_else(|| {
                    AccessInsightError::authorization("policy simulation denied")
                }));
        }

        let mut seen = HashSet::new();
        let mut entries = Vec::new();
        let mut scanned = 0usize;
        let mut incomplete = false;

        for (_, principal, outcome) in outcomes {
            if !seen.insert(principal.arn.clone()) {
                continue;
            }
            scanned += 1;
            match outcome {
                SimOutcome::Decision(AccessDecision::Allowed) => entries.push(AccessEntry {
                    principal_arn: principal.arn,
                    kind: principal.kind,
                    decision: AccessDecision::Allowed,
                }),
                SimOutcome::Decision(_) => {}
                SimOutcome::Failed(err) => {
                    warn!("simulation failed for {}: {err}", principal.arn);
                    incomplete = true;
                    entries.push(AccessEntry {
                        principal_arn: principal.arn,
                        kind: principal.kind,
                        decision: AccessDecision::Unknown,
                    });
                }
                SimOutcome::TimedOut => {
                    warn!("simulation timed out for {}", principal.arn);
                    incomplete = true;
                    entries.push(AccessEntry {
                        principal_arn: principal.arn,
                        kind: principal.kind,
                        decision: AccessDecision::Unknown,
                    });
                }
            }
        }

        Ok(AccessReport {
            action: query.action.clone(),
            resource: query.resource.clone(),
            entries,
            scanned,
            incomplete,
        })
    }
}
