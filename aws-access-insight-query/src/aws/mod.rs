//! AWS SDK integration: provider implementations, ARN parsing, error
//! classification, and bounded retry.

pub(crate) mod billing;
pub(crate) mod identity;
pub mod principal;

use crate::error::{AccessInsightError, AccessInsightResult};
use aws_sdk_iam::error::ProvideErrorMetadata;
use log::debug;
use std::future::Future;
use std::time::Duration;

/// Bounded retry with exponential backoff for transient provider errors
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(200),
        }
    }
}

/// Run `call` until it succeeds, fails non-transiently, or the attempt
/// budget runs out. Only transient errors are retried; permissions problems
/// do not improve with repetition.
pub(crate) async fn with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    operation: &str,
    mut call: F,
) -> AccessInsightResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = AccessInsightResult<T>>,
{
    let mut attempt: u32 = 0;
    loop {
        match call().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_transient() && attempt + 1 < policy.max_attempts => {
                let delay = policy.base_delay * 2u32.saturating_pow(attempt);
                debug!(
                    "{operation} hit a transient error (attempt {}), retrying in {delay:?}: {err}",
                    attempt + 1
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

/// Map an SDK error into the Access Insight taxonomy using the provider's
/// error code. Codeless failures (dispatch errors, connect timeouts) are
/// treated as transient.
pub(crate) fn classify_sdk_error<E>(operation: &str, err: &E) -> AccessInsightError
where
    E: ProvideErrorMetadata + std::fmt::Display,
{
    let message = err
        .message()
        .map_or_else(|| err.to_string(), ToString::to_string);
    classify_code(operation, err.code(), &message)
}

fn classify_code(operation: &str, code: Option<&str>, message: &str) -> AccessInsightError {
    match code {
        Some(
            "AccessDenied" | "AccessDeniedException" | "UnauthorizedOperation"
            | "UnrecognizedClientException" | "InvalidClientTokenId" | "ExpiredToken"
            | "ExpiredTokenException",
        ) => AccessInsightError::authorization(format!("{operation}: {message}")),
        Some("NoSuchEntity" | "NoSuchEntityException" | "ResourceNotFoundException") => {
            AccessInsightError::not_found(format!("{operation}: {message}"))
        }
        Some(
            "Throttling" | "ThrottlingException" | "RequestLimitExceeded"
            | "TooManyRequestsException" | "LimitExceededException" | "ServiceUnavailable"
            | "ServiceUnavailableException" | "RequestTimeout" | "RequestTimeoutException",
        )
        | None => AccessInsightError::transient(format!("{operation}: {message}")),
        Some(other) => {
            AccessInsightError::provider(format!("{operation}: {other}: {message}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_classify_code_authorization() {
        let err = classify_code("SimulatePrincipalPolicy", Some("AccessDenied"), "denied");
        assert!(err.is_authorization());
    }

    #[test]
    fn test_classify_code_not_found() {
        let err = classify_code("SimulatePrincipalPolicy", Some("NoSuchEntity"), "gone");
        assert!(matches!(err, AccessInsightError::NotFound(_)));
    }

    #[test]
    fn test_classify_code_transient() {
        assert!(classify_code("ListUsers", Some("Throttling"), "slow down").is_transient());
        // Dispatch failures carry no service code
        assert!(classify_code("ListUsers", None, "connection reset").is_transient());
    }

    #[test]
    fn test_classify_code_other() {
        let err = classify_code("GetCostAndUsage", Some("DataUnavailableException"), "oops");
        assert!(matches!(err, AccessInsightError::Provider(_)));
    }

    #[tokio::test]
    async fn test_with_retry_recovers_from_transient_errors() {
        let policy = RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(1),
        };
        let calls = AtomicUsize::new(0);

        let result = with_retry(&policy, "test", || {
            let attempt = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt < 2 {
                    Err(AccessInsightError::transient("throttled"))
                } else {
                    Ok(attempt)
                }
            }
        })
        .await;

        assert_eq!(result.expect("recovers"), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_with_retry_does_not_retry_authorization() {
        let policy = RetryPolicy::default();
        let calls = AtomicUsize::new(0);

        let result: AccessInsightResult<()> = with_retry(&policy, "test", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(AccessInsightError::authorization("denied")) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_with_retry_exhausts_attempt_budget() {
        let policy = RetryPolicy {
            max_attempts: 2,
            base_delay: Duration::from_millis(1),
        };
        let calls = AtomicUsize::new(0);

        let result: AccessInsightResult<()> = with_retry(&policy, "test", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(AccessInsightError::transient("throttled")) }
        })
        .await;

        assert!(result.expect_err("exhausted").is_transient());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
