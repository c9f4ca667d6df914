//! Error taxonomy for Access Insight operations

use thiserror::Error;

/// Main error type for Access Insight operations
#[derive(Error, Debug)]
pub enum AccessInsightError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("not authorized: {0}")]
    Authorization(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("transient provider error: {0}")]
    Transient(String),

    #[error("provider error: {0}")]
    Provider(String),
}

/// Result type alias
pub type AccessInsightResult<T> = Result<T, AccessInsightError>;

impl AccessInsightError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
    pub fn authorization(msg: impl Into<String>) -> Self {
        Self::Authorization(msg.into())
    }
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }
    pub fn transient(msg: impl Into<String>) -> Self {
        Self::Transient(msg.into())
    }
    pub fn provider(msg: impl Into<String>) -> Self {
        Self::Provider(msg.into())
    }

    /// Whether a bounded retry with backoff is worthwhile
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }

    #[must_use]
    pub fn is_authorization(&self) -> bool {
        matches!(self, Self::Authorization(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = AccessInsightError::validation("action must look like service:Operation");
        assert!(error.to_string().starts_with("validation error"));

        let error = AccessInsightError::authorization("iam:ListUsers denied");
        assert!(error.to_string().contains("not authorized"));
    }

    #[test]
    fn test_transient_classification() {
        assert!(AccessInsightError::transient("throttled").is_transient());
        assert!(!AccessInsightError::provider("bad payload").is_transient());
        assert!(!AccessInsightError::authorization("denied").is_transient());
    }

    #[test]
    fn test_authorization_classification() {
        assert!(AccessInsightError::authorization("denied").is_authorization());
        assert!(!AccessInsightError::not_found("no such user").is_authorization());
    }
}
