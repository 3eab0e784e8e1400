//! Error types for markup-audit
//!
//! Absent attributes are not errors: they come back as `None` from the
//! document layer, because a missing `alt` or `href` is exactly what the
//! audits look for.

use thiserror::Error;

/// Errors produced while driving a browser or auditing a document
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("Failed to launch browser: {0}")]
    LaunchFailed(String),

    #[error("Failed to connect to browser: {0}")]
    ConnectionFailed(String),

    #[error("Tab operation failed: {0}")]
    TabOperationFailed(String),

    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    /// The document mutated or navigated between collecting an element and reading it
    #[error("Stale element: {0}")]
    StaleElement(String),

    /// The page context did not answer within the configured timeout
    #[error("Evaluation timed out: {0}")]
    EvaluationTimeout(String),

    #[error("Evaluation failed: {0}")]
    EvaluationFailed(String),

    #[error("Failed to parse DOM: {0}")]
    DomParseFailed(String),

    #[error("Unknown check: {0}")]
    UnknownCheck(String),

    #[error("Invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl AuditError {
    pub(crate) fn invalid_selector(selector: &str, reason: impl Into<String>) -> Self {
        AuditError::InvalidSelector {
            selector: selector.to_string(),
            reason: reason.into(),
        }
    }

    /// Whether the error means the audited snapshot is no longer consistent
    pub fn is_stale(&self) -> bool {
        matches!(self, AuditError::StaleElement(_))
    }
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, AuditError>;
