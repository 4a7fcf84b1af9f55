//! Application layer errors.
//!
//! These errors represent failures talking to collaborators, not form logic.
//! Form addressing errors are `DomainError` from `crate::domain`.

use thiserror::Error;

use crate::error::ErrorCategory;

/// Errors that occur while orchestrating the registration flow.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApplicationError {
    /// A collaborator call failed (network, server error, simulated failure).
    #[error("{operation} failed: {reason}")]
    RequestFailed {
        operation: &'static str,
        reason: String,
    },

    /// A collaborator answered with something we cannot use.
    #[error("Malformed {operation} response: {reason}")]
    MalformedResponse {
        operation: &'static str,
        reason: String,
    },

    /// Shared adapter state is unusable after a panic.
    #[error("Service state lock poisoned: {name}")]
    LockPoisoned { name: &'static str },

    /// Port/Adapter not configured.
    #[error("Required adapter not configured: {name}")]
    AdapterNotConfigured { name: &'static str },
}

impl ApplicationError {
    pub fn request_failed(operation: &'static str, reason: impl Into<String>) -> Self {
        Self::RequestFailed {
            operation,
            reason: reason.into(),
        }
    }

    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::RequestFailed { operation, .. } => vec![
                format!("The {operation} call did not complete"),
                "Nothing is retried automatically; run the command again".into(),
            ],
            Self::MalformedResponse { .. } => vec![
                "Check the fixture file against the documented format".into(),
            ],
            Self::LockPoisoned { .. } => vec!["Try again in a moment".into()],
            Self::AdapterNotConfigured { name } => vec![
                format!("Required component not configured: {name}"),
                "Set service.fixture or pass --fixture".into(),
            ],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::RequestFailed { .. } | Self::MalformedResponse { .. } => ErrorCategory::Service,
            Self::LockPoisoned { .. } => ErrorCategory::Internal,
            Self::AdapterNotConfigured { .. } => ErrorCategory::Configuration,
        }
    }
}
