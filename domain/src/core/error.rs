//! Domain error types

use thiserror::Error;

/// Domain-level errors
///
/// This is the full error taxonomy for the orchestration core. Only
/// `InvalidRequest` and `RunNotFound` are surfaced as synchronous rejections
/// to callers; everything else is folded into the run's invocation records
/// and terminal status.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Unknown agent: {0}")]
    UnknownAgent(String),

    #[error("Invocation failed for agent {agent}: {message}")]
    InvocationFailure { agent: String, message: String },

    #[error("Schema violation from agent {agent}: {reason}")]
    SchemaViolation { agent: String, reason: String },

    #[error("Invocation timed out for agent {0}")]
    Timeout(String),

    #[error("Handoff limit of {limit} exceeded without a terminal decision")]
    HandoffLimitExceeded { limit: usize },

    #[error("Run not found: {0}")]
    RunNotFound(String),

    #[error("Operation cancelled")]
    Cancelled,
}

impl DomainError {
    /// Check if this error represents a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, DomainError::Cancelled)
    }

    /// Check if this error is a synchronous rejection (raised before or
    /// outside any invocation, never folded into a run)
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            DomainError::InvalidRequest(_) | DomainError::RunNotFound(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancelled_error_display() {
        let error = DomainError::Cancelled;
        assert_eq!(error.to_string(), "Operation cancelled");
    }

    #[test]
    fn test_is_cancelled_check() {
        assert!(DomainError::Cancelled.is_cancelled());
        assert!(!DomainError::UnknownAgent("inventory".to_string()).is_cancelled());
        assert!(!DomainError::HandoffLimitExceeded { limit: 5 }.is_cancelled());
    }

    #[test]
    fn test_rejection_classification() {
        assert!(DomainError::InvalidRequest("empty agent list".to_string()).is_rejection());
        assert!(DomainError::RunNotFound("run-1".to_string()).is_rejection());
        assert!(!DomainError::Timeout("navigation".to_string()).is_rejection());
        assert!(!DomainError::Cancelled.is_rejection());
    }
}
