//! Agent invocation client port
//!
//! Defines the uniform request/response interface to worker agents.
//! Implementations (adapters) live in the infrastructure layer and own the
//! transport strategy, the per-invocation timeout, and the single retry on
//! transient transport failure.

use async_trait::async_trait;
use concierge_domain::{AgentDescriptor, InvocationErrorKind};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while invoking a worker agent.
///
/// The adapter has already exhausted its retry policy by the time one of
/// these surfaces; executors record them on the invocation and decide
/// whether to fail, skip, or route around.
#[derive(Error, Debug, Clone)]
pub enum AgentClientError {
    #[error("Transport error: {message}")]
    Transport { message: String, transient: bool },

    #[error("Invocation timed out after {0:?}")]
    Timeout(Duration),

    /// Agent responded but the payload failed validation. `raw` preserves
    /// the body so the handoff router can normalize it.
    #[error("Schema violation: {reason}")]
    SchemaViolation { reason: String, raw: Option<String> },

    /// Well-formed error response from the agent itself; never retried.
    #[error("Agent error: {0}")]
    Agent(String),

    #[error("Invocation cancelled")]
    Cancelled,
}

impl AgentClientError {
    /// Map to the per-invocation error classification recorded on the run.
    pub fn invocation_kind(&self) -> InvocationErrorKind {
        match self {
            AgentClientError::Transport { .. } => InvocationErrorKind::Transport,
            AgentClientError::Timeout(_) => InvocationErrorKind::Timeout,
            AgentClientError::SchemaViolation { .. } => InvocationErrorKind::SchemaViolation,
            AgentClientError::Agent(_) => InvocationErrorKind::Agent,
            AgentClientError::Cancelled => InvocationErrorKind::Cancelled,
        }
    }

    /// The raw body of a schema-violating response, when the agent sent one.
    pub fn raw_body(&self) -> Option<&str> {
        match self {
            AgentClientError::SchemaViolation { raw, .. } => raw.as_deref(),
            _ => None,
        }
    }
}

/// Uniform transport to worker agents.
///
/// Contract: apply the given timeout to the whole invocation; retry exactly
/// once on transient transport failure; never retry agent-level errors or
/// schema violations; classify unparseable or mis-tagged responses as
/// `SchemaViolation` rather than a transport error.
#[async_trait]
pub trait AgentClient: Send + Sync {
    async fn invoke(
        &self,
        descriptor: &AgentDescriptor,
        payload: Value,
        timeout: Duration,
    ) -> Result<Value, AgentClientError>;
}
