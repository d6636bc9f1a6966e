//! Working-mode transport strategies.
//!
//! Each worker agent declares how it is reached (its working mode); the
//! matching [`AgentTransport`] strategy is selected at
//! descriptor-resolution time by the
//! [`RoutingAgentClient`](crate::client::RoutingAgentClient). Transports
//! move raw bytes only: parsing, schema validation, timeout, and retry
//! policy all live one layer up in the client.

pub mod http;
pub mod local;

use async_trait::async_trait;
use concierge_domain::{AgentDescriptor, WorkingMode};
use serde_json::Value;
use thiserror::Error;

pub use http::HttpTransport;
pub use local::LocalTransport;

/// Errors raised while moving a request to an agent and its response back.
#[derive(Error, Debug)]
pub enum TransportError {
    /// Transient wire failure (connection refused/reset, 5xx); worth the
    /// one retry the client applies.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Non-transient transport failure; never retried.
    #[error("Request failed: {0}")]
    Request(String),

    /// Well-formed error response from the agent itself; never retried.
    #[error("Agent error: {0}")]
    Agent(String),
}

impl TransportError {
    pub fn is_transient(&self) -> bool {
        matches!(self, TransportError::Connection(_))
    }
}

/// One way of reaching worker agents.
#[async_trait]
pub trait AgentTransport: Send + Sync {
    /// The working mode this strategy serves.
    fn mode(&self) -> WorkingMode;

    /// Deliver the payload and return the raw response body.
    async fn send(
        &self,
        descriptor: &AgentDescriptor,
        payload: &Value,
    ) -> Result<String, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_connection_errors_are_transient() {
        assert!(TransportError::Connection("reset".to_string()).is_transient());
        assert!(!TransportError::Request("bad url".to_string()).is_transient());
        assert!(!TransportError::Agent("no candidates".to_string()).is_transient());
    }
}
