//! JSON-over-HTTP transport to worker agent services.

use super::{AgentTransport, TransportError};
use async_trait::async_trait;
use concierge_domain::{AgentDescriptor, WorkingMode};
use serde_json::Value;
use tracing::debug;

/// POSTs the payload to the descriptor's endpoint and returns the body.
///
/// Status mapping: 2xx is a response body (validated upstream), 5xx is a
/// transient connection-class failure, any other status is an agent-level
/// error carrying the body as detail.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AgentTransport for HttpTransport {
    fn mode(&self) -> WorkingMode {
        WorkingMode::HttpJson
    }

    async fn send(
        &self,
        descriptor: &AgentDescriptor,
        payload: &Value,
    ) -> Result<String, TransportError> {
        debug!(agent = %descriptor.capability(), endpoint = descriptor.endpoint(), "HTTP dispatch");

        let response = self
            .client
            .post(descriptor.endpoint())
            .json(payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() || e.is_timeout() {
                    TransportError::Connection(e.to_string())
                } else {
                    TransportError::Request(e.to_string())
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Connection(e.to_string()))?;

        if status.is_success() {
            Ok(body)
        } else if status.is_server_error() {
            Err(TransportError::Connection(format!(
                "agent returned {}",
                status
            )))
        } else {
            Err(TransportError::Agent(format!(
                "agent returned {}: {}",
                status, body
            )))
        }
    }
}
