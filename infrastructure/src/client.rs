//! Routing agent client.
//!
//! Implements the application's `AgentClient` port over the registered
//! transport strategies: resolves the strategy from the descriptor's
//! working mode, applies the per-invocation timeout, retries exactly once
//! on transient transport failure, and classifies responses that fail
//! validation as schema violations (preserving the raw body so the handoff
//! router can normalize it).

use crate::transport::{AgentTransport, TransportError};
use async_trait::async_trait;
use concierge_application::ports::agent_client::{AgentClient, AgentClientError};
use concierge_domain::{AgentDescriptor, WorkingMode};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub struct RoutingAgentClient {
    transports: Vec<Arc<dyn AgentTransport>>,
}

impl RoutingAgentClient {
    pub fn new(transports: Vec<Arc<dyn AgentTransport>>) -> Self {
        Self { transports }
    }

    fn transport_for(&self, mode: WorkingMode) -> Result<&dyn AgentTransport, AgentClientError> {
        self.transports
            .iter()
            .find(|t| t.mode() == mode)
            .map(|t| t.as_ref())
            .ok_or_else(|| AgentClientError::Transport {
                message: format!("no transport registered for working mode {}", mode),
                transient: false,
            })
    }

    /// One send attempt under the invocation timeout.
    ///
    /// A timeout is terminal: it already consumed the invocation's time
    /// budget, so it is never retried.
    async fn attempt(
        transport: &dyn AgentTransport,
        descriptor: &AgentDescriptor,
        payload: &Value,
        timeout: Duration,
    ) -> Result<String, AttemptError> {
        match tokio::time::timeout(timeout, transport.send(descriptor, payload)).await {
            Ok(result) => result.map_err(AttemptError::Transport),
            Err(_) => Err(AttemptError::Elapsed),
        }
    }

    /// Validate the raw body into a structured response.
    ///
    /// A response must parse as a JSON object; when it self-reports a
    /// `schema` field, the tag must match the descriptor's. Anything else
    /// is a schema violation, not a protocol error.
    fn validate(descriptor: &AgentDescriptor, body: String) -> Result<Value, AgentClientError> {
        let value: Value = match serde_json::from_str(&body) {
            Ok(value) => value,
            Err(_) => {
                return Err(AgentClientError::SchemaViolation {
                    reason: "response is not valid JSON".to_string(),
                    raw: Some(body),
                })
            }
        };

        if !value.is_object() {
            return Err(AgentClientError::SchemaViolation {
                reason: "response is not a JSON object".to_string(),
                raw: Some(body),
            });
        }

        if let Some(tag) = value.get("schema").and_then(Value::as_str) {
            if tag != descriptor.schema() {
                return Err(AgentClientError::SchemaViolation {
                    reason: format!(
                        "schema tag mismatch: expected {}, got {}",
                        descriptor.schema(),
                        tag
                    ),
                    raw: Some(body),
                });
            }
        }

        Ok(value)
    }
}

enum AttemptError {
    Transport(TransportError),
    Elapsed,
}

#[async_trait]
impl AgentClient for RoutingAgentClient {
    async fn invoke(
        &self,
        descriptor: &AgentDescriptor,
        payload: Value,
        timeout: Duration,
    ) -> Result<Value, AgentClientError> {
        let transport = self.transport_for(descriptor.mode())?;

        let body = match Self::attempt(transport, descriptor, &payload, timeout).await {
            Ok(body) => body,
            Err(AttemptError::Elapsed) => return Err(AgentClientError::Timeout(timeout)),
            Err(AttemptError::Transport(error)) if error.is_transient() => {
                // Exactly one retry on transient transport failure.
                warn!(
                    agent = %descriptor.capability(),
                    error = %error,
                    "Transient transport failure, retrying once"
                );
                match Self::attempt(transport, descriptor, &payload, timeout).await {
                    Ok(body) => body,
                    Err(AttemptError::Elapsed) => return Err(AgentClientError::Timeout(timeout)),
                    Err(AttemptError::Transport(error)) => {
                        return Err(AgentClientError::Transport {
                            message: error.to_string(),
                            transient: error.is_transient(),
                        })
                    }
                }
            }
            Err(AttemptError::Transport(TransportError::Agent(message))) => {
                // A well-formed agent error is terminal, never retried.
                return Err(AgentClientError::Agent(message));
            }
            Err(AttemptError::Transport(error)) => {
                return Err(AgentClientError::Transport {
                    message: error.to_string(),
                    transient: false,
                })
            }
        };

        debug!(agent = %descriptor.capability(), bytes = body.len(), "Agent responded");
        Self::validate(descriptor, body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use concierge_domain::Capability;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Transport that replays a scripted list of outcomes.
    struct ScriptedTransport {
        outcomes: Mutex<Vec<Result<String, TransportError>>>,
        attempts: AtomicUsize,
        delay: Option<Duration>,
    }

    impl ScriptedTransport {
        fn new(outcomes: Vec<Result<String, TransportError>>) -> Self {
            Self {
                outcomes: Mutex::new(outcomes),
                attempts: AtomicUsize::new(0),
                delay: None,
            }
        }

        fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        fn attempts(&self) -> usize {
            self.attempts.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl AgentTransport for ScriptedTransport {
        fn mode(&self) -> WorkingMode {
            WorkingMode::Local
        }

        async fn send(
            &self,
            _descriptor: &AgentDescriptor,
            _payload: &Value,
        ) -> Result<String, TransportError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.outcomes.lock().unwrap().remove(0)
        }
    }

    fn descriptor() -> AgentDescriptor {
        AgentDescriptor::new(
            Capability::new("inventory"),
            "checks stock levels",
            "local://inventory",
        )
        .with_mode(WorkingMode::Local)
    }

    fn client(transport: Arc<ScriptedTransport>) -> RoutingAgentClient {
        RoutingAgentClient::new(vec![transport])
    }

    #[tokio::test]
    async fn test_transient_failure_retried_once_then_succeeds() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            Err(TransportError::Connection("connection reset".to_string())),
            Ok(r#"{"items": []}"#.to_string()),
        ]));
        let client = client(Arc::clone(&transport));

        let output = client
            .invoke(&descriptor(), json!({}), Duration::from_secs(1))
            .await
            .unwrap();

        assert_eq!(output["items"], json!([]));
        assert_eq!(transport.attempts(), 2);
    }

    #[tokio::test]
    async fn test_second_transient_failure_gives_up() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            Err(TransportError::Connection("connection reset".to_string())),
            Err(TransportError::Connection("connection reset".to_string())),
        ]));
        let client = client(Arc::clone(&transport));

        let err = client
            .invoke(&descriptor(), json!({}), Duration::from_secs(1))
            .await
            .unwrap_err();

        assert!(matches!(err, AgentClientError::Transport { transient: true, .. }));
        // Exactly one retry, never a third attempt.
        assert_eq!(transport.attempts(), 2);
    }

    #[tokio::test]
    async fn test_agent_error_is_not_retried() {
        let transport = Arc::new(ScriptedTransport::new(vec![Err(TransportError::Agent(
            "no candidates".to_string(),
        ))]));
        let client = client(Arc::clone(&transport));

        let err = client
            .invoke(&descriptor(), json!({}), Duration::from_secs(1))
            .await
            .unwrap_err();

        assert!(matches!(err, AgentClientError::Agent(_)));
        assert_eq!(transport.attempts(), 1);
    }

    #[tokio::test]
    async fn test_timeout_is_terminal_and_not_retried() {
        let transport = Arc::new(
            ScriptedTransport::new(vec![Ok("{}".to_string()), Ok("{}".to_string())])
                .with_delay(Duration::from_millis(100)),
        );
        let client = client(Arc::clone(&transport));

        let err = client
            .invoke(&descriptor(), json!({}), Duration::from_millis(10))
            .await
            .unwrap_err();

        assert!(matches!(err, AgentClientError::Timeout(_)));
        assert_eq!(transport.attempts(), 1);
    }

    #[tokio::test]
    async fn test_non_json_body_is_schema_violation_with_raw() {
        let transport = Arc::new(ScriptedTransport::new(vec![Ok(
            "aisle 7, next to the compressors".to_string(),
        )]));
        let client = client(transport);

        let err = client
            .invoke(&descriptor(), json!({}), Duration::from_secs(1))
            .await
            .unwrap_err();

        assert_eq!(err.raw_body(), Some("aisle 7, next to the compressors"));
        assert!(matches!(err, AgentClientError::SchemaViolation { .. }));
    }

    #[tokio::test]
    async fn test_schema_tag_mismatch_is_schema_violation() {
        let transport = Arc::new(ScriptedTransport::new(vec![Ok(
            r#"{"schema": "catalog.v9", "items": []}"#.to_string(),
        )]));
        let client = client(transport);

        let err = client
            .invoke(&descriptor(), json!({}), Duration::from_secs(1))
            .await
            .unwrap_err();

        assert!(matches!(err, AgentClientError::SchemaViolation { reason, .. }
            if reason.contains("inventory.v1")));
    }

    #[tokio::test]
    async fn test_missing_transport_mode() {
        let client = RoutingAgentClient::new(vec![]);
        let err = client
            .invoke(&descriptor(), json!({}), Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, AgentClientError::Transport { transient: false, .. }));
    }
}
