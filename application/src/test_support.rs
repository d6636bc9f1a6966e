//! Shared test fixtures: a scripted agent client and executor contexts.

use crate::executors::ExecutorContext;
use crate::params::OrchestratorParams;
use crate::ports::agent_client::{AgentClient, AgentClientError};
use crate::ports::progress::NoProgress;
use crate::trace::TraceRecorder;
use async_trait::async_trait;
use concierge_domain::{AgentDescriptor, AgentRegistry, Capability, SpanId, WorkingMode};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Scripted agent client: per-capability behaviors plus a default, with a
/// shared call log for asserting on dispatched payloads.
#[derive(Clone, Default)]
pub struct MockAgentClient {
    behaviors: Arc<Mutex<HashMap<String, Result<Value, AgentClientError>>>>,
    default: Arc<Mutex<Option<Result<Value, AgentClientError>>>>,
    calls: Arc<Mutex<Vec<(String, Value)>>>,
}

impl MockAgentClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn succeed_all(self, output: Value) -> Self {
        *self.default.lock().unwrap() = Some(Ok(output));
        self
    }

    pub fn succeed_capability(self, capability: &str, output: Value) -> Self {
        self.behaviors
            .lock()
            .unwrap()
            .insert(capability.to_string(), Ok(output));
        self
    }

    pub fn fail_agent(self, capability: &str, message: &str) -> Self {
        self.behaviors.lock().unwrap().insert(
            capability.to_string(),
            Err(AgentClientError::Agent(message.to_string())),
        );
        self
    }

    pub fn fail_transport(self, capability: &str, message: &str) -> Self {
        self.behaviors.lock().unwrap().insert(
            capability.to_string(),
            Err(AgentClientError::Transport {
                message: message.to_string(),
                transient: true,
            }),
        );
        self
    }

    pub fn fail_timeout(self, capability: &str) -> Self {
        self.behaviors.lock().unwrap().insert(
            capability.to_string(),
            Err(AgentClientError::Timeout(Duration::from_millis(50))),
        );
        self
    }

    pub fn fail_schema(self, capability: &str, raw: &str) -> Self {
        self.behaviors.lock().unwrap().insert(
            capability.to_string(),
            Err(AgentClientError::SchemaViolation {
                reason: "response is not valid JSON".to_string(),
                raw: Some(raw.to_string()),
            }),
        );
        self
    }

    /// Every `(capability, payload)` pair invoked so far, in call order.
    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl AgentClient for MockAgentClient {
    async fn invoke(
        &self,
        descriptor: &AgentDescriptor,
        payload: Value,
        _timeout: Duration,
    ) -> Result<Value, AgentClientError> {
        let capability = descriptor.capability().as_str().to_string();
        self.calls
            .lock()
            .unwrap()
            .push((capability.clone(), payload.clone()));

        if let Some(result) = self.behaviors.lock().unwrap().get(&capability) {
            return result.clone();
        }
        if let Some(result) = self.default.lock().unwrap().as_ref() {
            return result.clone();
        }
        Ok(json!({ "echo": payload }))
    }
}

/// The four-capability storefront registry used across tests.
pub fn demo_registry() -> AgentRegistry {
    AgentRegistry::from_descriptors(vec![
        AgentDescriptor::new(
            Capability::new("inventory"),
            "checks stock levels and price for products",
            "local://inventory",
        )
        .with_mode(WorkingMode::Local),
        AgentDescriptor::new(
            Capability::new("matchmaking"),
            "recommends alternative and related products",
            "local://matchmaking",
        )
        .with_mode(WorkingMode::Local),
        AgentDescriptor::new(
            Capability::new("location"),
            "finds the aisle and shelf where items are stocked",
            "local://location",
        )
        .with_mode(WorkingMode::Local),
        AgentDescriptor::new(
            Capability::new("navigation"),
            "gives walking directions to a shelf in the store",
            "local://navigation",
        )
        .with_mode(WorkingMode::Local),
    ])
    .unwrap()
}

/// Executor context over the given registry and client, with default
/// params, a fresh recorder, and no progress reporting.
pub fn context_with_client(registry: AgentRegistry, client: MockAgentClient) -> ExecutorContext {
    ExecutorContext {
        registry: Arc::new(registry),
        client: Arc::new(client),
        recorder: Arc::new(TraceRecorder::new()),
        progress: Arc::new(NoProgress),
        params: OrchestratorParams::default(),
        root_span: SpanId::generate(),
        cancel: CancellationToken::new(),
    }
}
