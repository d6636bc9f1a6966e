//! Pattern executors
//!
//! One executor per orchestration strategy, all implementing the same
//! execution contract. Executors own the invocation records they create
//! and append them to the run under a single-writer discipline: slots are
//! reserved at dispatch time and results land in disjoint positions, so
//! the common case needs no locking.

pub mod concurrent;
pub mod coordinated;
pub mod group_chat;
pub mod handoff;
pub mod sequential;

use crate::params::OrchestratorParams;
use crate::ports::agent_client::{AgentClient, AgentClientError};
use crate::ports::progress::ProgressNotifier;
use crate::trace::TraceRecorder;
use async_trait::async_trait;
use concierge_domain::{
    AgentDescriptor, AgentRegistry, Capability, DomainError, OrchestrationPattern,
    OrchestrationRequest, OrchestrationRun, ReviewStatus, RunId, SpanId,
};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub use concurrent::ConcurrentExecutor;
pub use coordinated::CoordinatedExecutor;
pub use group_chat::GroupChatExecutor;
pub use handoff::HandoffExecutor;
pub use sequential::SequentialExecutor;

/// Everything an executor needs to drive invocations for one run.
#[derive(Clone)]
pub struct ExecutorContext {
    pub registry: Arc<AgentRegistry>,
    pub client: Arc<dyn AgentClient>,
    pub recorder: Arc<TraceRecorder>,
    pub progress: Arc<dyn ProgressNotifier>,
    pub params: OrchestratorParams,
    /// The run's controller-level root span; invocation spans are children.
    pub root_span: SpanId,
    pub cancel: CancellationToken,
}

impl ExecutorContext {
    /// Resolve a capability, applying the request's working-mode override
    /// so the whole run uses one self-described transport strategy.
    pub fn descriptor_for(
        &self,
        request: &OrchestrationRequest,
        capability: &Capability,
    ) -> Result<AgentDescriptor, DomainError> {
        let descriptor = self.registry.resolve(capability)?.clone();
        Ok(match request.working_mode {
            Some(mode) => descriptor.with_mode(mode),
            None => descriptor,
        })
    }

    fn timeout_for(&self, descriptor: &AgentDescriptor) -> Duration {
        descriptor
            .timeout_ms()
            .map(Duration::from_millis)
            .unwrap_or_else(|| self.params.default_timeout())
    }

    /// Invoke one agent inside a child span, racing the cancellation token.
    ///
    /// Suspension points are exactly here: everything else an executor does
    /// is synchronous relative to its owning task.
    pub async fn dispatch(
        &self,
        run_id: &RunId,
        descriptor: &AgentDescriptor,
        payload: Value,
    ) -> Result<Value, AgentClientError> {
        let span = self.recorder.start_span(
            run_id,
            Some(&self.root_span),
            format!("invoke:{}", descriptor.capability()),
            Some(descriptor.capability()),
        );

        let timeout = self.timeout_for(descriptor);
        let result = tokio::select! {
            _ = self.cancel.cancelled() => Err(AgentClientError::Cancelled),
            result = self.client.invoke(descriptor, payload, timeout) => result,
        };

        let mut attributes = BTreeMap::new();
        attributes.insert("mode".to_string(), json!(descriptor.mode().to_string()));
        match &result {
            Ok(_) => {
                attributes.insert("status".to_string(), json!("succeeded"));
            }
            Err(error) => {
                attributes.insert("status".to_string(), json!("failed"));
                attributes.insert("error".to_string(), json!(error.to_string()));
            }
        }
        self.recorder.end_span(span, attributes);

        result
    }
}

/// The base input payload every worker agent receives.
pub(crate) fn base_payload(request: &OrchestrationRequest) -> Value {
    json!({
        "query": request.query.content(),
        "userId": request.user_id,
    })
}

/// Record an invocation outcome on its reserved slot.
///
/// Returns `true` when the invocation succeeded.
pub(crate) fn record_outcome(
    run: &mut OrchestrationRun,
    index: usize,
    result: Result<Value, AgentClientError>,
    progress: &dyn ProgressNotifier,
) -> bool {
    let capability = run.invocations()[index].capability.clone();
    let succeeded = match result {
        Ok(output) => {
            run.invocation_mut(index).succeed(output);
            true
        }
        Err(error) => {
            run.invocation_mut(index)
                .fail(error.invocation_kind(), error.to_string());
            false
        }
    };
    progress.on_invocation_complete(&capability, succeeded);
    succeeded
}

/// Result of one pattern execution, summarized for the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutorOutcome {
    pub succeeded: usize,
    pub failed: usize,
    /// Only the GroupChat pattern sets a review tag.
    pub review: Option<ReviewStatus>,
}

impl ExecutorOutcome {
    pub fn from_run(run: &OrchestrationRun) -> Self {
        Self {
            succeeded: run.succeeded_invocations().count(),
            failed: run.failed_invocations().count(),
            review: None,
        }
    }

    pub fn with_review(mut self, review: ReviewStatus) -> Self {
        self.review = Some(review);
        self
    }
}

/// Common execution contract for all orchestration strategies.
#[async_trait]
pub trait PatternExecutor: Send + Sync {
    fn pattern(&self) -> OrchestrationPattern;

    /// Drive the run's invocations to completion.
    ///
    /// Partial failures are recorded on the run, not returned as errors;
    /// an `Err` here fails the whole run (handoff bound exhaustion,
    /// cancellation).
    async fn execute(
        &self,
        ctx: &ExecutorContext,
        run: &mut OrchestrationRun,
    ) -> Result<ExecutorOutcome, DomainError>;
}
