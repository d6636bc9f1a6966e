//! Orchestration controller
//!
//! Accepts a request, assigns a run identity, selects a pattern executor,
//! supervises its execution, aggregates, and returns the final envelope.
//! Owns every run for its lifetime; callers only ever see snapshots.

use crate::aggregator::{aggregate, terminal_status};
use crate::executors::{
    ConcurrentExecutor, CoordinatedExecutor, ExecutorContext, GroupChatExecutor, HandoffExecutor,
    PatternExecutor, SequentialExecutor,
};
use crate::params::OrchestratorParams;
use crate::ports::agent_client::AgentClient;
use crate::ports::progress::{NoProgress, ProgressNotifier};
use crate::trace::TraceRecorder;
use chrono::Utc;
use concierge_domain::{
    AgentRegistry, AggregatedResult, CapabilityRouter, DomainError, OrchestrationPattern,
    OrchestrationRequest, OrchestrationRun, RouterPolicy, RunId, RunStatus,
};
use serde::Serialize;
use serde_json::json;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Envelope returned by `submit`: the run identity for later trace lookup,
/// the aggregated result, and debugging counts.
#[derive(Debug, Clone, Serialize)]
pub struct SubmitResponse {
    pub run_id: RunId,
    pub status: RunStatus,
    pub result: AggregatedResult,
    pub succeeded: usize,
    pub failed: usize,
    /// Run-level failure detail (handoff bound, cancellation); partial
    /// failures are not errors and appear only in `result.failed_agents`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Builder for [`Orchestrator`], for swapping the router policy, recorder,
/// progress sink, or tuning parameters.
pub struct OrchestratorBuilder {
    registry: Arc<AgentRegistry>,
    client: Arc<dyn AgentClient>,
    recorder: Arc<TraceRecorder>,
    progress: Arc<dyn ProgressNotifier>,
    router: Arc<dyn RouterPolicy>,
    params: OrchestratorParams,
}

impl OrchestratorBuilder {
    pub fn params(mut self, params: OrchestratorParams) -> Self {
        self.params = params;
        self
    }

    pub fn recorder(mut self, recorder: Arc<TraceRecorder>) -> Self {
        self.recorder = recorder;
        self
    }

    pub fn router(mut self, router: Arc<dyn RouterPolicy>) -> Self {
        self.router = router;
        self
    }

    pub fn progress(mut self, progress: Arc<dyn ProgressNotifier>) -> Self {
        self.progress = progress;
        self
    }

    pub fn build(self) -> Orchestrator {
        Orchestrator {
            registry: self.registry,
            client: self.client,
            recorder: self.recorder,
            progress: self.progress,
            router: self.router,
            params: self.params,
            runs: Mutex::new(HashMap::new()),
        }
    }
}

/// The orchestration controller.
pub struct Orchestrator {
    registry: Arc<AgentRegistry>,
    client: Arc<dyn AgentClient>,
    recorder: Arc<TraceRecorder>,
    progress: Arc<dyn ProgressNotifier>,
    router: Arc<dyn RouterPolicy>,
    params: OrchestratorParams,
    /// Finished and in-flight run snapshots; the status-transition path is
    /// serialized through this lock so two invocations cannot race the
    /// terminal aggregation decision.
    runs: Mutex<HashMap<RunId, OrchestrationRun>>,
}

impl Orchestrator {
    pub fn builder(
        registry: Arc<AgentRegistry>,
        client: Arc<dyn AgentClient>,
    ) -> OrchestratorBuilder {
        OrchestratorBuilder {
            registry,
            client,
            recorder: Arc::new(TraceRecorder::new()),
            progress: Arc::new(NoProgress),
            router: Arc::new(CapabilityRouter),
            params: OrchestratorParams::default(),
        }
    }

    pub fn recorder(&self) -> &Arc<TraceRecorder> {
        &self.recorder
    }

    /// Submit a request and drive it to a terminal status.
    ///
    /// Only `InvalidRequest` is a synchronous rejection; every execution
    /// failure is folded into the returned envelope and the run's status.
    pub async fn submit(
        &self,
        request: OrchestrationRequest,
    ) -> Result<SubmitResponse, DomainError> {
        self.submit_with_cancellation(request, CancellationToken::new())
            .await
    }

    /// Submit with an external cancellation signal. Cancelling propagates
    /// to every in-flight invocation; the run finalizes as Failed and late
    /// completions are ignored.
    pub async fn submit_with_cancellation(
        &self,
        request: OrchestrationRequest,
        cancel: CancellationToken,
    ) -> Result<SubmitResponse, DomainError> {
        request.validate(&self.registry)?;

        let mut run = OrchestrationRun::new(request);
        let run_id = run.id().clone();
        let pattern = run.request().pattern;
        info!(%run_id, %pattern, "Run created");

        let root = self.recorder.start_span(&run_id, None, "orchestrate", None);
        let ctx = ExecutorContext {
            registry: Arc::clone(&self.registry),
            client: Arc::clone(&self.client),
            recorder: Arc::clone(&self.recorder),
            progress: Arc::clone(&self.progress),
            params: self.params.clone(),
            root_span: root.span_id().clone(),
            cancel,
        };

        run.advance(RunStatus::Running);
        self.store_snapshot(&run);

        let executor = Self::executor_for(pattern, Arc::clone(&self.router));
        let executed = executor.execute(&ctx, &mut run).await;

        run.advance(RunStatus::Aggregating);
        let mut result = aggregate(&run);

        let error = match executed {
            Ok(outcome) => {
                if let Some(review) = outcome.review {
                    result = result.with_review(review);
                }
                run.advance(terminal_status(&run));
                None
            }
            Err(e) => {
                warn!(%run_id, error = %e, "Run failed");
                run.advance(RunStatus::Failed);
                Some(e.to_string())
            }
        };

        let succeeded = run.succeeded_invocations().count();
        let failed = run.failed_invocations().count();
        let status = run.status();

        let mut attributes = BTreeMap::new();
        attributes.insert("pattern".to_string(), json!(pattern.as_str()));
        attributes.insert("status".to_string(), json!(status.as_str()));
        attributes.insert("succeeded".to_string(), json!(succeeded));
        attributes.insert("failed".to_string(), json!(failed));
        self.recorder.end_span(root, attributes);

        info!(%run_id, %status, succeeded, failed, "Run finished");
        self.store_snapshot(&run);
        self.evict_expired();

        Ok(SubmitResponse {
            run_id,
            status,
            result,
            succeeded,
            failed,
            error,
        })
    }

    /// Current snapshot of a run.
    ///
    /// Finished runs stay queryable until the retention window elapses;
    /// expired or unknown identities fail with `RunNotFound`.
    pub fn status(&self, run_id: &RunId) -> Result<OrchestrationRun, DomainError> {
        self.evict_expired();
        self.runs
            .lock()
            .expect("run store poisoned")
            .get(run_id)
            .cloned()
            .ok_or_else(|| DomainError::RunNotFound(run_id.to_string()))
    }

    fn executor_for(
        pattern: OrchestrationPattern,
        router: Arc<dyn RouterPolicy>,
    ) -> Box<dyn PatternExecutor> {
        match pattern {
            OrchestrationPattern::Coordinated => Box::new(CoordinatedExecutor),
            OrchestrationPattern::Sequential => Box::new(SequentialExecutor),
            OrchestrationPattern::Concurrent => Box::new(ConcurrentExecutor),
            OrchestrationPattern::Handoff => Box::new(HandoffExecutor::new(router)),
            OrchestrationPattern::GroupChat => Box::new(GroupChatExecutor),
        }
    }

    fn store_snapshot(&self, run: &OrchestrationRun) {
        self.runs
            .lock()
            .expect("run store poisoned")
            .insert(run.id().clone(), run.clone());
    }

    /// Lazily drop finished runs older than the retention window, along
    /// with their spans. In-flight runs are never evicted.
    fn evict_expired(&self) {
        let retention =
            chrono::Duration::from_std(self.params.retention()).unwrap_or(chrono::Duration::MAX);
        let now = Utc::now();

        let mut runs = self.runs.lock().expect("run store poisoned");
        let expired: Vec<RunId> = runs
            .iter()
            .filter_map(|(id, run)| match run.completed_at() {
                Some(completed) if now - completed > retention => Some(id.clone()),
                _ => None,
            })
            .collect();

        for id in expired {
            runs.remove(&id);
            self.recorder.evict_run(&id);
        }
    }
}
