//! Concurrent pattern executor.
//!
//! All requested agents are dispatched simultaneously with no data
//! dependency between them; each runs against the original query only.
//! One agent's failure does not affect the others. The join waits for
//! every dispatched invocation, success or failure, never a subset. No
//! response coherence is attempted: incoherence between independently
//! produced outputs is a known characteristic of this mode and is
//! surfaced verbatim to the aggregator.

use super::{base_payload, record_outcome, ExecutorContext, ExecutorOutcome, PatternExecutor};
use async_trait::async_trait;
use concierge_domain::{DomainError, OrchestrationPattern, OrchestrationRun};
use tokio::task::JoinSet;
use tracing::{info, warn};

pub struct ConcurrentExecutor;

#[async_trait]
impl PatternExecutor for ConcurrentExecutor {
    fn pattern(&self) -> OrchestrationPattern {
        OrchestrationPattern::Concurrent
    }

    async fn execute(
        &self,
        ctx: &ExecutorContext,
        run: &mut OrchestrationRun,
    ) -> Result<ExecutorOutcome, DomainError> {
        let request = run.request().clone();
        let agents = if request.agent_sequence.is_empty() {
            ctx.registry
                .all()
                .iter()
                .map(|d| d.capability().clone())
                .collect()
        } else {
            request.agent_sequence.clone()
        };

        info!(run_id = %run.id(), agents = agents.len(), "Concurrent fan-out starting");
        ctx.progress.on_pattern_start(self.pattern(), agents.len());

        // Resolve every descriptor before dispatching anything, so a
        // registry miss rejects the fan-out instead of landing mid-flight.
        let mut resolved = Vec::with_capacity(agents.len());
        for capability in agents {
            let descriptor = ctx.descriptor_for(&request, &capability)?;
            resolved.push((capability, descriptor));
        }

        // Reserve disjoint slots up front: parallel results land in
        // pre-assigned positions and only this task writes them.
        let mut join_set = JoinSet::new();
        for (capability, descriptor) in resolved {
            let index = run.reserve_invocation(capability, base_payload(&request));
            run.invocation_mut(index).mark_dispatched();

            let ctx = ctx.clone();
            let run_id = run.id().clone();
            let payload = base_payload(&request);
            join_set.spawn(async move {
                let result = ctx.dispatch(&run_id, &descriptor, payload).await;
                (index, result)
            });
        }

        // Join waits for all dispatched invocations, never a subset.
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((index, result)) => {
                    record_outcome(run, index, result, ctx.progress.as_ref());
                }
                Err(e) => {
                    warn!("Task join error: {}", e);
                }
            }
        }

        ctx.progress.on_pattern_complete(self.pattern());
        if ctx.cancel.is_cancelled() {
            return Err(DomainError::Cancelled);
        }
        Ok(ExecutorOutcome::from_run(run))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{context_with_client, demo_registry, MockAgentClient};
    use concierge_domain::{Capability, OrchestrationRequest, RunStatus};
    use serde_json::json;

    fn run(agents: &[&str]) -> OrchestrationRun {
        let mut run = OrchestrationRun::new(
            OrchestrationRequest::new("compare camping stoves", "user-1")
                .with_agents(agents.iter().map(|a| Capability::new(*a)).collect()),
        );
        run.advance(RunStatus::Running);
        run
    }

    #[tokio::test]
    async fn test_one_failure_does_not_affect_siblings() {
        let client = MockAgentClient::new()
            .succeed_all(json!({"ok": true}))
            .fail_agent("matchmaking", "no candidates");
        let ctx = context_with_client(demo_registry(), client);
        let mut run = run(&["inventory", "matchmaking", "location"]);

        let outcome = ConcurrentExecutor.execute(&ctx, &mut run).await.unwrap();

        assert_eq!(outcome.succeeded, 2);
        assert_eq!(outcome.failed, 1);
        let failed: Vec<&str> = run
            .failed_invocations()
            .map(|i| i.capability.as_str())
            .collect();
        assert_eq!(failed, vec!["matchmaking"]);
    }

    #[tokio::test]
    async fn test_empty_sequence_fans_out_to_whole_registry() {
        let client = MockAgentClient::new().succeed_all(json!({"ok": true}));
        let ctx = context_with_client(demo_registry(), client);
        let mut run = run(&[]);

        let outcome = ConcurrentExecutor.execute(&ctx, &mut run).await.unwrap();
        assert_eq!(outcome.succeeded, 4);
    }

    #[tokio::test]
    async fn test_inputs_carry_only_the_original_query() {
        let client = MockAgentClient::new().succeed_all(json!({"ok": true}));
        let ctx = context_with_client(demo_registry(), client.clone());
        let mut run = run(&["inventory", "location"]);

        ConcurrentExecutor.execute(&ctx, &mut run).await.unwrap();

        for (_, payload) in client.calls() {
            assert_eq!(payload["query"], json!("compare camping stoves"));
            assert!(payload.get("context").is_none());
        }
    }
}
