//! Coordinated (default) pattern executor.
//!
//! A fixed internal plan decides agent order deterministically from static
//! request classification. The baseline pattern used when no explicit
//! pattern is requested: reproducible ordering, no cross-agent data.

use super::{base_payload, record_outcome, ExecutorContext, ExecutorOutcome, PatternExecutor};
use async_trait::async_trait;
use concierge_domain::{
    Capability, DomainError, OrchestrationPattern, OrchestrationRun,
};
use tracing::{debug, info};

/// The fixed product-query plan. Capabilities missing from the registry
/// are simply not part of the plan for that deployment.
const PRODUCT_PLAN: [&str; 4] = ["inventory", "matchmaking", "location", "navigation"];

pub struct CoordinatedExecutor;

impl CoordinatedExecutor {
    /// Classify the request into a deterministic agent plan.
    ///
    /// Every query currently classifies as a product query; the plan is
    /// the fixed order intersected with the registry. An empty
    /// intersection falls back to registration order so small registries
    /// still orchestrate.
    fn plan(&self, ctx: &ExecutorContext) -> Vec<Capability> {
        let planned: Vec<Capability> = PRODUCT_PLAN
            .iter()
            .map(|name| Capability::new(*name))
            .filter(|c| ctx.registry.contains(c))
            .collect();

        if planned.is_empty() {
            ctx.registry
                .all()
                .iter()
                .map(|d| d.capability().clone())
                .collect()
        } else {
            planned
        }
    }
}

#[async_trait]
impl PatternExecutor for CoordinatedExecutor {
    fn pattern(&self) -> OrchestrationPattern {
        OrchestrationPattern::Coordinated
    }

    async fn execute(
        &self,
        ctx: &ExecutorContext,
        run: &mut OrchestrationRun,
    ) -> Result<ExecutorOutcome, DomainError> {
        let plan = self.plan(ctx);
        info!(run_id = %run.id(), agents = plan.len(), "Coordinated plan resolved");
        ctx.progress.on_pattern_start(self.pattern(), plan.len());

        let request = run.request().clone();
        let mut halted = false;

        for capability in plan {
            if halted {
                let index = run.reserve_invocation(capability, base_payload(&request));
                run.invocation_mut(index).skip();
                continue;
            }
            if ctx.cancel.is_cancelled() {
                return Err(DomainError::Cancelled);
            }

            let descriptor = ctx.descriptor_for(&request, &capability)?;
            let index = run.reserve_invocation(capability.clone(), base_payload(&request));
            run.invocation_mut(index).mark_dispatched();

            let result = ctx
                .dispatch(run.id(), &descriptor, base_payload(&request))
                .await;
            if !record_outcome(run, index, result, ctx.progress.as_ref()) {
                // One failure halts the plan; remaining agents are skipped.
                debug!(agent = %capability, "Coordinated plan halted");
                halted = true;
            }
        }

        ctx.progress.on_pattern_complete(self.pattern());
        Ok(ExecutorOutcome::from_run(run))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{context_with_client, demo_registry, MockAgentClient};
    use concierge_domain::{InvocationStatus, OrchestrationRequest, RunStatus};
    use serde_json::json;

    fn run() -> OrchestrationRun {
        let mut run = OrchestrationRun::new(OrchestrationRequest::new(
            "paint sprayer turbo price 750",
            "user-1",
        ));
        run.advance(RunStatus::Running);
        run
    }

    #[tokio::test]
    async fn test_plan_follows_fixed_order() {
        let client = MockAgentClient::new().succeed_all(json!({"ok": true}));
        let ctx = context_with_client(demo_registry(), client);
        let mut run = run();

        let outcome = CoordinatedExecutor.execute(&ctx, &mut run).await.unwrap();

        assert_eq!(outcome.succeeded, 4);
        assert_eq!(outcome.failed, 0);
        let order: Vec<&str> = run
            .invocations()
            .iter()
            .map(|i| i.capability.as_str())
            .collect();
        assert_eq!(order, vec!["inventory", "matchmaking", "location", "navigation"]);
    }

    #[tokio::test]
    async fn test_failure_halts_and_skips_remaining() {
        let client = MockAgentClient::new()
            .succeed_all(json!({"ok": true}))
            .fail_agent("matchmaking", "no candidates");
        let ctx = context_with_client(demo_registry(), client);
        let mut run = run();

        let outcome = CoordinatedExecutor.execute(&ctx, &mut run).await.unwrap();

        assert_eq!(outcome.succeeded, 1);
        assert_eq!(outcome.failed, 1);
        let statuses: Vec<InvocationStatus> =
            run.invocations().iter().map(|i| i.status).collect();
        assert_eq!(
            statuses,
            vec![
                InvocationStatus::Succeeded,
                InvocationStatus::Failed,
                InvocationStatus::Skipped,
                InvocationStatus::Skipped,
            ]
        );
    }
}
