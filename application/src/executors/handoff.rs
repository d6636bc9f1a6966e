//! Handoff (router) pattern executor.
//!
//! A distinguished router decision loop repeatedly selects the next
//! capability to invoke based on the original query, the set of
//! capabilities already invoked, and each capability's declared role,
//! until it selects the terminal "done" action or the handoff count
//! reaches the configured bound. The loop is single-threaded per run so
//! the handoff counter and the invoked-set stay consistent.
//!
//! The router also normalizes incompatible output shapes (non-JSON
//! fragments) into a common schema before the final response is composed;
//! that normalization is a router responsibility, not an aggregator one.

use super::{base_payload, record_outcome, ExecutorContext, ExecutorOutcome, PatternExecutor};
use async_trait::async_trait;
use concierge_domain::{
    normalize_payload, Capability, DomainError, OrchestrationPattern, OrchestrationRun,
    RouteStep, RouterPolicy,
};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct HandoffExecutor {
    router: Arc<dyn RouterPolicy>,
}

impl HandoffExecutor {
    pub fn new(router: Arc<dyn RouterPolicy>) -> Self {
        Self { router }
    }
}

#[async_trait]
impl PatternExecutor for HandoffExecutor {
    fn pattern(&self) -> OrchestrationPattern {
        OrchestrationPattern::Handoff
    }

    async fn execute(
        &self,
        ctx: &ExecutorContext,
        run: &mut OrchestrationRun,
    ) -> Result<ExecutorOutcome, DomainError> {
        let request = run.request().clone();
        let max_handoffs = ctx.params.max_handoffs;
        info!(run_id = %run.id(), max_handoffs, "Handoff routing starting");
        ctx.progress.on_pattern_start(self.pattern(), max_handoffs);

        let mut invoked: HashSet<Capability> = HashSet::new();
        // The routing hint, when registered, wins the first decision only.
        let mut hint = request
            .routing_hint
            .clone()
            .filter(|c| ctx.registry.contains(c));

        let mut decide = |invoked: &HashSet<Capability>| match hint.take() {
            Some(capability) => RouteStep::Invoke(capability),
            None => self
                .router
                .next_step(&request.query, invoked, ctx.registry.all()),
        };

        let mut done = false;
        let mut handoffs = 0;

        while handoffs < max_handoffs {
            if ctx.cancel.is_cancelled() {
                return Err(DomainError::Cancelled);
            }

            let capability = match decide(&invoked) {
                RouteStep::Done => {
                    done = true;
                    break;
                }
                RouteStep::Invoke(capability) => capability,
            };
            debug!(agent = %capability, handoffs, "Router handoff");

            let descriptor = ctx.descriptor_for(&request, &capability)?;
            let index = run.reserve_invocation(capability.clone(), base_payload(&request));
            run.invocation_mut(index).mark_dispatched();

            let result = ctx.dispatch(run.id(), &descriptor, base_payload(&request)).await;
            let result = match result {
                // A merely-malformed payload is normalized and kept; a
                // missing body stays a schema failure.
                Err(error) => {
                    let normalized = error
                        .raw_body()
                        .filter(|raw| !raw.trim().is_empty())
                        .map(normalize_payload);
                    match normalized {
                        Some(value) => {
                            warn!(agent = %capability, "Normalizing malformed agent payload");
                            Ok(value)
                        }
                        None => Err(error),
                    }
                }
                ok => ok,
            };
            record_outcome(run, index, result, ctx.progress.as_ref());

            invoked.insert(capability);
            handoffs += 1;
        }

        // Reaching the bound is only fatal when the router still wants to
        // hand off; a Done decision at the boundary completes the run.
        if !done && !matches!(decide(&invoked), RouteStep::Done) {
            ctx.progress.on_pattern_complete(self.pattern());
            return Err(DomainError::HandoffLimitExceeded {
                limit: max_handoffs,
            });
        }

        ctx.progress.on_pattern_complete(self.pattern());
        Ok(ExecutorOutcome::from_run(run))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{context_with_client, demo_registry, MockAgentClient};
    use concierge_domain::{
        AgentDescriptor, CapabilityRouter, OrchestrationRequest, Query, RunStatus,
    };
    use serde_json::json;

    /// Router that always hands off to the first candidate, never done.
    struct NeverDone;

    impl RouterPolicy for NeverDone {
        fn next_step(
            &self,
            _query: &Query,
            _invoked: &HashSet<Capability>,
            candidates: &[AgentDescriptor],
        ) -> RouteStep {
            RouteStep::Invoke(candidates[0].capability().clone())
        }
    }

    fn run(query: &str) -> OrchestrationRun {
        let mut run = OrchestrationRun::new(OrchestrationRequest::new(query, "user-1"));
        run.advance(RunStatus::Running);
        run
    }

    #[tokio::test]
    async fn test_limit_exceeded_stops_at_bound() {
        let client = MockAgentClient::new().succeed_all(json!({"ok": true}));
        let mut ctx = context_with_client(demo_registry(), client);
        ctx.params.max_handoffs = 3;

        let mut run = run("anything at all");
        let err = HandoffExecutor::new(Arc::new(NeverDone))
            .execute(&ctx, &mut run)
            .await
            .unwrap_err();

        assert_eq!(err, DomainError::HandoffLimitExceeded { limit: 3 });
        // Exactly three invocations, never a fourth.
        assert_eq!(run.invocations().len(), 3);
    }

    #[tokio::test]
    async fn test_router_routes_until_done() {
        let client = MockAgentClient::new().succeed_all(json!({"ok": true}));
        let ctx = context_with_client(demo_registry(), client);

        let mut run = run("price and aisle of the paint sprayer");
        let outcome = HandoffExecutor::new(Arc::new(CapabilityRouter))
            .execute(&ctx, &mut run)
            .await
            .unwrap();

        // inventory (price) and location (aisle) apply; then Done.
        assert_eq!(outcome.succeeded, 2);
        let invoked: Vec<&str> = run
            .invocations()
            .iter()
            .map(|i| i.capability.as_str())
            .collect();
        assert_eq!(invoked, vec!["inventory", "location"]);
    }

    #[tokio::test]
    async fn test_malformed_payload_is_normalized_not_failed() {
        let client = MockAgentClient::new()
            .succeed_all(json!({"ok": true}))
            .fail_schema("inventory", "aisle 7, next to the compressors");
        let ctx = context_with_client(demo_registry(), client);

        let mut run = run("price of the paint sprayer");
        let outcome = HandoffExecutor::new(Arc::new(CapabilityRouter))
            .execute(&ctx, &mut run)
            .await
            .unwrap();

        assert_eq!(outcome.failed, 0);
        let inventory = &run.invocations()[0];
        assert!(inventory.is_succeeded());
        assert_eq!(
            inventory.output,
            Some(json!({"text": "aisle 7, next to the compressors"}))
        );
    }

    #[tokio::test]
    async fn test_routing_hint_wins_first_decision() {
        let client = MockAgentClient::new().succeed_all(json!({"ok": true}));
        let ctx = context_with_client(demo_registry(), client);

        let mut run = {
            let mut r = OrchestrationRun::new(
                OrchestrationRequest::new("price of the paint sprayer", "user-1")
                    .with_routing_hint(Capability::new("navigation")),
            );
            r.advance(RunStatus::Running);
            r
        };

        HandoffExecutor::new(Arc::new(CapabilityRouter))
            .execute(&ctx, &mut run)
            .await
            .unwrap();

        assert_eq!(run.invocations()[0].capability.as_str(), "navigation");
    }
}
