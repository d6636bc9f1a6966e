//! Sequential pattern executor.
//!
//! Strict pipeline over the caller-supplied ordered agent list: invocation
//! *i+1*'s input is the original query plus invocation *i*'s output. A
//! failure halts the pipeline and marks every remaining agent Skipped; the
//! run never continues past a hard failure.

use super::{base_payload, record_outcome, ExecutorContext, ExecutorOutcome, PatternExecutor};
use async_trait::async_trait;
use concierge_domain::{DomainError, OrchestrationPattern, OrchestrationRun};
use serde_json::Value;
use tracing::{debug, info};

pub struct SequentialExecutor;

#[async_trait]
impl PatternExecutor for SequentialExecutor {
    fn pattern(&self) -> OrchestrationPattern {
        OrchestrationPattern::Sequential
    }

    async fn execute(
        &self,
        ctx: &ExecutorContext,
        run: &mut OrchestrationRun,
    ) -> Result<ExecutorOutcome, DomainError> {
        let request = run.request().clone();
        let agents = request.agent_sequence.clone();
        info!(run_id = %run.id(), agents = agents.len(), "Sequential pipeline starting");
        ctx.progress.on_pattern_start(self.pattern(), agents.len());

        let mut previous_output: Option<Value> = None;
        let mut halted = false;

        for capability in agents {
            // Build the input before reserving, so skipped slots still show
            // what they would have received.
            let mut input = base_payload(&request);
            if let Some(context) = &previous_output {
                input["context"] = context.clone();
            }

            if halted {
                let index = run.reserve_invocation(capability, input);
                run.invocation_mut(index).skip();
                continue;
            }
            if ctx.cancel.is_cancelled() {
                return Err(DomainError::Cancelled);
            }

            let descriptor = ctx.descriptor_for(&request, &capability)?;
            let index = run.reserve_invocation(capability.clone(), input.clone());
            run.invocation_mut(index).mark_dispatched();

            let result = ctx.dispatch(run.id(), &descriptor, input).await;
            if record_outcome(run, index, result, ctx.progress.as_ref()) {
                previous_output = run.invocations()[index].output.clone();
            } else {
                debug!(agent = %capability, "Sequential pipeline halted");
                halted = true;
            }
        }

        ctx.progress.on_pattern_complete(self.pattern());
        Ok(ExecutorOutcome::from_run(run))
    }
}
