//! Group chat pattern executor.
//!
//! A worker agent produces a draft response; a reviewer agent evaluates it
//! against an approval criterion (`approved` in its structured response).
//! On rejection the worker retries, incorporating the reviewer's feedback.
//! The loop is bounded: exhausting the round bound yields the last draft
//! tagged Unreviewed rather than failing the run.

use super::{base_payload, record_outcome, ExecutorContext, ExecutorOutcome, PatternExecutor};
use async_trait::async_trait;
use concierge_domain::{
    Capability, DomainError, OrchestrationPattern, OrchestrationRun, ReviewStatus,
};
use serde_json::Value;
use tracing::{debug, info, warn};

pub struct GroupChatExecutor;

impl GroupChatExecutor {
    /// Pick the worker and reviewer: the first two entries of the request's
    /// agent list when given, otherwise the first two registered
    /// capabilities. Validation has already guaranteed two participants.
    fn participants(
        ctx: &ExecutorContext,
        run: &OrchestrationRun,
    ) -> Result<(Capability, Capability), DomainError> {
        let sequence = &run.request().agent_sequence;
        let mut candidates = sequence.iter().cloned().chain(
            ctx.registry
                .all()
                .iter()
                .map(|d| d.capability().clone())
                .filter(|c| !sequence.contains(c)),
        );

        match (candidates.next(), candidates.next()) {
            (Some(worker), Some(reviewer)) => Ok((worker, reviewer)),
            _ => Err(DomainError::InvalidRequest(
                "group chat requires a worker and a reviewer".to_string(),
            )),
        }
    }
}

#[async_trait]
impl PatternExecutor for GroupChatExecutor {
    fn pattern(&self) -> OrchestrationPattern {
        OrchestrationPattern::GroupChat
    }

    async fn execute(
        &self,
        ctx: &ExecutorContext,
        run: &mut OrchestrationRun,
    ) -> Result<ExecutorOutcome, DomainError> {
        let request = run.request().clone();
        let (worker, reviewer) = Self::participants(ctx, run)?;
        let max_rounds = ctx.params.max_rounds;
        info!(
            run_id = %run.id(), %worker, %reviewer, max_rounds,
            "Group chat starting"
        );
        ctx.progress.on_pattern_start(self.pattern(), max_rounds * 2);

        let worker_descriptor = ctx.descriptor_for(&request, &worker)?;
        let reviewer_descriptor = ctx.descriptor_for(&request, &reviewer)?;

        let mut feedback: Option<String> = None;
        let mut review = None;

        for round in 1..=max_rounds {
            if ctx.cancel.is_cancelled() {
                return Err(DomainError::Cancelled);
            }

            // Worker drafts, incorporating the previous round's feedback.
            let mut input = base_payload(&request);
            input["round"] = round.into();
            if let Some(feedback) = &feedback {
                input["feedback"] = feedback.clone().into();
            }

            let index = run.reserve_invocation(worker.clone(), input.clone());
            run.invocation_mut(index).mark_dispatched();
            let result = ctx.dispatch(run.id(), &worker_descriptor, input).await;
            if !record_outcome(run, index, result, ctx.progress.as_ref()) {
                // No draft to review; the chat cannot continue.
                warn!(round, "Group chat worker failed, stopping");
                break;
            }
            let draft = run.invocations()[index]
                .output
                .clone()
                .unwrap_or(Value::Null);

            // Reviewer evaluates the draft.
            let mut input = base_payload(&request);
            input["round"] = round.into();
            input["draft"] = draft;

            let index = run.reserve_invocation(reviewer.clone(), input.clone());
            run.invocation_mut(index).mark_dispatched();
            let result = ctx.dispatch(run.id(), &reviewer_descriptor, input).await;
            if !record_outcome(run, index, result, ctx.progress.as_ref()) {
                // A missing review is a rejection without feedback.
                feedback = None;
                continue;
            }

            let verdict = run.invocations()[index].output.clone().unwrap_or(Value::Null);
            if verdict.get("approved").and_then(Value::as_bool) == Some(true) {
                debug!(round, "Reviewer approved the draft");
                review = Some(ReviewStatus::Approved);
                break;
            }
            feedback = verdict
                .get("feedback")
                .and_then(Value::as_str)
                .map(str::to_string);
            debug!(round, "Reviewer rejected the draft");
        }

        // Bound exhausted without approval: the last draft stands,
        // explicitly tagged as unreviewed.
        let drafted = run
            .invocations()
            .iter()
            .any(|i| i.capability == worker && i.is_succeeded());
        if review.is_none() && drafted {
            review = Some(ReviewStatus::Unreviewed);
        }

        ctx.progress.on_pattern_complete(self.pattern());
        let outcome = ExecutorOutcome::from_run(run);
        Ok(match review {
            Some(review) => outcome.with_review(review),
            None => outcome,
        })
    }
}
