//! Result aggregator
//!
//! Merges per-agent invocation outputs into one normalized response and
//! decides the run's terminal status. A pure read of the run's invocation
//! list: invocation records are never mutated here.

use concierge_domain::{
    AggregatedResult, CapabilityOutput, OrchestrationRun, RunStatus,
};

/// Compose the final result from the run's current invocation list.
///
/// Succeeded outputs are concatenated into per-capability sections,
/// surfaced verbatim (independently-produced sections are not reconciled).
/// `failed_agents` is exactly the set of invocations with status Failed at
/// this moment; skipped agents are not failures.
pub fn aggregate(run: &OrchestrationRun) -> AggregatedResult {
    let mut result = AggregatedResult::new(run.id().clone());

    for invocation in run.succeeded_invocations() {
        let output = invocation.output.clone().unwrap_or_default();
        result.outputs.push(CapabilityOutput {
            capability: invocation.capability.clone(),
            output,
        });
    }

    result.failed_agents = run
        .failed_invocations()
        .map(|i| i.capability.clone())
        .collect();

    result.response = result
        .outputs
        .iter()
        .map(|section| {
            format!(
                "[{}]\n{}",
                section.capability,
                serde_json::to_string_pretty(&section.output).unwrap_or_default()
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    result
}

/// Decide the terminal status from the invocation list.
///
/// Completed when nothing failed; PartiallyCompleted when failures and
/// successes coexist; Failed when there were failures and no successes.
pub fn terminal_status(run: &OrchestrationRun) -> RunStatus {
    let succeeded = run.succeeded_invocations().count();
    let failed = run.failed_invocations().count();

    if failed == 0 {
        RunStatus::Completed
    } else if succeeded > 0 {
        RunStatus::PartiallyCompleted
    } else {
        RunStatus::Failed
    }
}
