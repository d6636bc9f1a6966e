//! Progress notification port
//!
//! Defines the interface for reporting progress during orchestration.

use concierge_domain::{Capability, OrchestrationPattern};

/// Callback for progress updates during a run
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (console, web UI, etc.)
pub trait ProgressNotifier: Send + Sync {
    /// Called when the selected pattern starts executing
    fn on_pattern_start(&self, pattern: OrchestrationPattern, planned_agents: usize);

    /// Called when one agent invocation completes
    fn on_invocation_complete(&self, capability: &Capability, success: bool);

    /// Called when the pattern finishes, before aggregation
    fn on_pattern_complete(&self, pattern: OrchestrationPattern);
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl ProgressNotifier for NoProgress {
    fn on_pattern_start(&self, _pattern: OrchestrationPattern, _planned_agents: usize) {}
    fn on_invocation_complete(&self, _capability: &Capability, _success: bool) {}
    fn on_pattern_complete(&self, _pattern: OrchestrationPattern) {}
}
