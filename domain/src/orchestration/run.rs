//! Orchestration run entity.
//!
//! An [`OrchestrationRun`] is one end-to-end execution of a request:
//! a unique identity, the originating request, a monotonic status, the
//! ordered invocation history, and creation/completion timestamps.

use crate::agent::descriptor::Capability;
use crate::core::ids::time_ordered_uuid;
use crate::orchestration::invocation::AgentInvocation;
use crate::orchestration::request::OrchestrationRequest;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::atomic::AtomicU64;

static RUN_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Opaque run identity, unique for the process lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(String);

impl RunId {
    /// Generate a fresh identity. Uniqueness is backed by a process-wide
    /// sequence number, not just the clock.
    pub fn generate() -> Self {
        Self(time_ordered_uuid(&RUN_SEQUENCE))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RunId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Run lifecycle status.
///
/// Transitions are strictly monotonic:
/// Created -> Running -> Aggregating -> {Completed | PartiallyCompleted | Failed}.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Created,
    Running,
    Aggregating,
    Completed,
    PartiallyCompleted,
    Failed,
}

impl RunStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunStatus::Completed | RunStatus::PartiallyCompleted | RunStatus::Failed
        )
    }

    /// Whether moving to `next` respects the monotonic lifecycle.
    pub fn can_transition_to(&self, next: RunStatus) -> bool {
        match (self, next) {
            (RunStatus::Created, RunStatus::Running) => true,
            (RunStatus::Running, RunStatus::Aggregating) => true,
            // A run that dies before aggregation still finalizes as Failed.
            (RunStatus::Running, RunStatus::Failed) => true,
            (RunStatus::Aggregating, status) => status.is_terminal(),
            _ => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Created => "created",
            RunStatus::Running => "running",
            RunStatus::Aggregating => "aggregating",
            RunStatus::Completed => "completed",
            RunStatus::PartiallyCompleted => "partially_completed",
            RunStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One end-to-end execution of an orchestration request (Entity)
///
/// Owned exclusively by the controller for its lifetime; external callers
/// only ever see cloned snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrchestrationRun {
    id: RunId,
    request: OrchestrationRequest,
    status: RunStatus,
    invocations: Vec<AgentInvocation>,
    created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    completed_at: Option<DateTime<Utc>>,
}

impl OrchestrationRun {
    pub fn new(request: OrchestrationRequest) -> Self {
        Self {
            id: RunId::generate(),
            request,
            status: RunStatus::Created,
            invocations: Vec::new(),
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    pub fn id(&self) -> &RunId {
        &self.id
    }

    pub fn request(&self) -> &OrchestrationRequest {
        &self.request
    }

    pub fn status(&self) -> RunStatus {
        self.status
    }

    pub fn invocations(&self) -> &[AgentInvocation] {
        &self.invocations
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Advance the status, enforcing monotonicity.
    ///
    /// Returns `false` (and leaves the run untouched) when the transition
    /// would move backwards; terminal states stamp `completed_at`.
    pub fn advance(&mut self, next: RunStatus) -> bool {
        if !self.status.can_transition_to(next) {
            return false;
        }
        self.status = next;
        if next.is_terminal() {
            self.completed_at = Some(Utc::now());
        }
        true
    }

    /// Reserve an invocation slot and return its index.
    ///
    /// Concurrent executors reserve every slot up front so parallel results
    /// land in disjoint, pre-assigned positions.
    pub fn reserve_invocation(&mut self, capability: Capability, input: Value) -> usize {
        self.invocations
            .push(AgentInvocation::pending(capability, input));
        self.invocations.len() - 1
    }

    pub fn invocation_mut(&mut self, index: usize) -> &mut AgentInvocation {
        &mut self.invocations[index]
    }

    /// Returns an iterator over the successful invocations.
    pub fn succeeded_invocations(&self) -> impl Iterator<Item = &AgentInvocation> {
        self.invocations.iter().filter(|i| i.is_succeeded())
    }

    /// Returns an iterator over the failed invocations.
    pub fn failed_invocations(&self) -> impl Iterator<Item = &AgentInvocation> {
        self.invocations.iter().filter(|i| i.is_failed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run() -> OrchestrationRun {
        OrchestrationRun::new(OrchestrationRequest::new("find a tent", "user-1"))
    }

    #[test]
    fn test_run_ids_unique() {
        let mut seen = std::collections::HashSet::new();
        for _ in 0..500 {
            assert!(seen.insert(run().id().clone()));
        }
    }

    #[test]
    fn test_status_monotonic() {
        let mut r = run();
        assert!(r.advance(RunStatus::Running));
        assert!(r.advance(RunStatus::Aggregating));
        assert!(r.advance(RunStatus::PartiallyCompleted));

        // No backward or post-terminal transitions.
        assert!(!r.advance(RunStatus::Running));
        assert!(!r.advance(RunStatus::Completed));
        assert_eq!(r.status(), RunStatus::PartiallyCompleted);
    }

    #[test]
    fn test_created_cannot_jump_to_terminal() {
        let mut r = run();
        assert!(!r.advance(RunStatus::Completed));
        assert!(!r.advance(RunStatus::Aggregating));
        assert_eq!(r.status(), RunStatus::Created);
    }

    #[test]
    fn test_terminal_stamps_completed_at() {
        let mut r = run();
        r.advance(RunStatus::Running);
        r.advance(RunStatus::Aggregating);
        assert!(r.completed_at().is_none());
        r.advance(RunStatus::Completed);
        assert!(r.completed_at().is_some());
    }

    #[test]
    fn test_reserved_slots_are_ordered() {
        let mut r = run();
        let a = r.reserve_invocation(Capability::new("inventory"), json!({}));
        let b = r.reserve_invocation(Capability::new("location"), json!({}));
        assert_eq!((a, b), (0, 1));

        r.invocation_mut(a).mark_dispatched();
        r.invocation_mut(a).succeed(json!({"items": []}));
        assert_eq!(r.succeeded_invocations().count(), 1);
        assert_eq!(r.failed_invocations().count(), 0);
    }
}
