//! Agent invocation records.
//!
//! An [`AgentInvocation`] tracks one dispatch to one worker agent within a
//! run: input, output, status, error detail, and timing. Records are owned
//! by the pattern executor that created them and appended to the run under
//! a single-writer discipline.

use crate::agent::descriptor::Capability;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Lifecycle of one agent invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvocationStatus {
    /// Slot reserved, not yet on the wire
    Pending,
    /// Request sent, response outstanding
    Dispatched,
    Succeeded,
    Failed,
    /// Never dispatched because an earlier pipeline step failed or the run
    /// was cancelled
    Skipped,
}

/// Classification of a failed invocation, mirroring the error taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvocationErrorKind {
    /// Transport-level failure after exhausting the single retry
    Transport,
    Timeout,
    SchemaViolation,
    /// Well-formed error response from the agent itself
    Agent,
    Cancelled,
}

/// Error detail recorded on a failed invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationError {
    pub kind: InvocationErrorKind,
    pub message: String,
}

impl InvocationError {
    pub fn new(kind: InvocationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for InvocationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

/// One dispatch to one worker agent (Entity)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentInvocation {
    pub capability: Capability,
    pub input: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
    pub status: InvocationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<InvocationError>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
}

impl AgentInvocation {
    /// Reserve a pending invocation slot.
    pub fn pending(capability: Capability, input: Value) -> Self {
        Self {
            capability,
            input,
            output: None,
            status: InvocationStatus::Pending,
            error: None,
            started_at: None,
            ended_at: None,
        }
    }

    /// Mark the request as on the wire and stamp the start time.
    pub fn mark_dispatched(&mut self) {
        self.status = InvocationStatus::Dispatched;
        self.started_at = Some(Utc::now());
    }

    /// Record a successful response.
    pub fn succeed(&mut self, output: Value) {
        self.status = InvocationStatus::Succeeded;
        self.output = Some(output);
        self.ended_at = Some(Utc::now());
    }

    /// Record a terminal failure.
    pub fn fail(&mut self, kind: InvocationErrorKind, message: impl Into<String>) {
        self.status = InvocationStatus::Failed;
        self.error = Some(InvocationError::new(kind, message));
        self.ended_at = Some(Utc::now());
    }

    /// Mark the slot as never dispatched.
    pub fn skip(&mut self) {
        self.status = InvocationStatus::Skipped;
    }

    pub fn is_succeeded(&self) -> bool {
        self.status == InvocationStatus::Succeeded
    }

    pub fn is_failed(&self) -> bool {
        self.status == InvocationStatus::Failed
    }
}
