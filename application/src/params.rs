//! Orchestrator tuning parameters.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Bounds and defaults for pattern execution.
///
/// Every bound here is what keeps a pattern provably terminating: the
/// handoff loop and the group-chat round loop both refuse to run unbounded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorParams {
    /// Maximum handoffs before the Handoff pattern fails the run.
    pub max_handoffs: usize,
    /// Maximum worker/reviewer rounds for the GroupChat pattern.
    pub max_rounds: usize,
    /// Per-invocation timeout applied when the descriptor has no override.
    pub default_timeout_ms: u64,
    /// How long finished runs stay queryable through `status`.
    pub retention_secs: u64,
}

impl Default for OrchestratorParams {
    fn default() -> Self {
        Self {
            max_handoffs: 5,
            max_rounds: 3,
            default_timeout_ms: 10_000,
            retention_secs: 3_600,
        }
    }
}

impl OrchestratorParams {
    pub fn with_max_handoffs(mut self, max_handoffs: usize) -> Self {
        self.max_handoffs = max_handoffs;
        self
    }

    pub fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    pub fn with_default_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.default_timeout_ms = timeout_ms;
        self
    }

    pub fn with_retention_secs(mut self, retention_secs: u64) -> Self {
        self.retention_secs = retention_secs;
        self
    }

    pub fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.default_timeout_ms)
    }

    pub fn retention(&self) -> Duration {
        Duration::from_secs(self.retention_secs)
    }
}
