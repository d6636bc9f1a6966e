//! Orchestration request value object.

use crate::agent::descriptor::{Capability, WorkingMode};
use crate::agent::registry::AgentRegistry;
use crate::core::error::DomainError;
use crate::core::query::Query;
use crate::orchestration::pattern::OrchestrationPattern;
use serde::{Deserialize, Serialize};

/// One user request to be answered by orchestrated worker agents.
///
/// Self-describing: the pattern, the optional agent order, and the optional
/// working-mode override all travel with the request, so a run is
/// reproducible independent of ambient configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrchestrationRequest {
    pub query: Query,
    pub user_id: String,
    pub pattern: OrchestrationPattern,
    /// Ordered agent list; required (non-empty) for Sequential, used as
    /// worker/reviewer selection for GroupChat, optional elsewhere.
    #[serde(default)]
    pub agent_sequence: Vec<Capability>,
    /// Hint for the handoff router: a capability to try first.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routing_hint: Option<Capability>,
    /// Per-run transport override applied to every descriptor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_mode: Option<WorkingMode>,
}

impl OrchestrationRequest {
    pub fn new(query: impl Into<Query>, user_id: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            user_id: user_id.into(),
            pattern: OrchestrationPattern::default(),
            agent_sequence: Vec::new(),
            routing_hint: None,
            working_mode: None,
        }
    }

    pub fn with_pattern(mut self, pattern: OrchestrationPattern) -> Self {
        self.pattern = pattern;
        self
    }

    pub fn with_agents(mut self, agents: Vec<Capability>) -> Self {
        self.agent_sequence = agents;
        self
    }

    pub fn with_routing_hint(mut self, hint: Capability) -> Self {
        self.routing_hint = Some(hint);
        self
    }

    pub fn with_working_mode(mut self, mode: WorkingMode) -> Self {
        self.working_mode = Some(mode);
        self
    }

    /// Validate the request against a registry, before any invocation.
    ///
    /// Rejections here are the only synchronous `submit` failures:
    /// - an empty registry cannot orchestrate anything
    /// - Sequential requires a non-empty agent list, every entry registered
    /// - GroupChat requires at least a worker and a reviewer
    pub fn validate(&self, registry: &AgentRegistry) -> Result<(), DomainError> {
        if registry.is_empty() {
            return Err(DomainError::InvalidRequest(
                "no agents registered".to_string(),
            ));
        }

        for capability in &self.agent_sequence {
            if !registry.contains(capability) {
                return Err(DomainError::InvalidRequest(format!(
                    "agent list references unknown capability: {}",
                    capability
                )));
            }
        }

        match self.pattern {
            OrchestrationPattern::Sequential => {
                if self.agent_sequence.is_empty() {
                    return Err(DomainError::InvalidRequest(
                        "sequential pattern requires a non-empty ordered agent list".to_string(),
                    ));
                }
            }
            OrchestrationPattern::GroupChat => {
                let participants = if self.agent_sequence.is_empty() {
                    registry.len()
                } else {
                    self.agent_sequence.len()
                };
                if participants < 2 {
                    return Err(DomainError::InvalidRequest(
                        "group chat requires a worker and a reviewer".to_string(),
                    ));
                }
            }
            _ => {}
        }

        Ok(())
    }
}
