//! File configuration types.
//!
//! The TOML surface: an `[orchestrator]` section for tuning parameters, an
//! `[[agents]]` array describing the registry, and a `[trace]` section for
//! the span sink. Every field has a default so a missing or partial file
//! still yields a working configuration (the built-in demo registry).

use concierge_application::OrchestratorParams;
use concierge_domain::{AgentDescriptor, AgentRegistry, Capability, DomainError, WorkingMode};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub orchestrator: OrchestratorSection,
    pub agents: Vec<AgentEntry>,
    pub trace: TraceSection,
}

impl FileConfig {
    /// Build the registry from the configured agents.
    ///
    /// An empty `[[agents]]` array yields an empty registry; callers fall
    /// back to the built-in demo registry in that case.
    pub fn registry(&self) -> Result<AgentRegistry, DomainError> {
        let descriptors = self
            .agents
            .iter()
            .map(AgentEntry::to_descriptor)
            .collect::<Result<Vec<_>, _>>()?;
        AgentRegistry::from_descriptors(descriptors)
    }
}

/// `[orchestrator]` tuning parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorSection {
    pub max_handoffs: usize,
    pub max_rounds: usize,
    pub default_timeout_ms: u64,
    pub retention_secs: u64,
}

impl Default for OrchestratorSection {
    fn default() -> Self {
        let params = OrchestratorParams::default();
        Self {
            max_handoffs: params.max_handoffs,
            max_rounds: params.max_rounds,
            default_timeout_ms: params.default_timeout_ms,
            retention_secs: params.retention_secs,
        }
    }
}

impl OrchestratorSection {
    pub fn params(&self) -> OrchestratorParams {
        OrchestratorParams::default()
            .with_max_handoffs(self.max_handoffs)
            .with_max_rounds(self.max_rounds)
            .with_default_timeout_ms(self.default_timeout_ms)
            .with_retention_secs(self.retention_secs)
    }
}

/// One `[[agents]]` entry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentEntry {
    pub capability: String,
    pub role: String,
    pub endpoint: String,
    /// Defaults to `<capability>.v1` when absent.
    pub schema: Option<String>,
    /// `http` (default) or `local`.
    pub mode: Option<String>,
    pub timeout_ms: Option<u64>,
}

impl AgentEntry {
    pub fn to_descriptor(&self) -> Result<AgentDescriptor, DomainError> {
        if self.capability.trim().is_empty() {
            return Err(DomainError::InvalidRequest(
                "agent entry is missing a capability name".to_string(),
            ));
        }

        let mut descriptor = AgentDescriptor::new(
            Capability::new(self.capability.as_str()),
            self.role.clone(),
            self.endpoint.clone(),
        );

        if let Some(schema) = &self.schema {
            descriptor = descriptor.with_schema(schema.clone());
        }
        if let Some(mode) = &self.mode {
            let mode: WorkingMode = mode
                .parse()
                .map_err(DomainError::InvalidRequest)?;
            descriptor = descriptor.with_mode(mode);
        }
        if let Some(timeout_ms) = self.timeout_ms {
            descriptor = descriptor.with_timeout_ms(timeout_ms);
        }

        Ok(descriptor)
    }
}

/// `[trace]` span sink settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceSection {
    /// Append completed spans as JSONL to this path.
    pub jsonl_path: Option<PathBuf>,
}
