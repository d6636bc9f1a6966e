//! Agent descriptor value objects
//!
//! An [`AgentDescriptor`] is the invocation contract for one worker agent:
//! its capability name, its endpoint, the response schema tag it promises,
//! and the transport strategy used to reach it.

use serde::{Deserialize, Serialize};

/// Capability name of a worker agent (Value Object)
///
/// The unique registry key, e.g. `"inventory"`, `"matchmaking"`,
/// `"location"`, `"navigation"`. Always stored lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Capability(String);

impl Capability {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into().trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Capability {
    fn from(s: &str) -> Self {
        Capability::new(s)
    }
}

/// Transport strategy for reaching a worker agent.
///
/// Selected at descriptor-resolution time, never by runtime type
/// inspection. A request may override the mode for a whole run so every
/// run is self-describing and reproducible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkingMode {
    /// JSON-over-HTTP request/response to the agent's endpoint
    #[default]
    HttpJson,
    /// In-process handler, used for development and demos
    Local,
}

impl std::fmt::Display for WorkingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkingMode::HttpJson => write!(f, "http_json"),
            WorkingMode::Local => write!(f, "local"),
        }
    }
}

impl std::str::FromStr for WorkingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "http" | "http_json" | "httpjson" => Ok(WorkingMode::HttpJson),
            "local" => Ok(WorkingMode::Local),
            _ => Err(format!("Invalid working mode: {}", s)),
        }
    }
}

/// Invocation contract for one worker agent (Value Object)
///
/// Immutable; loaded once at startup into the [`AgentRegistry`](super::registry::AgentRegistry).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentDescriptor {
    capability: Capability,
    /// Human-readable role, consumed by the handoff router to judge
    /// applicability (e.g. "checks stock levels and prices").
    role: String,
    endpoint: String,
    /// Response schema tag the agent promises, e.g. `"inventory.v1"`.
    schema: String,
    mode: WorkingMode,
    /// Per-agent invocation timeout override, in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    timeout_ms: Option<u64>,
}

impl AgentDescriptor {
    pub fn new(
        capability: impl Into<Capability>,
        role: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Self {
        let capability = capability.into();
        let schema = format!("{}.v1", capability.as_str());
        Self {
            capability,
            role: role.into(),
            endpoint: endpoint.into(),
            schema,
            mode: WorkingMode::default(),
            timeout_ms: None,
        }
    }

    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = schema.into();
        self
    }

    pub fn with_mode(mut self, mode: WorkingMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    pub fn capability(&self) -> &Capability {
        &self.capability
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    pub fn mode(&self) -> WorkingMode {
        self.mode
    }

    pub fn timeout_ms(&self) -> Option<u64> {
        self.timeout_ms
    }
}
