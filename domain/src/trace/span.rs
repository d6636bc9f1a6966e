//! Trace span value objects.
//!
//! A [`TraceSpan`] is a timed, attributed record of one unit of work,
//! correlated to a run. Spans are append-only: once emitted they are never
//! mutated. The spans of one run form a tree rooted at a single
//! controller-level span (the only span with a null parent).

use crate::agent::descriptor::Capability;
use crate::core::ids::time_ordered_uuid;
use crate::orchestration::run::RunId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::atomic::AtomicU64;

static SPAN_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Opaque span identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpanId(String);

impl SpanId {
    pub fn generate() -> Self {
        Self(time_ordered_uuid(&SPAN_SEQUENCE))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SpanId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One completed unit of traced work (Value Object)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceSpan {
    pub run_id: RunId,
    pub span_id: SpanId,
    /// Null only for the run's single root span.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<SpanId>,
    pub label: String,
    /// Null for controller-level spans.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<Capability>,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    /// Sorted for deterministic serialization.
    #[serde(default)]
    pub attributes: BTreeMap<String, Value>,
}

impl TraceSpan {
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}
