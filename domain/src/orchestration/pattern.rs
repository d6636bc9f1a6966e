//! Orchestration pattern selection.
//!
//! Defines [`OrchestrationPattern`], the single user-facing strategy axis.
//! Each pattern governs how worker agents are sequenced or parallelized
//! for one request.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Named strategy governing agent sequencing for one request.
///
/// - **Coordinated** (default): a fixed internal plan decides agent order
///   deterministically from static request classification.
/// - **Sequential**: caller-supplied ordered list, strict pipeline.
/// - **Concurrent**: simultaneous dispatch, no cross-agent data, partial
///   failures tolerated.
/// - **Handoff**: a router decision loop selects the next capability until
///   it decides "done" or the handoff bound is reached.
/// - **GroupChat**: worker drafts, reviewer approves or rejects, bounded
///   rounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrchestrationPattern {
    /// Deterministic baseline used when no explicit pattern is requested
    #[default]
    Coordinated,
    Sequential,
    Concurrent,
    Handoff,
    GroupChat,
}

impl OrchestrationPattern {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrchestrationPattern::Coordinated => "coordinated",
            OrchestrationPattern::Sequential => "sequential",
            OrchestrationPattern::Concurrent => "concurrent",
            OrchestrationPattern::Handoff => "handoff",
            OrchestrationPattern::GroupChat => "group_chat",
        }
    }

    /// Get a human-readable description of this pattern
    pub fn description(&self) -> &'static str {
        match self {
            OrchestrationPattern::Coordinated => {
                "Coordinated: fixed deterministic plan (inventory -> matchmaking -> location -> navigation)"
            }
            OrchestrationPattern::Sequential => {
                "Sequential: strict pipeline over a caller-supplied agent list"
            }
            OrchestrationPattern::Concurrent => {
                "Concurrent: independent fan-out over all requested agents"
            }
            OrchestrationPattern::Handoff => {
                "Handoff: router decision loop with a bounded handoff count"
            }
            OrchestrationPattern::GroupChat => {
                "GroupChat: worker/reviewer rounds with a bounded round count"
            }
        }
    }

    /// All known patterns, for help text and validation messages
    pub fn all() -> &'static [OrchestrationPattern] {
        &[
            OrchestrationPattern::Coordinated,
            OrchestrationPattern::Sequential,
            OrchestrationPattern::Concurrent,
            OrchestrationPattern::Handoff,
            OrchestrationPattern::GroupChat,
        ]
    }
}

impl fmt::Display for OrchestrationPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for OrchestrationPattern {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "default" | "coordinated" => Ok(OrchestrationPattern::Coordinated),
            "sequential" | "seq" => Ok(OrchestrationPattern::Sequential),
            "concurrent" | "parallel" => Ok(OrchestrationPattern::Concurrent),
            "handoff" | "router" => Ok(OrchestrationPattern::Handoff),
            "group_chat" | "groupchat" | "chat" => Ok(OrchestrationPattern::GroupChat),
            _ => Err(format!("Invalid orchestration pattern: {}", s)),
        }
    }
}
