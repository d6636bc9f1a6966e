//! Aggregated result value objects.
//!
//! These types represent the merged output of a run:
//! - [`CapabilityOutput`] - one succeeded agent's contribution
//! - [`AggregatedResult`] - the normalized final response
//! - [`ReviewStatus`] - group-chat review outcome tag

use crate::agent::descriptor::Capability;
use crate::orchestration::run::RunId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One succeeded invocation's contribution to the final response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapabilityOutput {
    pub capability: Capability,
    pub output: Value,
}

/// Group-chat review outcome, attached only by the GroupChat pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    /// The reviewer approved a draft within the round bound
    Approved,
    /// The round bound was exhausted; the last draft stands unreviewed
    Unreviewed,
}

/// Final merged response for one run.
///
/// Invariant: `failed_agents` is exactly the set of invocations with
/// status Failed at aggregation time (skipped agents are not listed).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedResult {
    pub run_id: RunId,
    /// Human-readable concatenation of the succeeded outputs, one
    /// per-capability section each. Independently-produced sections are
    /// surfaced verbatim; no coherence between them is attempted.
    pub response: String,
    pub outputs: Vec<CapabilityOutput>,
    pub failed_agents: Vec<Capability>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review: Option<ReviewStatus>,
}

impl AggregatedResult {
    pub fn new(run_id: RunId) -> Self {
        Self {
            run_id,
            response: String::new(),
            outputs: Vec::new(),
            failed_agents: Vec::new(),
            review: None,
        }
    }

    pub fn with_review(mut self, review: ReviewStatus) -> Self {
        self.review = Some(review);
        self
    }

    pub fn is_unreviewed(&self) -> bool {
        self.review == Some(ReviewStatus::Unreviewed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_review_tagging() {
        let result = AggregatedResult::new(RunId::from("run-1"));
        assert!(result.review.is_none());
        assert!(!result.is_unreviewed());

        let tagged = result.with_review(ReviewStatus::Unreviewed);
        assert!(tagged.is_unreviewed());
    }
}
