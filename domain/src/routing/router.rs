//! Router decision policy for the Handoff pattern.
//!
//! The router is a distinguished decision loop, not a worker agent. Each
//! step is a pure function over the original query, the set of capabilities
//! already invoked, and each candidate's declared role. Implementing the
//! decision as an explicit state machine keeps the handoff bound provably
//! enforced: the invoked-set grows on every `Invoke`, candidates are
//! finite, and the executor counts hops besides.

use crate::agent::descriptor::{AgentDescriptor, Capability};
use crate::core::query::Query;
use std::collections::HashSet;

/// Outcome of one router decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteStep {
    /// Hand control to the named capability for one invocation
    Invoke(Capability),
    /// Terminal action: the router considers the query answered
    Done,
}

/// Pluggable router decision function.
///
/// The production policy is [`CapabilityRouter`]; tests substitute
/// policies with fixed behavior (e.g. one that never emits `Done`).
pub trait RouterPolicy: Send + Sync {
    fn next_step(
        &self,
        query: &Query,
        invoked: &HashSet<Capability>,
        candidates: &[AgentDescriptor],
    ) -> RouteStep;
}

/// Default router: invoke each applicable, not-yet-invoked capability in
/// registration order, then declare the query answered.
///
/// A capability applies when the query mentions its name or any term of
/// its declared role. When nothing applies and nothing has been invoked
/// yet, the first candidate is chosen so a vague query still reaches the
/// baseline agent rather than producing an empty run.
#[derive(Debug, Default)]
pub struct CapabilityRouter;

impl CapabilityRouter {
    fn applies(query: &Query, descriptor: &AgentDescriptor) -> bool {
        let terms: HashSet<String> = query.terms().collect();
        if terms.contains(descriptor.capability().as_str()) {
            return true;
        }
        descriptor
            .role()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| w.len() > 3)
            .any(|w| terms.contains(&w.to_lowercase()))
    }
}

impl RouterPolicy for CapabilityRouter {
    fn next_step(
        &self,
        query: &Query,
        invoked: &HashSet<Capability>,
        candidates: &[AgentDescriptor],
    ) -> RouteStep {
        for descriptor in candidates {
            if invoked.contains(descriptor.capability()) {
                continue;
            }
            if Self::applies(query, descriptor) {
                return RouteStep::Invoke(descriptor.capability().clone());
            }
        }

        if invoked.is_empty() {
            if let Some(first) = candidates.first() {
                return RouteStep::Invoke(first.capability().clone());
            }
        }

        RouteStep::Done
    }
}
