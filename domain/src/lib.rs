//! Domain layer for concierge
//!
//! This crate contains the core business logic, entities, and value objects
//! for multi-agent orchestration. It has no dependencies on infrastructure
//! or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Orchestration patterns
//!
//! A single user request is answered by coordinating capability-specific
//! worker agents under one of five patterns:
//!
//! - **Coordinated** (default): fixed, deterministic agent plan
//! - **Sequential**: caller-supplied strict pipeline
//! - **Concurrent**: independent fan-out, partial failures tolerated
//! - **Handoff**: router decision loop with a bounded handoff count
//! - **GroupChat**: worker/reviewer rounds with a bounded round count
//!
//! ## Runs and traces
//!
//! Every submitted request becomes an [`OrchestrationRun`] with a unique
//! identity, an ordered invocation history, and a correlated trace span tree.

pub mod agent;
pub mod core;
pub mod orchestration;
pub mod routing;
pub mod trace;

// Re-export commonly used types
pub use agent::{
    descriptor::{AgentDescriptor, Capability, WorkingMode},
    registry::AgentRegistry,
};
pub use crate::core::{error::DomainError, query::Query};
pub use orchestration::{
    invocation::{AgentInvocation, InvocationError, InvocationErrorKind, InvocationStatus},
    pattern::OrchestrationPattern,
    request::OrchestrationRequest,
    result::{AggregatedResult, CapabilityOutput, ReviewStatus},
    run::{OrchestrationRun, RunId, RunStatus},
};
pub use routing::{
    normalize::normalize_payload,
    router::{CapabilityRouter, RouteStep, RouterPolicy},
};
pub use trace::span::{SpanId, TraceSpan};
