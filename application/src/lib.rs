//! Application layer for concierge
//!
//! This crate contains the orchestration controller, the five pattern
//! executors, the result aggregator, the trace recorder, and the ports
//! (interfaces) that infrastructure adapters implement.
//!
//! # Architecture
//!
//! The controller accepts a request, assigns a run identity, selects a
//! pattern executor, supervises its execution, invokes the aggregator, and
//! returns the final envelope. Worker agents are reached exclusively
//! through the [`AgentClient`](ports::agent_client::AgentClient) port;
//! trace spans flow to the external collector through the
//! [`SpanExporter`](ports::span_exporter::SpanExporter) port.

pub mod aggregator;
pub mod controller;
pub mod executors;
pub mod params;
pub mod ports;
pub mod trace;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types
pub use aggregator::{aggregate, terminal_status};
pub use controller::{Orchestrator, OrchestratorBuilder, SubmitResponse};
pub use params::OrchestratorParams;
pub use ports::{
    agent_client::{AgentClient, AgentClientError},
    progress::{NoProgress, ProgressNotifier},
    span_exporter::{NoExporter, SpanExporter},
};
pub use trace::{SpanHandle, TraceRecorder};
