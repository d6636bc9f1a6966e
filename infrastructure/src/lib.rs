//! Infrastructure layer for concierge
//!
//! External adapters and implementations: the working-mode transport
//! strategies (HTTP JSON, local in-process), the routing agent client with
//! its timeout/retry/schema-validation policy, multi-source configuration
//! loading, and the JSONL trace span exporter.

pub mod client;
pub mod config;
pub mod trace_export;
pub mod transport;

// Re-export commonly used types
pub use client::RoutingAgentClient;
pub use config::{ConfigLoader, FileConfig};
pub use trace_export::JsonlSpanExporter;
pub use transport::{AgentTransport, HttpTransport, LocalTransport, TransportError};
