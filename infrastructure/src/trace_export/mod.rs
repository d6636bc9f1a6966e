//! Span export adapters for the external observability collector.

pub mod jsonl;

pub use jsonl::JsonlSpanExporter;
