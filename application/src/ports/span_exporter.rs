//! Span exporter port
//!
//! The trace sink is a write-only external dependency: completed spans are
//! pushed to an observability collector whose storage format this core does
//! not specify.

use concierge_domain::TraceSpan;

/// Write-only sink for completed trace spans.
///
/// Called once per span at `end_span` time, possibly from many concurrent
/// invocation tasks; implementations must be thread-safe and must not
/// block the orchestration path on slow sinks beyond a local write.
pub trait SpanExporter: Send + Sync {
    fn export(&self, span: &TraceSpan);
}

/// Discards every span; the default when no collector is configured.
pub struct NoExporter;

impl SpanExporter for NoExporter {
    fn export(&self, _span: &TraceSpan) {}
}
