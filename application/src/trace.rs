//! Trace recorder
//!
//! Append-only span log correlated by run identity. One controller-level
//! root span per run; every invocation span is a child of it. The append
//! path is mutex-guarded so one writer per in-flight invocation is safe;
//! reads tolerate in-progress runs and return the spans emitted so far.

use crate::ports::span_exporter::{NoExporter, SpanExporter};
use chrono::Utc;
use concierge_domain::{Capability, RunId, SpanId, TraceSpan};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

/// Handle for an open span, consumed by [`TraceRecorder::end_span`].
///
/// Holding the handle is the only way to finish a span; dropping it
/// without ending simply never emits the span.
#[derive(Debug)]
pub struct SpanHandle {
    run_id: RunId,
    span_id: SpanId,
    parent_id: Option<SpanId>,
    label: String,
    agent: Option<Capability>,
    started_at: chrono::DateTime<Utc>,
}

impl SpanHandle {
    pub fn span_id(&self) -> &SpanId {
        &self.span_id
    }
}

/// Append-only, run-correlated span log.
pub struct TraceRecorder {
    spans: Mutex<HashMap<RunId, Vec<TraceSpan>>>,
    exporter: Arc<dyn SpanExporter>,
}

impl TraceRecorder {
    pub fn new() -> Self {
        Self::with_exporter(Arc::new(NoExporter))
    }

    pub fn with_exporter(exporter: Arc<dyn SpanExporter>) -> Self {
        Self {
            spans: Mutex::new(HashMap::new()),
            exporter,
        }
    }

    /// Open a span. A `None` parent makes this the run's root span; the
    /// controller opens exactly one of those per run.
    pub fn start_span(
        &self,
        run_id: &RunId,
        parent_id: Option<&SpanId>,
        label: impl Into<String>,
        agent: Option<&Capability>,
    ) -> SpanHandle {
        SpanHandle {
            run_id: run_id.clone(),
            span_id: SpanId::generate(),
            parent_id: parent_id.cloned(),
            label: label.into(),
            agent: agent.cloned(),
            started_at: Utc::now(),
        }
    }

    /// Close a span and append it to the run's log. Never mutates a span
    /// after emission.
    pub fn end_span(&self, handle: SpanHandle, attributes: BTreeMap<String, Value>) {
        let span = TraceSpan {
            run_id: handle.run_id.clone(),
            span_id: handle.span_id,
            parent_id: handle.parent_id,
            label: handle.label,
            agent: handle.agent,
            started_at: handle.started_at,
            ended_at: Utc::now(),
            attributes,
        };

        self.exporter.export(&span);

        let mut spans = self.spans.lock().expect("span log poisoned");
        spans.entry(handle.run_id).or_default().push(span);
    }

    /// Spans emitted so far for a run, ordered by start time.
    pub fn spans(&self, run_id: &RunId) -> Vec<TraceSpan> {
        let spans = self.spans.lock().expect("span log poisoned");
        let mut result = spans.get(run_id).cloned().unwrap_or_default();
        result.sort_by_key(|s| s.started_at);
        result
    }

    /// Drop a run's spans, used when the run itself is evicted.
    pub fn evict_run(&self, run_id: &RunId) {
        let mut spans = self.spans.lock().expect("span log poisoned");
        spans.remove(run_id);
    }
}

impl Default for TraceRecorder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attributes(pairs: &[(&str, &str)]) -> BTreeMap<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
            .collect()
    }

    #[test]
    fn test_spans_form_a_tree() {
        let recorder = TraceRecorder::new();
        let run_id = RunId::from("run-1");

        let root = recorder.start_span(&run_id, None, "orchestrate", None);
        let root_id = root.span_id().clone();

        let child = recorder.start_span(
            &run_id,
            Some(&root_id),
            "invoke",
            Some(&Capability::new("inventory")),
        );
        recorder.end_span(child, attributes(&[("status", "succeeded")]));
        recorder.end_span(root, attributes(&[]));

        let spans = recorder.spans(&run_id);
        assert_eq!(spans.len(), 2);
        assert_eq!(spans.iter().filter(|s| s.is_root()).count(), 1);

        let child = spans.iter().find(|s| !s.is_root()).unwrap();
        assert_eq!(child.parent_id.as_ref(), Some(&root_id));
        assert_eq!(child.agent, Some(Capability::new("inventory")));
    }

    #[test]
    fn test_in_progress_run_readable() {
        let recorder = TraceRecorder::new();
        let run_id = RunId::from("run-2");

        let root = recorder.start_span(&run_id, None, "orchestrate", None);
        let child = recorder.start_span(&run_id, Some(root.span_id()), "invoke", None);
        recorder.end_span(child, BTreeMap::new());

        // Root is still open; only the finished child is visible.
        assert_eq!(recorder.spans(&run_id).len(), 1);
        recorder.end_span(root, BTreeMap::new());
        assert_eq!(recorder.spans(&run_id).len(), 2);
    }

    #[test]
    fn test_spans_ordered_by_start_time() {
        let recorder = TraceRecorder::new();
        let run_id = RunId::from("run-3");

        let first = recorder.start_span(&run_id, None, "first", None);
        std::thread::sleep(std::time::Duration::from_millis(2));
        let second = recorder.start_span(&run_id, Some(first.span_id()), "second", None);

        // End out of order; read order follows start time.
        recorder.end_span(second, BTreeMap::new());
        recorder.end_span(first, BTreeMap::new());

        let spans = recorder.spans(&run_id);
        assert_eq!(spans[0].label, "first");
        assert_eq!(spans[1].label, "second");
    }

    #[test]
    fn test_evict_run_clears_spans() {
        let recorder = TraceRecorder::new();
        let run_id = RunId::from("run-4");
        let root = recorder.start_span(&run_id, None, "orchestrate", None);
        recorder.end_span(root, BTreeMap::new());

        recorder.evict_run(&run_id);
        assert!(recorder.spans(&run_id).is_empty());
    }
}
