//! JSONL file writer for trace spans.
//!
//! Each completed span is serialized as a single JSON line and appended
//! via a buffered writer. This stands in for the external observability
//! collector in local deployments; the span shape on the wire is exactly
//! the domain `TraceSpan`.

use concierge_application::SpanExporter;
use concierge_domain::TraceSpan;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

/// JSONL span sink that writes one JSON object per line.
///
/// Thread-safe via `Mutex<BufWriter<File>>`. Flushes on every span (the
/// log is append-only and consumed by external tooling) and on `Drop`.
pub struct JsonlSpanExporter {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlSpanExporter {
    /// Create a new exporter appending to the given path.
    ///
    /// Creates the file (and parent directories) if they don't exist.
    /// Returns `None` if the file cannot be opened.
    pub fn new(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                warn!(
                    "Could not create span log directory {}: {}",
                    parent.display(),
                    e
                );
                return None;
            }
        }

        let file = match OpenOptions::new().create(true).append(true).open(path) {
            Ok(f) => f,
            Err(e) => {
                warn!("Could not open span log file {}: {}", path.display(), e);
                return None;
            }
        };

        Some(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    /// Get the path to the span log file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SpanExporter for JsonlSpanExporter {
    fn export(&self, span: &TraceSpan) {
        let Ok(line) = serde_json::to_string(span) else {
            return;
        };

        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", line);
            let _ = writer.flush();
        }
    }
}

impl Drop for JsonlSpanExporter {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}
