//! Identity generation for runs and spans.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Generate a UUID-v4-shaped identifier (without external dependency).
///
/// The final group carries a process-wide sequence number, so two calls can
/// never produce the same identifier within one process lifetime even if the
/// clock stalls or steps backwards.
pub(crate) fn time_ordered_uuid(counter: &AtomicU64) -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();

    let nanos = now.as_nanos();
    let seq = counter.fetch_add(1, Ordering::Relaxed);

    format!(
        "{:08x}-{:04x}-4{:03x}-{:04x}-{:012x}",
        (nanos >> 96) as u32,
        (nanos >> 80) as u16,
        (nanos >> 64) as u16 & 0x0fff,
        ((nanos >> 48) as u16 & 0x3fff) | 0x8000,
        seq & 0xffff_ffff_ffff
    )
}
