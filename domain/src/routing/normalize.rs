//! Payload normalization for incompatible agent output shapes.
//!
//! Worker agents owned by independent teams do not always honor the
//! structured-JSON contract. The handoff router normalizes merely-malformed
//! payloads (non-JSON fragments, bare scalars, arrays) into a common object
//! shape before composing the final response, instead of failing the
//! invocation. This is a pure function with no side effects.

use serde_json::{json, Value};

/// Normalize a raw agent response body into a JSON object.
///
/// - a JSON object passes through unchanged
/// - other valid JSON (array, scalar) is wrapped as `{"value": ...}`
/// - anything unparseable is wrapped as `{"text": "<trimmed body>"}`
pub fn normalize_payload(raw: &str) -> Value {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Value::Object(map),
        Ok(other) => json!({ "value": other }),
        Err(_) => json!({ "text": raw.trim() }),
    }
}
