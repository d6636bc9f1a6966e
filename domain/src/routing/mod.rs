//! Handoff routing domain
//!
//! The router decision loop for the Handoff pattern: a pure state machine
//! over (query, invoked-set, capability metadata), plus the payload
//! normalization that is a router responsibility.

pub mod normalize;
pub mod router;
