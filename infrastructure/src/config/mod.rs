//! Configuration loading.

pub mod file_config;
pub mod loader;

pub use file_config::{AgentEntry, FileConfig, OrchestratorSection, TraceSection};
pub use loader::ConfigLoader;
