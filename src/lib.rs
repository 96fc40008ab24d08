//! MoodSync Server Library
//!
//! Exposes the internal modules for the binary and the e2e tests.

pub mod config;
pub mod llm;
pub mod mood;
pub mod music_catalog;
pub mod server;

// Re-export commonly used types for convenience
pub use mood::{MoodOrchestrator, MoodRequest, MoodResult, OrchestratorSettings};
pub use server::{run_server, RequestsLoggingLevel};
