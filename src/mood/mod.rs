//! Mood playlist generation.
//!
//! Turns a selfie and a genre into a mood reading, a short narrative and a
//! list of matching tracks.

mod error;
mod orchestrator;
mod strategy;
mod types;

pub use error::{MoodError, UpstreamStage};
pub use orchestrator::{search_query, MoodOrchestrator, OrchestratorSettings, MAX_TRACKS};
pub use strategy::{GenerationStrategy, MoodStrategy, StoryStrategy};
pub use types::{
    ImagePayload, Mood, MoodRequest, MoodResult, StoryData, StrategyKind, ValidatedRequest,
    MAX_GENRE_LEN, REQUIRED_FIELDS_MESSAGE,
};
