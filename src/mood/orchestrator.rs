//! # Mood Playlist Orchestrator
//!
//! Coordinates one generation:
//! 1. Analyse the image with the vision model
//! 2. Generate the narrative (mood description or story)
//! 3. Authenticate against the music catalog
//! 4. Search tracks for `genre + mood`
//! 5. Assemble the result
//!
//! Every step depends on the previous one, so the calls run strictly in
//! sequence. Any failure aborts the whole generation.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use super::error::{MoodError, UpstreamStage};
use super::strategy::{GenerationStrategy, MoodStrategy, StoryStrategy};
use super::types::{Mood, MoodResult, StrategyKind, ValidatedRequest};
use crate::llm::{CompletionOptions, LlmProvider};
use crate::music_catalog::MusicCatalog;
use crate::server::metrics;

/// Hard cap on tracks per result.
pub const MAX_TRACKS: u32 = 10;

#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    /// Tracks requested from the catalog, at most [`MAX_TRACKS`].
    pub track_limit: u32,
    /// Timeout applied to each text-model call.
    pub upstream_timeout: Duration,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            track_limit: MAX_TRACKS,
            upstream_timeout: Duration::from_secs(30),
        }
    }
}

/// Builds the catalog query. Multi-word genres are quoted so the filter
/// covers the whole name.
pub fn search_query(genre: &str, mood: Mood) -> String {
    let genre = genre.replace('"', "");
    if genre.contains(char::is_whitespace) {
        format!("genre:\"{}\" {}", genre, mood)
    } else {
        format!("genre:{} {}", genre, mood)
    }
}

async fn timed<T, E, F>(stage: UpstreamStage, call: F) -> Result<T, E>
where
    F: Future<Output = Result<T, E>>,
{
    let start = Instant::now();
    let result = call.await;
    metrics::record_upstream_call(stage.as_str(), result.is_ok(), start.elapsed());
    result
}

#[derive(Clone)]
pub struct MoodOrchestrator {
    llm: Arc<dyn LlmProvider>,
    catalog: Arc<dyn MusicCatalog>,
    settings: OrchestratorSettings,
}

impl MoodOrchestrator {
    pub fn new(
        llm: Arc<dyn LlmProvider>,
        catalog: Arc<dyn MusicCatalog>,
        settings: OrchestratorSettings,
    ) -> Self {
        let settings = OrchestratorSettings {
            track_limit: settings.track_limit.clamp(1, MAX_TRACKS),
            ..settings
        };
        Self {
            llm,
            catalog,
            settings,
        }
    }

    pub fn settings(&self) -> &OrchestratorSettings {
        &self.settings
    }

    /// Runs a validated request with the strategy it selected.
    pub async fn generate(&self, request: ValidatedRequest) -> Result<MoodResult, MoodError> {
        match request.strategy {
            StrategyKind::Mood => self.run(&MoodStrategy, request).await,
            StrategyKind::Story => self.run(&StoryStrategy, request).await,
        }
    }

    fn completion_options(&self, max_tokens: Option<u32>) -> CompletionOptions {
        CompletionOptions {
            max_tokens,
            ..CompletionOptions::default()
        }
        .with_timeout(self.settings.upstream_timeout)
    }

    async fn run<S: GenerationStrategy>(
        &self,
        strategy: &S,
        request: ValidatedRequest,
    ) -> Result<MoodResult, MoodError> {
        let ValidatedRequest {
            image,
            genre,
            mood_hint,
            ..
        } = request;

        debug!(
            strategy = ?S::KIND,
            image_bytes = image.decoded_len(),
            mime_type = image.mime_type(),
            genre = %genre,
            "Starting generation"
        );

        let analysis_options = self.completion_options(Some(strategy.analysis_max_tokens()));
        let analysis_reply = timed(
            UpstreamStage::MoodAnalysis,
            self.llm
                .complete(&strategy.analysis_messages(&image), &analysis_options),
        )
        .await
        .map_err(|e| MoodError::from_llm(UpstreamStage::MoodAnalysis, e))?;

        let analysis = strategy.interpret_analysis(&analysis_reply.content)?;
        let mood = strategy.search_mood(&analysis, mood_hint);
        debug!(raw = %analysis_reply.content.trim(), mood = %mood, "Image analysed");

        let narrative_options = self.completion_options(strategy.narrative_max_tokens());
        let narrative_reply = timed(
            UpstreamStage::DescriptionGeneration,
            self.llm.complete(
                &strategy.narrative_messages(&analysis, &genre, mood),
                &narrative_options,
            ),
        )
        .await
        .map_err(|e| MoodError::from_llm(UpstreamStage::DescriptionGeneration, e))?;

        let narrative = narrative_reply.content.trim().to_string();
        if narrative.is_empty() {
            return Err(MoodError::upstream(
                UpstreamStage::DescriptionGeneration,
                "model returned an empty narrative",
            ));
        }

        let token = timed(UpstreamStage::Auth, self.catalog.authenticate())
            .await
            .map_err(|e| MoodError::from_catalog(UpstreamStage::Auth, e))?;

        let query = search_query(&genre, mood);
        let mut tracks = timed(
            UpstreamStage::CatalogSearch,
            self.catalog
                .search_tracks(&token, &query, self.settings.track_limit),
        )
        .await
        .map_err(|e| MoodError::from_catalog(UpstreamStage::CatalogSearch, e))?;
        tracks.truncate(self.settings.track_limit as usize);

        info!(
            strategy = ?S::KIND,
            mood = %mood,
            genre = %genre,
            tracks = tracks.len(),
            "Generated mood playlist"
        );

        Ok(MoodResult {
            story_data: strategy.story_data(analysis, narrative, genre),
            tracks,
        })
    }
}
