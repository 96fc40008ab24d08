//! Call-counting stand-ins for the vision model and the music catalog.

use async_trait::async_trait;
use moodsync_server::llm::{
    CompletionOptions, CompletionResponse, FinishReason, LlmError, LlmProvider, Message,
};
use moodsync_server::music_catalog::{AccessToken, CatalogError, MusicCatalog, Track};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Answers completions from a script, one entry per call.
pub struct FakeLlm {
    replies: Mutex<VecDeque<Result<String, LlmError>>>,
    prompts: Mutex<Vec<Vec<Message>>>,
}

impl FakeLlm {
    pub fn replying(replies: &[&str]) -> Arc<Self> {
        Self::scripted(replies.iter().map(|r| Ok(r.to_string())).collect())
    }

    pub fn scripted(replies: Vec<Result<String, LlmError>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn prompts(&self) -> Vec<Vec<Message>> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmProvider for FakeLlm {
    fn name(&self) -> &str {
        "fake"
    }

    fn model(&self) -> &str {
        "fake-vision"
    }

    async fn complete(
        &self,
        messages: &[Message],
        _options: &CompletionOptions,
    ) -> Result<CompletionResponse, LlmError> {
        self.prompts.lock().unwrap().push(messages.to_vec());
        let content = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::InvalidResponse("no scripted reply".into())))?;
        Ok(CompletionResponse {
            content,
            finish_reason: FinishReason::Stop,
            usage: None,
        })
    }

    async fn health_check(&self) -> Result<(), LlmError> {
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeCatalog {
    tracks: Vec<Track>,
    auth_error: Option<fn() -> CatalogError>,
    search_error: Option<fn() -> CatalogError>,
    auth_calls: AtomicUsize,
    searches: Mutex<Vec<(String, u32)>>,
}

impl FakeCatalog {
    pub fn empty() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_tracks(tracks: Vec<Track>) -> Arc<Self> {
        Arc::new(Self {
            tracks,
            ..Default::default()
        })
    }

    pub fn failing_auth() -> Arc<Self> {
        Arc::new(Self {
            auth_error: Some(|| CatalogError::Auth("invalid_client".into())),
            ..Default::default()
        })
    }

    pub fn failing_search() -> Arc<Self> {
        Arc::new(Self {
            search_error: Some(|| CatalogError::Api {
                status: 503,
                message: "unavailable".into(),
            }),
            ..Default::default()
        })
    }

    pub fn auth_calls(&self) -> usize {
        self.auth_calls.load(Ordering::SeqCst)
    }

    /// `(query, limit)` of every search, in order.
    pub fn searches(&self) -> Vec<(String, u32)> {
        self.searches.lock().unwrap().clone()
    }
}

#[async_trait]
impl MusicCatalog for FakeCatalog {
    fn name(&self) -> &str {
        "fake"
    }

    async fn authenticate(&self) -> Result<AccessToken, CatalogError> {
        self.auth_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.auth_error {
            return Err(error());
        }
        Ok(AccessToken {
            value: "fake-token".into(),
            expires_in: 3600,
        })
    }

    async fn search_tracks(
        &self,
        _token: &AccessToken,
        query: &str,
        limit: u32,
    ) -> Result<Vec<Track>, CatalogError> {
        self.searches
            .lock()
            .unwrap()
            .push((query.to_string(), limit));
        if let Some(error) = self.search_error {
            return Err(error());
        }
        Ok(self.tracks.clone())
    }
}

/// `count` distinct tracks, `track-0` first.
pub fn sample_tracks(count: usize) -> Vec<Track> {
    (0..count)
        .map(|n| Track {
            id: format!("track-{n}"),
            name: format!("Song {n}"),
            artist: format!("Artist {n}"),
            album: format!("Album {n}"),
            duration_ms: 200_000 + n as u64,
            preview_url: (n % 2 == 0).then(|| format!("https://p.scdn.co/mp3-preview/{n}")),
            external_url: format!("https://open.spotify.com/track/{n}"),
        })
        .collect()
}
