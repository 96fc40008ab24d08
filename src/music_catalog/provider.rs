//! Music catalog trait definition.

use super::models::Track;
use async_trait::async_trait;
use thiserror::Error;

/// Short-lived bearer token from a client-credentials exchange.
#[derive(Clone)]
pub struct AccessToken {
    pub value: String,
    /// Lifetime in seconds as reported by the catalog. Informational only:
    /// every request authenticates again.
    pub expires_in: u64,
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("value", &"<redacted>")
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

/// Errors that can occur when talking to the catalog service.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Authentication rejected: {0}")]
    Auth(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Request timeout")]
    Timeout,
}

/// Catalog search capability used by the orchestrator.
#[async_trait]
pub trait MusicCatalog: Send + Sync {
    /// Get the catalog's name (e.g., "spotify").
    fn name(&self) -> &str;

    /// Exchange client credentials for an access token.
    async fn authenticate(&self) -> Result<AccessToken, CatalogError>;

    /// Free-text track search. Results keep the catalog's relevance order.
    async fn search_tracks(
        &self,
        token: &AccessToken,
        query: &str,
        limit: u32,
    ) -> Result<Vec<Track>, CatalogError>;
}
