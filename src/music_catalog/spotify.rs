//! Spotify Web API client: client-credentials auth and track search.

use super::models::{SpotifySearchResponse, SpotifyTokenResponse, Track};
use super::provider::{AccessToken, CatalogError, MusicCatalog};
use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_SPOTIFY_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_SPOTIFY_API_BASE: &str = "https://api.spotify.com/v1";

/// Upper bound the search endpoint accepts for `limit`.
const MAX_SEARCH_LIMIT: u32 = 50;

#[derive(Clone)]
pub struct SpotifyCredentials {
    pub client_id: String,
    pub client_secret: String,
}

/// HTTP client for the Spotify Web API.
pub struct SpotifyCatalog {
    http: Client,
    credentials: SpotifyCredentials,
    token_url: String,
    api_base: String,
}

impl SpotifyCatalog {
    /// Create a new Spotify client.
    ///
    /// # Arguments
    /// * `credentials` - Application client id and secret
    /// * `token_url` - Accounts service token endpoint
    /// * `api_base` - Web API base URL (e.g., "https://api.spotify.com/v1")
    /// * `timeout` - Per-request timeout
    pub fn new(
        credentials: SpotifyCredentials,
        token_url: impl Into<String>,
        api_base: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, CatalogError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let http = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| CatalogError::Connection(format!("build client: {e}")))?;

        Ok(Self {
            http,
            credentials,
            token_url: token_url.into(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn map_send_error(e: reqwest::Error) -> CatalogError {
        if e.is_timeout() {
            CatalogError::Timeout
        } else {
            CatalogError::Connection(e.to_string())
        }
    }
}

#[async_trait]
impl MusicCatalog for SpotifyCatalog {
    fn name(&self) -> &str {
        "spotify"
    }

    /// POST {token_url} grant_type=client_credentials
    async fn authenticate(&self) -> Result<AccessToken, CatalogError> {
        let response = self
            .http
            .post(&self.token_url)
            .basic_auth(
                &self.credentials.client_id,
                Some(&self.credentials.client_secret),
            )
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(Self::map_send_error)?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(CatalogError::RateLimited);
        }
        if status == StatusCode::BAD_REQUEST || status == StatusCode::UNAUTHORIZED {
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::Auth(body));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let token: SpotifyTokenResponse = response.json().await.map_err(|e| {
            CatalogError::InvalidResponse(format!("Failed to parse token response: {e}"))
        })?;

        if token.access_token.is_empty() {
            return Err(CatalogError::InvalidResponse(
                "Token response carried an empty access_token".to_string(),
            ));
        }

        debug!(
            token_type = %token.token_type,
            expires_in = token.expires_in,
            "Obtained catalog access token"
        );

        Ok(AccessToken {
            value: token.access_token,
            expires_in: token.expires_in,
        })
    }

    /// GET /v1/search?type=track&q=...&limit=
    async fn search_tracks(
        &self,
        token: &AccessToken,
        query: &str,
        limit: u32,
    ) -> Result<Vec<Track>, CatalogError> {
        let url = format!("{}/search", self.api_base);
        let limit = limit.clamp(1, MAX_SEARCH_LIMIT).to_string();

        debug!(query = %query, limit = %limit, "Searching catalog tracks");

        let response = self
            .http
            .get(&url)
            .bearer_auth(&token.value)
            .query(&[("type", "track"), ("q", query), ("limit", limit.as_str())])
            .send()
            .await
            .map_err(Self::map_send_error)?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(CatalogError::RateLimited);
        }
        if status == StatusCode::UNAUTHORIZED {
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::Auth(body));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let results: SpotifySearchResponse = response.json().await.map_err(|e| {
            CatalogError::InvalidResponse(format!("Failed to parse search response: {e}"))
        })?;

        Ok(results.into_tracks())
    }
}
