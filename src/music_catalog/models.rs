//! Track model returned to clients, and the Spotify Web API payloads it
//! is converted from.

use serde::{Deserialize, Serialize};

/// One catalog search hit, in the shape the frontend renders.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    /// First credited artist.
    pub artist: String,
    pub album: String,
    pub duration_ms: u64,
    pub preview_url: Option<String>,
    pub external_url: String,
}

// =============================================================================
// Spotify API Response Types
// =============================================================================

#[derive(Clone, Debug, Deserialize)]
pub struct SpotifyTokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: u64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SpotifySearchResponse {
    /// Absent when the query matched nothing in the track namespace.
    pub tracks: Option<SpotifyTrackPage>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SpotifyTrackPage {
    #[serde(default)]
    pub items: Vec<SpotifyTrack>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SpotifyArtist {
    pub name: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SpotifyAlbum {
    pub name: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct SpotifyExternalUrls {
    pub spotify: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SpotifyTrack {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<SpotifyArtist>,
    pub album: SpotifyAlbum,
    pub duration_ms: u64,
    pub preview_url: Option<String>,
    #[serde(default)]
    pub external_urls: SpotifyExternalUrls,
}

impl SpotifyTrack {
    /// Convert to the client-facing Track model
    pub fn to_track(&self) -> Track {
        Track {
            id: self.id.clone(),
            name: self.name.clone(),
            artist: self
                .artists
                .first()
                .map(|a| a.name.clone())
                .unwrap_or_default(),
            album: self.album.name.clone(),
            duration_ms: self.duration_ms,
            preview_url: self.preview_url.clone(),
            external_url: self.external_urls.spotify.clone().unwrap_or_default(),
        }
    }
}

impl SpotifySearchResponse {
    /// Tracks in the order the catalog ranked them.
    pub fn into_tracks(self) -> Vec<Track> {
        self.tracks
            .map(|page| page.items.iter().map(SpotifyTrack::to_track).collect())
            .unwrap_or_default()
    }
}
