//! Music catalog search.
//!
//! [`MusicCatalog`] abstracts the catalog service; [`SpotifyCatalog`]
//! talks to the Spotify Web API.

mod models;
mod provider;
mod spotify;

pub use models::{SpotifySearchResponse, SpotifyTrack, Track};
pub use provider::{AccessToken, CatalogError, MusicCatalog};
pub use spotify::{
    SpotifyCatalog, SpotifyCredentials, DEFAULT_SPOTIFY_API_BASE, DEFAULT_SPOTIFY_TOKEN_URL,
};
