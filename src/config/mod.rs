mod file_config;

pub use file_config::{FileConfig, OpenAIFileConfig, SpotifyFileConfig};

use crate::llm::{DEFAULT_OPENAI_BASE_URL, DEFAULT_OPENAI_MODEL};
use crate::mood::MAX_TRACKS;
use crate::music_catalog::{DEFAULT_SPOTIFY_API_BASE, DEFAULT_SPOTIFY_TOKEN_URL};
use crate::server::RequestsLoggingLevel;
use anyhow::Result;
use clap::ValueEnum;
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use url::Url;

pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_METRICS_PORT: u16 = 9091;
pub const DEFAULT_UPSTREAM_TIMEOUT_SEC: u64 = 30;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Environment variable names.
pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_OPENAI_BASE_URL: &str = "OPENAI_BASE_URL";
pub const ENV_OPENAI_MODEL: &str = "OPENAI_MODEL";
pub const ENV_SPOTIFY_CLIENT_ID: &str = "SPOTIFY_CLIENT_ID";
pub const ENV_SPOTIFY_CLIENT_SECRET: &str = "SPOTIFY_CLIENT_SECRET";
pub const ENV_SPOTIFY_REDIRECT_URI: &str = "SPOTIFY_REDIRECT_URI";
pub const ENV_SPOTIFY_TOKEN_URL: &str = "SPOTIFY_TOKEN_URL";
pub const ENV_SPOTIFY_API_BASE: &str = "SPOTIFY_API_BASE";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("{0} is not set")]
    MissingCredential(&'static str),

    #[error("{name} is not a valid http(s) URL ({value}): {reason}")]
    InvalidUrl {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// CLI arguments that can be used for config resolution.
/// TOML config overrides any of these.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub frontend_dir_path: Option<String>,
    pub upstream_timeout_sec: u64,
    pub max_upload_bytes: usize,
    pub track_limit: u32,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            metrics_port: DEFAULT_METRICS_PORT,
            logging_level: RequestsLoggingLevel::Path,
            frontend_dir_path: None,
            upstream_timeout_sec: DEFAULT_UPSTREAM_TIMEOUT_SEC,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            track_limit: MAX_TRACKS,
        }
    }
}

/// Snapshot of the environment variables the server reads.
#[derive(Default, Clone)]
pub struct EnvConfig {
    pub openai_api_key: Option<String>,
    pub openai_base_url: Option<String>,
    pub openai_model: Option<String>,
    pub spotify_client_id: Option<String>,
    pub spotify_client_secret: Option<String>,
    pub spotify_redirect_uri: Option<String>,
    pub spotify_token_url: Option<String>,
    pub spotify_api_base: Option<String>,
}

impl EnvConfig {
    /// Reads the process environment. Call `dotenvy::dotenv()` first to
    /// pick up a `.env` file.
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok();
        Self {
            openai_api_key: var(ENV_OPENAI_API_KEY),
            openai_base_url: var(ENV_OPENAI_BASE_URL),
            openai_model: var(ENV_OPENAI_MODEL),
            spotify_client_id: var(ENV_SPOTIFY_CLIENT_ID),
            spotify_client_secret: var(ENV_SPOTIFY_CLIENT_SECRET),
            spotify_redirect_uri: var(ENV_SPOTIFY_REDIRECT_URI),
            spotify_token_url: var(ENV_SPOTIFY_TOKEN_URL),
            spotify_api_base: var(ENV_SPOTIFY_API_BASE),
        }
    }
}

impl fmt::Debug for EnvConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvConfig")
            .field("openai_api_key", &self.openai_api_key.as_ref().map(|_| "***"))
            .field("openai_base_url", &self.openai_base_url)
            .field("openai_model", &self.openai_model)
            .field("spotify_client_id", &self.spotify_client_id)
            .field(
                "spotify_client_secret",
                &self.spotify_client_secret.as_ref().map(|_| "***"),
            )
            .field("spotify_redirect_uri", &self.spotify_redirect_uri)
            .field("spotify_token_url", &self.spotify_token_url)
            .field("spotify_api_base", &self.spotify_api_base)
            .finish()
    }
}

#[derive(Clone)]
pub struct OpenAISettings {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

impl fmt::Debug for OpenAISettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAISettings")
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

#[derive(Clone)]
pub struct SpotifySettings {
    pub client_id: String,
    pub client_secret: String,
    /// Recorded but unused: the client-credentials grant has no redirect.
    pub redirect_uri: Option<String>,
    pub token_url: String,
    pub api_base: String,
}

impl fmt::Debug for SpotifySettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpotifySettings")
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .field("redirect_uri", &self.redirect_uri)
            .field("token_url", &self.token_url)
            .field("api_base", &self.api_base)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    // Core settings
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub frontend_dir_path: Option<String>,
    pub upstream_timeout_sec: u64,
    pub max_upload_bytes: usize,
    pub track_limit: u32,

    // Upstream services
    pub openai: OpenAISettings,
    pub spotify: SpotifySettings,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments, the optional TOML file
    /// and the environment. TOML values override CLI values; TOML
    /// `[openai]`/`[spotify]` sections override the environment.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>, env: &EnvConfig) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let port = file.port.unwrap_or(cli.port);
        let metrics_port = file.metrics_port.unwrap_or(cli.metrics_port);

        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or_else(|| cli.logging_level.clone());

        let frontend_dir_path = file
            .frontend_dir_path
            .or_else(|| cli.frontend_dir_path.clone());
        let upstream_timeout_sec = file
            .upstream_timeout_sec
            .unwrap_or(cli.upstream_timeout_sec)
            .max(1);
        let max_upload_bytes = file.max_upload_bytes.unwrap_or(cli.max_upload_bytes);
        let track_limit = file
            .track_limit
            .unwrap_or(cli.track_limit)
            .clamp(1, MAX_TRACKS);

        let openai_file = file.openai.unwrap_or_default();
        let openai = OpenAISettings {
            api_key: required(ENV_OPENAI_API_KEY, openai_file.api_key, &env.openai_api_key)?,
            base_url: url_setting(
                ENV_OPENAI_BASE_URL,
                optional(openai_file.base_url, &env.openai_base_url),
                DEFAULT_OPENAI_BASE_URL,
            )?,
            model: optional(openai_file.model, &env.openai_model)
                .unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
        };

        let spotify_file = file.spotify.unwrap_or_default();
        let spotify = SpotifySettings {
            client_id: required(
                ENV_SPOTIFY_CLIENT_ID,
                spotify_file.client_id,
                &env.spotify_client_id,
            )?,
            client_secret: required(
                ENV_SPOTIFY_CLIENT_SECRET,
                spotify_file.client_secret,
                &env.spotify_client_secret,
            )?,
            redirect_uri: optional(spotify_file.redirect_uri, &env.spotify_redirect_uri),
            token_url: url_setting(
                ENV_SPOTIFY_TOKEN_URL,
                optional(spotify_file.token_url, &env.spotify_token_url),
                DEFAULT_SPOTIFY_TOKEN_URL,
            )?,
            api_base: url_setting(
                ENV_SPOTIFY_API_BASE,
                optional(spotify_file.api_base, &env.spotify_api_base),
                DEFAULT_SPOTIFY_API_BASE,
            )?,
        };

        Ok(Self {
            port,
            metrics_port,
            logging_level,
            frontend_dir_path,
            upstream_timeout_sec,
            max_upload_bytes,
            track_limit,
            openai,
            spotify,
        })
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_sec)
    }
}

/// Blank values count as unset.
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn optional(file_value: Option<String>, env_value: &Option<String>) -> Option<String> {
    non_blank(file_value).or_else(|| non_blank(env_value.clone()))
}

fn required(
    name: &'static str,
    file_value: Option<String>,
    env_value: &Option<String>,
) -> Result<String, ConfigurationError> {
    optional(file_value, env_value).ok_or(ConfigurationError::MissingCredential(name))
}

fn url_setting(
    name: &'static str,
    value: Option<String>,
    default: &str,
) -> Result<String, ConfigurationError> {
    let Some(value) = value else {
        return Ok(default.to_string());
    };
    let invalid = |reason: String| ConfigurationError::InvalidUrl {
        name,
        value: value.clone(),
        reason,
    };
    let url = Url::parse(&value).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(invalid(format!("unsupported scheme '{}'", other))),
    }
    if url.host_str().is_none() {
        return Err(invalid("missing host".to_string()));
    }
    Ok(value.trim_end_matches('/').to_string())
}

/// Parses a logging level string into RequestsLoggingLevel.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}
