use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use moodsync_server::config::{self, AppConfig, EnvConfig};
use moodsync_server::llm::{LlmProvider, OpenAIProvider};
use moodsync_server::mood::{MoodOrchestrator, OrchestratorSettings};
use moodsync_server::music_catalog::{SpotifyCatalog, SpotifyCredentials};
use moodsync_server::server::{metrics, run_server, RequestsLoggingLevel, ServerConfig};

fn parse_path(s: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(s);
    if path.is_absolute() {
        return Ok(path);
    }
    let cwd = std::env::current_dir().map_err(|e| format!("Failed to get current dir: {}", e))?;
    Ok(cwd.join(path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to TOML configuration file. Values in the file override CLI arguments.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = config::DEFAULT_PORT)]
    pub port: u16,

    /// The port for the metrics server (Prometheus scraping).
    #[clap(long, default_value_t = config::DEFAULT_METRICS_PORT)]
    pub metrics_port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Path to the frontend directory to be statically served.
    #[clap(long)]
    pub frontend_dir_path: Option<String>,

    /// Timeout in seconds for each call to the vision model or the music catalog.
    #[clap(long, default_value_t = config::DEFAULT_UPSTREAM_TIMEOUT_SEC)]
    pub upstream_timeout_sec: u64,

    /// Largest accepted request body in bytes.
    #[clap(long, default_value_t = config::DEFAULT_MAX_UPLOAD_BYTES)]
    pub max_upload_bytes: usize,

    /// Number of tracks per playlist (1 to 10).
    #[clap(long, default_value_t = moodsync_server::mood::MAX_TRACKS)]
    pub track_limit: u32,
}

/// Convert CLI args to CliConfig for config resolution
impl From<&CliArgs> for config::CliConfig {
    fn from(args: &CliArgs) -> Self {
        config::CliConfig {
            port: args.port,
            metrics_port: args.metrics_port,
            logging_level: args.logging_level.clone(),
            frontend_dir_path: args.frontend_dir_path.clone(),
            upstream_timeout_sec: args.upstream_timeout_sec,
            max_upload_bytes: args.max_upload_bytes,
            track_limit: args.track_limit,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    // Before the subscriber, so LOG_LEVEL may come from .env
    let dotenv_result = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    match dotenv_result {
        Ok(path) => info!("Loaded environment from {:?}", path),
        Err(e) if e.not_found() => {}
        Err(e) => warn!("Ignoring unreadable .env file: {}", e),
    }

    // Load TOML config if provided
    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            Some(config::FileConfig::load(path)?)
        }
        None => None,
    };

    // Resolve final configuration (TOML overrides CLI and environment)
    let cli_config: config::CliConfig = (&cli_args).into();
    let app_config = AppConfig::resolve(&cli_config, file_config, &EnvConfig::from_env())?;

    info!("Configuration loaded:");
    info!("  port: {}", app_config.port);
    info!("  logging_level: {}", app_config.logging_level);
    info!("  upstream_timeout_sec: {}", app_config.upstream_timeout_sec);
    info!(
        "  max_upload_bytes: {:#}",
        byte_unit::Byte::from(app_config.max_upload_bytes)
    );
    info!("  track_limit: {}", app_config.track_limit);
    info!(
        "  openai: {} ({})",
        app_config.openai.base_url, app_config.openai.model
    );
    info!("  spotify: {}", app_config.spotify.api_base);

    metrics::init_metrics();

    let llm: Arc<dyn LlmProvider> = Arc::new(OpenAIProvider::new(
        app_config.openai.base_url.clone(),
        app_config.openai.model.clone(),
        Some(app_config.openai.api_key.clone()),
    ));
    match llm.health_check().await {
        Ok(()) => info!("Vision model {} reachable", llm.model()),
        Err(e) => warn!("Vision model health check failed: {}", e),
    }

    let catalog = Arc::new(SpotifyCatalog::new(
        SpotifyCredentials {
            client_id: app_config.spotify.client_id.clone(),
            client_secret: app_config.spotify.client_secret.clone(),
        },
        app_config.spotify.token_url.clone(),
        app_config.spotify.api_base.clone(),
        app_config.upstream_timeout(),
    )?);

    let orchestrator = Arc::new(MoodOrchestrator::new(
        llm,
        catalog,
        OrchestratorSettings {
            track_limit: app_config.track_limit,
            upstream_timeout: app_config.upstream_timeout(),
        },
    ));

    let server_config = ServerConfig {
        requests_logging_level: app_config.logging_level.clone(),
        port: app_config.port,
        max_upload_bytes: app_config.max_upload_bytes,
        frontend_dir_path: app_config.frontend_dir_path.clone(),
    };

    let result = run_server(server_config, orchestrator, app_config.metrics_port).await;
    info!("HTTP server stopped: {:?}", result);
    result
}
