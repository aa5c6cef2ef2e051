use anyhow::{bail, Context, Result};
use clap::Parser;
use playlist_mirror::config::{AppConfig, CliConfig, FileConfig, DEFAULT_MAX_AGE_SECS};
use playlist_mirror::{CatalogCache, SpotifyWebClient};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to the persisted snapshot file.
    #[clap(long, default_value = "playlists_data.json")]
    pub snapshot_path: PathBuf,

    /// Maximum snapshot age in seconds before a refresh is forced.
    #[clap(long, default_value_t = DEFAULT_MAX_AGE_SECS)]
    pub max_age_secs: u64,

    /// Optional TOML config file; values there override CLI arguments.
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// Spotify Web API bearer token. Falls back to the SPOTIFY_TOKEN
    /// environment variable.
    #[clap(long)]
    pub token: Option<String>,

    /// Override the Spotify Web API base URL.
    #[clap(long)]
    pub api_base_url: Option<String>,

    /// Timeout in seconds for remote catalog requests.
    #[clap(long, default_value_t = 30)]
    pub timeout_secs: u64,

    /// Keep running and re-check freshness at this interval instead of
    /// exiting after one pass.
    #[clap(long)]
    pub watch_interval_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .unwrap();

    let file_config = match &cli_args.config {
        Some(path) => Some(FileConfig::load(path)?),
        None => None,
    };
    let cli_config = CliConfig {
        snapshot_path: cli_args.snapshot_path.clone(),
        max_age_secs: cli_args.max_age_secs,
        watch_interval_secs: cli_args.watch_interval_secs,
        api_base_url: cli_args.api_base_url.clone(),
        timeout_secs: cli_args.timeout_secs,
    };
    let config = AppConfig::resolve(&cli_config, file_config);

    let token = match cli_args.token {
        Some(token) => token,
        None => match std::env::var("SPOTIFY_TOKEN") {
            Ok(token) if !token.is_empty() => token,
            _ => bail!("No API token: pass --token or set SPOTIFY_TOKEN"),
        },
    };

    let remote = SpotifyWebClient::new(
        config.spotify.api_base_url.clone(),
        token,
        config.spotify.timeout_secs,
    )
    .context("Failed to create remote catalog client")?;

    info!(
        "Opening snapshot at {:?} (max age {}s)...",
        config.cache.snapshot_path, config.cache.max_age_secs
    );
    let cache = CatalogCache::open(config.cache.clone());

    let outcome = cache.ensure_fresh(&remote).await;
    log_pass(&cache, outcome).await;

    if let Some(interval_secs) = config.watch_interval_secs {
        info!("Watching: re-checking freshness every {}s", interval_secs);
        let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
        // Skip the first immediate tick, wait for the first interval
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let outcome = cache.ensure_fresh(&remote).await;
            log_pass(&cache, outcome).await;
        }
    }

    Ok(())
}

async fn log_pass(cache: &CatalogCache, outcome: playlist_mirror::RefreshOutcome) {
    let overview = cache.overview().await;
    match outcome {
        playlist_mirror::RefreshOutcome::Failed => warn!(
            "Refresh failed; serving previous snapshot: {} playlists, {} tracks, {} artists",
            overview.num_playlists, overview.num_unique_tracks, overview.num_unique_artists
        ),
        _ => info!(
            "Snapshot ready ({:?}): {} playlists, {} tracks, {} artists",
            outcome, overview.num_playlists, overview.num_unique_tracks, overview.num_unique_artists
        ),
    }
}
