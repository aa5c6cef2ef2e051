mod file_config;

pub use file_config::{CacheConfig, FileConfig, SpotifyConfig};

use crate::remote::DEFAULT_API_BASE_URL;
use std::path::PathBuf;

/// Placeholder artist the remote catalog attaches to compilations. Counting
/// it would skew every per-playlist artist statistic, so aggregation
/// excludes it by default.
pub const VARIOUS_ARTISTS_ID: &str = "0LyfQWJT6nXafLPZqxe9Of";

pub const DEFAULT_MAX_AGE_SECS: u64 = 24 * 60 * 60;
/// Remote API ceiling for one batch artist lookup.
pub const DEFAULT_ARTIST_CHUNK_SIZE: usize = 50;
/// Remote API ceiling for one batch audio-features lookup.
pub const DEFAULT_AUDIO_FEATURES_CHUNK_SIZE: usize = 100;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub snapshot_path: PathBuf,
    pub max_age_secs: u64,
    pub watch_interval_secs: Option<u64>,
    pub api_base_url: Option<String>,
    pub timeout_secs: u64,
}

/// Settings consumed by the cache core.
#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub snapshot_path: PathBuf,
    pub max_age_secs: u64,
    pub artist_chunk_size: usize,
    pub audio_features_chunk_size: usize,
    pub excluded_artist_ids: Vec<String>,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            snapshot_path: PathBuf::from("playlists_data.json"),
            max_age_secs: DEFAULT_MAX_AGE_SECS,
            artist_chunk_size: DEFAULT_ARTIST_CHUNK_SIZE,
            audio_features_chunk_size: DEFAULT_AUDIO_FEATURES_CHUNK_SIZE,
            excluded_artist_ids: vec![VARIOUS_ARTISTS_ID.to_owned()],
        }
    }
}

#[derive(Debug, Clone)]
pub struct SpotifySettings {
    pub api_base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub cache: CacheSettings,
    pub spotify: SpotifySettings,
    pub watch_interval_secs: Option<u64>,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Self {
        let file = file_config.unwrap_or_default();
        let cache_file = file.cache.unwrap_or_default();
        let spotify_file = file.spotify.unwrap_or_default();

        let cache = CacheSettings {
            snapshot_path: file
                .snapshot_path
                .map(PathBuf::from)
                .unwrap_or_else(|| cli.snapshot_path.clone()),
            max_age_secs: cache_file.max_age_secs.unwrap_or(cli.max_age_secs),
            artist_chunk_size: cache_file
                .artist_chunk_size
                .unwrap_or(DEFAULT_ARTIST_CHUNK_SIZE),
            audio_features_chunk_size: cache_file
                .audio_features_chunk_size
                .unwrap_or(DEFAULT_AUDIO_FEATURES_CHUNK_SIZE),
            excluded_artist_ids: cache_file
                .excluded_artist_ids
                .unwrap_or_else(|| vec![VARIOUS_ARTISTS_ID.to_owned()]),
        };

        let spotify = SpotifySettings {
            api_base_url: spotify_file
                .api_base_url
                .or_else(|| cli.api_base_url.clone())
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_owned()),
            timeout_secs: spotify_file.timeout_secs.unwrap_or(cli.timeout_secs),
        };

        let watch_interval_secs = file.watch_interval_secs.or(cli.watch_interval_secs);

        Self {
            cache,
            spotify,
            watch_interval_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli_defaults() -> CliConfig {
        CliConfig {
            snapshot_path: PathBuf::from("playlists_data.json"),
            max_age_secs: DEFAULT_MAX_AGE_SECS,
            watch_interval_secs: None,
            api_base_url: None,
            timeout_secs: 30,
        }
    }

    #[test]
    fn resolves_defaults_without_file_config() {
        let config = AppConfig::resolve(&cli_defaults(), None);
        assert_eq!(config.cache.max_age_secs, 86400);
        assert_eq!(config.cache.artist_chunk_size, 50);
        assert_eq!(config.cache.audio_features_chunk_size, 100);
        assert_eq!(
            config.cache.excluded_artist_ids,
            vec![VARIOUS_ARTISTS_ID.to_owned()]
        );
        assert_eq!(config.spotify.api_base_url, DEFAULT_API_BASE_URL);
    }

    #[test]
    fn file_config_overrides_cli() {
        let file = FileConfig {
            snapshot_path: Some("/tmp/other.json".to_owned()),
            watch_interval_secs: Some(300),
            cache: Some(CacheConfig {
                max_age_secs: Some(3600),
                artist_chunk_size: None,
                audio_features_chunk_size: Some(20),
                excluded_artist_ids: Some(vec![]),
            }),
            spotify: None,
        };
        let config = AppConfig::resolve(&cli_defaults(), Some(file));
        assert_eq!(config.cache.snapshot_path, PathBuf::from("/tmp/other.json"));
        assert_eq!(config.cache.max_age_secs, 3600);
        assert_eq!(config.cache.artist_chunk_size, 50);
        assert_eq!(config.cache.audio_features_chunk_size, 20);
        assert!(config.cache.excluded_artist_ids.is_empty());
        assert_eq!(config.watch_interval_secs, Some(300));
    }
}
