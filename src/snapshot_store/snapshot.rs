//! The atomic unit of cached state: all playlists, tracks and artists plus
//! the refresh timestamp at one point in time.

use crate::catalog::{Artist, Playlist, Track};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Snapshot {
    #[serde(rename = "playlists_data")]
    pub playlists: HashMap<String, Playlist>,
    #[serde(rename = "tracks_details")]
    pub tracks: HashMap<String, Track>,
    #[serde(rename = "artists_details")]
    pub artists: HashMap<String, Artist>,
    /// Epoch seconds of the last successful rebuild.
    pub last_updated: i64,
}

impl Snapshot {
    /// An empty snapshot stamped with the current time.
    pub fn empty_now() -> Self {
        Self {
            playlists: HashMap::new(),
            tracks: HashMap::new(),
            artists: HashMap::new(),
            last_updated: chrono::Utc::now().timestamp(),
        }
    }

    /// Freshness policy: a snapshot is valid iff it is younger than
    /// `max_age_secs` and all three entity maps are non-empty. An empty
    /// cache is never fresh, even right after initialization.
    pub fn is_valid(&self, max_age_secs: u64, now: i64) -> bool {
        let age_ok = now - self.last_updated < max_age_secs as i64;
        let populated =
            !self.playlists.is_empty() && !self.tracks.is_empty() && !self.artists.is_empty();
        age_ok && populated
    }

    /// Deserialize a persisted snapshot. An absent or malformed file falls
    /// back to an empty snapshot stamped now, never an error.
    pub fn load(path: &Path) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("Snapshot file {:?} not found, starting empty", path);
                return Self::empty_now();
            }
            Err(e) => {
                warn!("Failed to read snapshot file {:?}: {}", path, e);
                return Self::empty_now();
            }
        };
        match serde_json::from_str::<Snapshot>(&content) {
            Ok(snapshot) => {
                info!(
                    "Loaded snapshot from {:?}: {} playlists, {} tracks, {} artists",
                    path,
                    snapshot.playlists.len(),
                    snapshot.tracks.len(),
                    snapshot.artists.len()
                );
                snapshot
            }
            Err(e) => {
                warn!(
                    "Snapshot file {:?} is malformed ({}), starting empty",
                    path, e
                );
                Self::empty_now()
            }
        }
    }

    /// Serialize the snapshot to durable storage.
    pub fn persist(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string(self).context("Failed to serialize snapshot")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write snapshot file: {:?}", path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Artist, Playlist, Track};

    fn populated_snapshot(last_updated: i64) -> Snapshot {
        let mut snapshot = Snapshot {
            playlists: HashMap::new(),
            tracks: HashMap::new(),
            artists: HashMap::new(),
            last_updated,
        };
        snapshot.playlists.insert(
            "p1".to_owned(),
            Playlist {
                id: "p1".to_owned(),
                name: "Morning".to_owned(),
                image_url: None,
                owner: "me".to_owned(),
                description: String::new(),
                followers: 3,
                track_ids: vec!["t1".to_owned()],
                metrics: None,
            },
        );
        snapshot.tracks.insert(
            "t1".to_owned(),
            Track {
                id: "t1".to_owned(),
                name: "Song".to_owned(),
                artist_ids: vec!["a1".to_owned()],
                album: "Album".to_owned(),
                duration_ms: 200_000,
                external_url: String::new(),
                image_url: None,
                release_date: Some("2001-03-04".to_owned()),
                release_date_precision: None,
                audio_features: None,
            },
        );
        snapshot.artists.insert(
            "a1".to_owned(),
            Artist {
                id: "a1".to_owned(),
                name: "Someone".to_owned(),
                external_url: String::new(),
                popularity: 50,
                genres: vec![],
                image_url: None,
            },
        );
        snapshot
    }

    #[test]
    fn snapshot_within_age_and_populated_is_valid() {
        let now = chrono::Utc::now().timestamp();
        let snapshot = populated_snapshot(now - 3600);
        assert!(snapshot.is_valid(86400, now));
    }

    #[test]
    fn snapshot_older_than_max_age_is_stale() {
        let now = chrono::Utc::now().timestamp();
        let snapshot = populated_snapshot(now - 25 * 3600);
        assert!(!snapshot.is_valid(86400, now));
    }

    #[test]
    fn snapshot_with_empty_artist_map_is_stale_even_when_new() {
        let now = chrono::Utc::now().timestamp();
        let mut snapshot = populated_snapshot(now);
        snapshot.artists.clear();
        assert!(!snapshot.is_valid(86400, now));
    }

    #[test]
    fn empty_snapshot_is_never_valid() {
        let now = chrono::Utc::now().timestamp();
        assert!(!Snapshot::empty_now().is_valid(86400, now));
    }

    #[test]
    fn load_of_missing_file_yields_empty_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = Snapshot::load(&dir.path().join("nope.json"));
        assert!(snapshot.playlists.is_empty());
        assert!(snapshot.tracks.is_empty());
        assert!(snapshot.artists.is_empty());
    }

    #[test]
    fn load_of_corrupt_file_yields_empty_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corrupt.json");
        std::fs::write(&path, "{ not json at all").unwrap();
        let snapshot = Snapshot::load(&path);
        assert!(snapshot.playlists.is_empty());
    }

    #[test]
    fn persist_then_load_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.json");
        let snapshot = populated_snapshot(1_700_000_000);
        snapshot.persist(&path).unwrap();
        let loaded = Snapshot::load(&path);
        assert_eq!(loaded, snapshot);
        assert_eq!(loaded.last_updated, 1_700_000_000);
    }

    #[test]
    fn persisted_document_uses_wire_field_names() {
        let snapshot = populated_snapshot(1_700_000_000);
        let json = serde_json::to_value(&snapshot).unwrap();
        assert!(json.get("playlists_data").is_some());
        assert!(json.get("tracks_details").is_some());
        assert!(json.get("artists_details").is_some());
        assert!(json.get("last_updated").is_some());
    }
}
