//! The entity cache facade exposed to callers.
//!
//! Owns the snapshot store, the freshness policy and the single-flight
//! refresh guard; accessors serve reads from whatever snapshot is currently
//! installed.

mod metrics;
mod rebuild;

pub use metrics::compute_metrics;
pub use rebuild::{rebuild, RebuildError, PLAYLIST_PAGE_SIZE, TRACK_PAGE_SIZE};

use crate::catalog::{Artist, Playlist, PlaylistMetrics, Track};
use crate::config::CacheSettings;
use crate::remote::RemoteCatalog;
use crate::snapshot_store::SnapshotStore;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

/// Result of a freshness check, always carrying servable state: even a
/// failed refresh leaves the previous (possibly stale or empty) snapshot in
/// place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The installed snapshot was already valid, or became valid while this
    /// caller waited on an in-flight refresh.
    Fresh,
    /// A rebuild ran and a new snapshot was installed.
    Refreshed,
    /// The rebuild failed, either in this call or in the in-flight attempt
    /// this caller waited on; the prior snapshot remains installed.
    Failed,
}

/// A track joined with its artist names, the shape served for playlist
/// track listings.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ResolvedTrack {
    pub name: String,
    pub artist: String,
    pub album: String,
    pub duration_ms: u64,
    pub external_url: String,
    pub image_url: Option<String>,
}

/// Whole-library counts for the overview page.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct LibraryOverview {
    pub num_playlists: usize,
    pub num_unique_tracks: usize,
    pub num_unique_artists: usize,
}

pub struct CatalogCache {
    store: SnapshotStore,
    settings: CacheSettings,
    // Single-flight guard: at most one rebuild runs at a time, concurrent
    // callers wait for the in-flight result.
    refresh_guard: Mutex<()>,
    // Bumped after every rebuild attempt, success or failure. Waiters that
    // observe a bump adopt the attempt's outcome instead of re-running it.
    refresh_generation: AtomicU64,
}

impl CatalogCache {
    pub fn new(store: SnapshotStore, settings: CacheSettings) -> Self {
        Self {
            store,
            settings,
            refresh_guard: Mutex::new(()),
            refresh_generation: AtomicU64::new(0),
        }
    }

    /// Open the persisted snapshot at the configured path.
    pub fn open(settings: CacheSettings) -> Self {
        let store = SnapshotStore::load(&settings.snapshot_path);
        Self::new(store, settings)
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    /// Make sure the installed snapshot is usable, rebuilding it from the
    /// remote catalog when it is stale or incomplete.
    ///
    /// The rebuild happens outside the store's write lock; only the final
    /// install takes exclusive access. On rebuild failure the prior snapshot
    /// stays installed and the call returns instead of propagating.
    pub async fn ensure_fresh(&self, remote: &dyn RemoteCatalog) -> RefreshOutcome {
        let now = chrono::Utc::now().timestamp();
        if self
            .store
            .snapshot()
            .await
            .is_valid(self.settings.max_age_secs, now)
        {
            return RefreshOutcome::Fresh;
        }

        let observed_generation = self.refresh_generation.load(Ordering::Acquire);
        let _guard = self.refresh_guard.lock().await;

        // Re-check: another caller may have refreshed while we waited.
        let now = chrono::Utc::now().timestamp();
        if self
            .store
            .snapshot()
            .await
            .is_valid(self.settings.max_age_secs, now)
        {
            return RefreshOutcome::Fresh;
        }

        // The snapshot is still invalid but an attempt concluded while we
        // waited on the guard: it failed. Adopt that failure rather than
        // re-running the whole pipeline per queued caller.
        if self.refresh_generation.load(Ordering::Acquire) != observed_generation {
            return RefreshOutcome::Failed;
        }

        info!("Snapshot is stale or incomplete, rebuilding from remote catalog");
        let outcome = match rebuild(remote, &self.settings).await {
            Ok(snapshot) => {
                self.store.replace(snapshot).await;
                let installed = self.store.snapshot().await;
                let metrics = compute_metrics(&installed, &self.settings.excluded_artist_ids);
                self.store.attach_metrics(metrics).await;
                if let Err(e) = self.store.persist(&self.settings.snapshot_path).await {
                    // Non-fatal: the in-memory snapshot stays valid.
                    warn!("Failed to persist snapshot: {:#}", e);
                }
                RefreshOutcome::Refreshed
            }
            Err(e) => {
                error!("Rebuild failed, keeping previous snapshot: {}", e);
                RefreshOutcome::Failed
            }
        };
        self.refresh_generation.fetch_add(1, Ordering::Release);
        outcome
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub async fn playlist_by_id(&self, id: &str) -> Option<Playlist> {
        self.store.get_playlist(id).await
    }

    pub async fn all_playlists(&self) -> Vec<Playlist> {
        self.store.all_playlists().await
    }

    pub async fn track_by_id(&self, id: &str) -> Option<Track> {
        self.store.get_track(id).await
    }

    pub async fn all_tracks(&self) -> Vec<Track> {
        self.store.all_tracks().await
    }

    pub async fn artist_by_id(&self, id: &str) -> Option<Artist> {
        self.store.get_artist(id).await
    }

    /// Single-field projection of an artist, for callers that only want one
    /// attribute (e.g. `genres`). Unknown field names yield `None`.
    pub async fn artist_field(&self, id: &str, field: &str) -> Option<serde_json::Value> {
        let artist = self.store.get_artist(id).await?;
        serde_json::to_value(artist).ok()?.get(field).cloned()
    }

    pub async fn playlist_metrics(&self, id: &str) -> Option<PlaylistMetrics> {
        self.store.get_playlist(id).await?.metrics
    }

    /// The playlist's tracks resolved against the track and artist maps.
    /// Unresolvable track or artist references are skipped with a log entry,
    /// never failing the whole call. `None` only for an unknown playlist.
    pub async fn tracks_for_playlist(&self, id: &str) -> Option<Vec<ResolvedTrack>> {
        let snapshot = self.store.snapshot().await;
        let playlist = snapshot.playlists.get(id)?;

        let mut resolved = Vec::with_capacity(playlist.track_ids.len());
        for track_id in &playlist.track_ids {
            let Some(track) = snapshot.tracks.get(track_id) else {
                debug!(
                    "Skipping unresolved track {} in playlist {}",
                    track_id, id
                );
                continue;
            };
            let mut artist_names = Vec::with_capacity(track.artist_ids.len());
            for artist_id in &track.artist_ids {
                match snapshot.artists.get(artist_id) {
                    Some(artist) => artist_names.push(artist.name.clone()),
                    None => {
                        debug!(
                            "Skipping unresolved artist {} on track {}",
                            artist_id, track_id
                        );
                    }
                }
            }
            resolved.push(ResolvedTrack {
                name: track.name.clone(),
                artist: artist_names.join(", "),
                album: track.album.clone(),
                duration_ms: track.duration_ms,
                external_url: track.external_url.clone(),
                image_url: track.image_url.clone(),
            });
        }
        Some(resolved)
    }

    /// Whole-library counts over the installed snapshot.
    pub async fn overview(&self) -> LibraryOverview {
        let snapshot = self.store.snapshot().await;
        LibraryOverview {
            num_playlists: snapshot.playlists.len(),
            num_unique_tracks: snapshot.tracks.len(),
            num_unique_artists: snapshot.artists.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Artist, Playlist, Track};
    use crate::snapshot_store::Snapshot;

    fn store_with_one_playlist() -> SnapshotStore {
        let mut snapshot = Snapshot::empty_now();
        snapshot.playlists.insert(
            "p1".to_owned(),
            Playlist {
                id: "p1".to_owned(),
                name: "Mix".to_owned(),
                image_url: None,
                owner: "me".to_owned(),
                description: String::new(),
                followers: 1,
                track_ids: vec!["t1".to_owned(), "ghost-track".to_owned()],
                metrics: None,
            },
        );
        snapshot.tracks.insert(
            "t1".to_owned(),
            Track {
                id: "t1".to_owned(),
                name: "Song".to_owned(),
                artist_ids: vec!["a1".to_owned(), "ghost-artist".to_owned()],
                album: "Album".to_owned(),
                duration_ms: 222_000,
                external_url: "https://example.com/t1".to_owned(),
                image_url: None,
                release_date: None,
                release_date_precision: None,
                audio_features: None,
            },
        );
        snapshot.artists.insert(
            "a1".to_owned(),
            Artist {
                id: "a1".to_owned(),
                name: "Somebody".to_owned(),
                external_url: String::new(),
                popularity: 42,
                genres: vec!["indie".to_owned()],
                image_url: None,
            },
        );
        SnapshotStore::new(snapshot)
    }

    #[tokio::test]
    async fn tracks_for_playlist_skips_unresolved_references() {
        let cache = CatalogCache::new(store_with_one_playlist(), CacheSettings::default());
        let tracks = cache.tracks_for_playlist("p1").await.unwrap();
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].name, "Song");
        // The unresolvable artist id is dropped from the joined names.
        assert_eq!(tracks[0].artist, "Somebody");
    }

    #[tokio::test]
    async fn tracks_for_unknown_playlist_is_none() {
        let cache = CatalogCache::new(store_with_one_playlist(), CacheSettings::default());
        assert!(cache.tracks_for_playlist("nope").await.is_none());
    }

    #[tokio::test]
    async fn artist_field_projects_a_single_attribute() {
        let cache = CatalogCache::new(store_with_one_playlist(), CacheSettings::default());
        let genres = cache.artist_field("a1", "genres").await.unwrap();
        assert_eq!(genres, serde_json::json!(["indie"]));
        assert!(cache.artist_field("a1", "no_such_field").await.is_none());
        assert!(cache.artist_field("nope", "genres").await.is_none());
    }

    #[tokio::test]
    async fn playlist_metrics_absent_until_attached() {
        let cache = CatalogCache::new(store_with_one_playlist(), CacheSettings::default());
        assert!(cache.playlist_metrics("p1").await.is_none());
    }

    #[tokio::test]
    async fn overview_counts_unique_entities() {
        let cache = CatalogCache::new(store_with_one_playlist(), CacheSettings::default());
        let overview = cache.overview().await;
        assert_eq!(
            overview,
            LibraryOverview {
                num_playlists: 1,
                num_unique_tracks: 1,
                num_unique_artists: 1,
            }
        );
    }
}
