//! In-memory holder of the live snapshot.
//!
//! Readers clone an `Arc` handle to the current snapshot and keep reading it
//! even while a replacement is installed, so a reader never observes a mix of
//! old playlists and new tracks.

use super::Snapshot;
use crate::catalog::{Artist, Playlist, PlaylistMetrics, Track};
use anyhow::Result;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;

pub struct SnapshotStore {
    current: RwLock<Arc<Snapshot>>,
}

impl SnapshotStore {
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            current: RwLock::new(Arc::new(snapshot)),
        }
    }

    /// Initialize the store from a persisted snapshot file, falling back to
    /// an empty snapshot when the file is absent or malformed.
    pub fn load(path: &Path) -> Self {
        Self::new(Snapshot::load(path))
    }

    /// A stable handle to the current snapshot.
    pub async fn snapshot(&self) -> Arc<Snapshot> {
        self.current.read().await.clone()
    }

    /// Atomically swap the live snapshot for a new one.
    pub async fn replace(&self, snapshot: Snapshot) {
        *self.current.write().await = Arc::new(snapshot);
    }

    /// Attach computed metrics to the in-store playlists. IDs without a
    /// matching playlist are ignored. The update is a single atomic swap.
    pub async fn attach_metrics(&self, metrics: HashMap<String, PlaylistMetrics>) {
        let mut guard = self.current.write().await;
        let mut next = (**guard).clone();
        for (playlist_id, playlist_metrics) in metrics {
            if let Some(playlist) = next.playlists.get_mut(&playlist_id) {
                playlist.metrics = Some(playlist_metrics);
            }
        }
        *guard = Arc::new(next);
    }

    /// Serialize the current snapshot to durable storage. The caller decides
    /// what to do on failure; the in-memory snapshot stays valid regardless.
    pub async fn persist(&self, path: &Path) -> Result<()> {
        let snapshot = self.snapshot().await;
        snapshot.persist(path)
    }

    pub async fn get_playlist(&self, id: &str) -> Option<Playlist> {
        self.current.read().await.playlists.get(id).cloned()
    }

    pub async fn get_track(&self, id: &str) -> Option<Track> {
        self.current.read().await.tracks.get(id).cloned()
    }

    pub async fn get_artist(&self, id: &str) -> Option<Artist> {
        self.current.read().await.artists.get(id).cloned()
    }

    pub async fn all_playlists(&self) -> Vec<Playlist> {
        self.current.read().await.playlists.values().cloned().collect()
    }

    pub async fn all_tracks(&self) -> Vec<Track> {
        self.current.read().await.tracks.values().cloned().collect()
    }
}
