//! Fetch & normalize pipeline.
//!
//! Walks the remote catalog end to end and builds a brand new [`Snapshot`];
//! the live one is never touched until the caller installs the result. The
//! structural phase (playlist and track listings) must succeed in full, the
//! enrichment phase (artists, audio features) degrades per chunk.

use crate::catalog::{Playlist, Track};
use crate::config::CacheSettings;
use crate::remote::{RemoteCatalog, RemoteError};
use crate::snapshot_store::Snapshot;
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Page size used when listing the principal's playlists.
pub const PLAYLIST_PAGE_SIZE: usize = 50;
/// Page size used when listing a playlist's tracks.
pub const TRACK_PAGE_SIZE: usize = 100;

/// Structural failure that aborts a rebuild. Enrichment failures never
/// surface here; they are logged and skipped per chunk.
#[derive(Debug, Error)]
pub enum RebuildError {
    #[error("failed to list playlists: {0}")]
    PlaylistListing(#[source] RemoteError),

    #[error("failed to list tracks of playlist {playlist_id}: {source}")]
    TrackListing {
        playlist_id: String,
        #[source]
        source: RemoteError,
    },
}

/// Rebuild a snapshot from the remote catalog.
///
/// Tracks are deduplicated by ID across playlists while duplicate
/// occurrences are preserved in each playlist's `track_ids`. Artist IDs are
/// deduplicated before any artist fetch is issued; batch lookups are
/// partitioned into chunks of `artist_chunk_size` and
/// `audio_features_chunk_size`.
pub async fn rebuild(
    remote: &dyn RemoteCatalog,
    settings: &CacheSettings,
) -> Result<Snapshot, RebuildError> {
    // Structural phase, step 1: exhaustive playlist listing.
    let mut remote_playlists = Vec::new();
    let mut offset = 0;
    loop {
        let page = remote
            .playlists_page(offset, PLAYLIST_PAGE_SIZE)
            .await
            .map_err(RebuildError::PlaylistListing)?;
        let fetched = page.items.len();
        remote_playlists.extend(page.items);
        if !page.has_more || fetched == 0 {
            break;
        }
        offset += fetched;
    }
    info!("Listed {} playlists from remote", remote_playlists.len());

    // Structural phase, step 2: exhaustive track listing per playlist, with
    // track dedup and artist ID accumulation along the way. The artist ID
    // list keeps first-encountered order so chunk boundaries are stable.
    let mut playlists: HashMap<String, Playlist> = HashMap::new();
    let mut tracks: HashMap<String, Track> = HashMap::new();
    let mut artist_ids: Vec<String> = Vec::new();
    let mut seen_artist_ids: HashSet<String> = HashSet::new();

    for remote_playlist in remote_playlists {
        let mut playlist = remote_playlist.into_playlist();
        let mut offset = 0;
        loop {
            let page = remote
                .playlist_tracks_page(&playlist.id, offset, TRACK_PAGE_SIZE)
                .await
                .map_err(|source| RebuildError::TrackListing {
                    playlist_id: playlist.id.clone(),
                    source,
                })?;
            let fetched = page.items.len();
            for item in page.items {
                // Removed or unavailable track slots are skipped, not recorded.
                let Some(remote_track) = item else {
                    continue;
                };
                playlist.track_ids.push(remote_track.id.clone());
                if !tracks.contains_key(&remote_track.id) {
                    for artist_id in &remote_track.artist_ids {
                        if seen_artist_ids.insert(artist_id.clone()) {
                            artist_ids.push(artist_id.clone());
                        }
                    }
                    tracks.insert(remote_track.id.clone(), remote_track.into_track());
                }
            }
            if !page.has_more || fetched == 0 {
                break;
            }
            offset += fetched;
        }
        debug!(
            "Playlist {} ({}): {} track references",
            playlist.id,
            playlist.name,
            playlist.track_ids.len()
        );
        playlists.insert(playlist.id.clone(), playlist);
    }
    info!(
        "Normalized {} unique tracks referencing {} unique artists",
        tracks.len(),
        artist_ids.len()
    );

    // Enrichment phase, step 4: batch artist lookups. A failed chunk leaves
    // its artists unresolved, the rebuild carries on.
    let mut artists = HashMap::new();
    for chunk in artist_ids.chunks(settings.artist_chunk_size) {
        match remote.artists(chunk).await {
            Ok(results) => {
                // Null entries are deleted artists, skip them.
                for remote_artist in results.into_iter().flatten() {
                    artists.insert(remote_artist.id.clone(), remote_artist.into_artist());
                }
            }
            Err(e) => {
                warn!(
                    "Skipping artist chunk of {} ({}transient): {}",
                    chunk.len(),
                    if e.is_transient() { "" } else { "non-" },
                    e
                );
            }
        }
    }

    // Enrichment phase, step 5: batch audio-features lookups for all known
    // tracks. Unresolved entries simply leave tracks without features.
    let mut track_ids: Vec<String> = tracks.keys().cloned().collect();
    track_ids.sort();
    for chunk in track_ids.chunks(settings.audio_features_chunk_size) {
        match remote.audio_features(chunk).await {
            Ok(results) => {
                for entry in results.into_iter().flatten() {
                    if let Some(track) = tracks.get_mut(&entry.track_id) {
                        track.audio_features = Some(entry.features);
                    }
                }
            }
            Err(e) => {
                warn!("Skipping audio-features chunk of {}: {}", chunk.len(), e);
            }
        }
    }

    let with_features = tracks
        .values()
        .filter(|t| t.audio_features.is_some())
        .count();
    info!(
        "Rebuild complete: {} playlists, {} tracks ({} with audio features), {} artists",
        playlists.len(),
        tracks.len(),
        with_features,
        artists.len()
    );

    Ok(Snapshot {
        playlists,
        tracks,
        artists,
        last_updated: chrono::Utc::now().timestamp(),
    })
}
