//! RemoteCatalog trait definition.
//!
//! Abstracts the paginated, rate-limited remote catalog so the rebuild
//! pipeline can be exercised against in-memory fakes in tests.

use super::RemoteError;
use crate::catalog::{
    Artist, AudioFeatures, Playlist, ReleaseDatePrecision, Track,
};
use async_trait::async_trait;

/// One page of the principal's playlist listing.
#[derive(Debug, Clone)]
pub struct PlaylistPage {
    pub items: Vec<RemotePlaylist>,
    pub has_more: bool,
}

/// One page of a playlist's track listing. A `None` item is a removed or
/// unavailable track slot and is skipped by the pipeline.
#[derive(Debug, Clone)]
pub struct TrackPage {
    pub items: Vec<Option<RemoteTrack>>,
    pub has_more: bool,
}

/// Playlist identity as provided by the remote catalog, before any track
/// membership is known.
#[derive(Debug, Clone)]
pub struct RemotePlaylist {
    pub id: String,
    pub name: String,
    pub image_url: Option<String>,
    pub owner: String,
    pub description: String,
    pub followers: u64,
}

impl RemotePlaylist {
    /// Normalize into a catalog playlist with an empty track sequence; the
    /// pipeline appends track references while paginating.
    pub fn into_playlist(self) -> Playlist {
        Playlist {
            id: self.id,
            name: self.name,
            image_url: self.image_url,
            owner: self.owner,
            description: self.description,
            followers: self.followers,
            track_ids: Vec::new(),
            metrics: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RemoteTrack {
    pub id: String,
    pub name: String,
    pub artist_ids: Vec<String>,
    pub album: String,
    pub duration_ms: u64,
    pub external_url: String,
    pub image_url: Option<String>,
    pub release_date: Option<String>,
    pub release_date_precision: Option<ReleaseDatePrecision>,
}

impl RemoteTrack {
    pub fn into_track(self) -> Track {
        Track {
            id: self.id,
            name: self.name,
            artist_ids: self.artist_ids,
            album: self.album,
            duration_ms: self.duration_ms,
            external_url: self.external_url,
            image_url: self.image_url,
            release_date: self.release_date,
            release_date_precision: self.release_date_precision,
            audio_features: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RemoteArtist {
    pub id: String,
    pub name: String,
    pub external_url: String,
    pub popularity: u8,
    pub genres: Vec<String>,
    pub image_url: Option<String>,
}

impl RemoteArtist {
    pub fn into_artist(self) -> Artist {
        Artist {
            id: self.id,
            name: self.name,
            external_url: self.external_url,
            popularity: self.popularity,
            genres: self.genres,
            image_url: self.image_url,
        }
    }
}

/// Audio-feature record keyed by the track it belongs to.
#[derive(Debug, Clone)]
pub struct RemoteAudioFeatures {
    pub track_id: String,
    pub features: AudioFeatures,
}

/// Read access to the remote catalog.
///
/// Listings paginate via offset/limit with a `has_more` indicator; callers
/// are expected to follow pages exhaustively. Batch lookups accept at most
/// 50 artist IDs and 100 track IDs per call (remote API ceilings) and return
/// one slot per requested ID, `None` where the remote knows no such entity.
#[async_trait]
pub trait RemoteCatalog: Send + Sync {
    async fn playlists_page(
        &self,
        offset: usize,
        limit: usize,
    ) -> Result<PlaylistPage, RemoteError>;

    async fn playlist_tracks_page(
        &self,
        playlist_id: &str,
        offset: usize,
        limit: usize,
    ) -> Result<TrackPage, RemoteError>;

    async fn artists(&self, ids: &[String]) -> Result<Vec<Option<RemoteArtist>>, RemoteError>;

    async fn audio_features(
        &self,
        ids: &[String],
    ) -> Result<Vec<Option<RemoteAudioFeatures>>, RemoteError>;
}
