//! Spotify Web API implementation of [`RemoteCatalog`].
//!
//! Speaks the documented endpoints with a caller-supplied bearer token;
//! token acquisition is out of scope here. Wire objects are deserialized
//! into fixed-shape structs and normalized at this boundary so the rest of
//! the crate never guards against missing JSON keys.

use super::{
    PlaylistPage, RemoteArtist, RemoteAudioFeatures, RemoteCatalog, RemoteError, RemotePlaylist,
    RemoteTrack, TrackPage,
};
use crate::catalog::{AudioFeatures, ReleaseDatePrecision};
use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "https://api.spotify.com/v1";

pub struct SpotifyWebClient {
    client: Client,
    base_url: String,
    token: String,
}

impl SpotifyWebClient {
    /// Create a new client against `base_url` (configurable for tests)
    /// authenticating every request with `token`.
    pub fn new(base_url: String, token: String, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url,
            token,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, RemoteError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::Status {
                status: status.as_u16(),
            });
        }

        response
            .json()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))
    }
}

#[async_trait]
impl RemoteCatalog for SpotifyWebClient {
    async fn playlists_page(
        &self,
        offset: usize,
        limit: usize,
    ) -> Result<PlaylistPage, RemoteError> {
        let page: Paging<PlaylistObject> = self
            .get_json(
                "/me/playlists",
                &[("offset", offset.to_string()), ("limit", limit.to_string())],
            )
            .await?;
        Ok(PlaylistPage {
            has_more: page.next.is_some(),
            items: page.items.into_iter().map(PlaylistObject::normalize).collect(),
        })
    }

    async fn playlist_tracks_page(
        &self,
        playlist_id: &str,
        offset: usize,
        limit: usize,
    ) -> Result<TrackPage, RemoteError> {
        let page: Paging<PlaylistTrackObject> = self
            .get_json(
                &format!("/playlists/{}/tracks", playlist_id),
                &[("offset", offset.to_string()), ("limit", limit.to_string())],
            )
            .await?;
        Ok(TrackPage {
            has_more: page.next.is_some(),
            items: page
                .items
                .into_iter()
                .map(|item| item.track.and_then(TrackObject::normalize))
                .collect(),
        })
    }

    async fn artists(&self, ids: &[String]) -> Result<Vec<Option<RemoteArtist>>, RemoteError> {
        let response: ArtistsResponse = self
            .get_json("/artists", &[("ids", ids.join(","))])
            .await?;
        Ok(response
            .artists
            .into_iter()
            .map(|artist| artist.map(ArtistObject::normalize))
            .collect())
    }

    async fn audio_features(
        &self,
        ids: &[String],
    ) -> Result<Vec<Option<RemoteAudioFeatures>>, RemoteError> {
        let response: AudioFeaturesResponse = self
            .get_json("/audio-features", &[("ids", ids.join(","))])
            .await?;
        Ok(response
            .audio_features
            .into_iter()
            .map(|features| features.map(AudioFeaturesObject::normalize))
            .collect())
    }
}

// =============================================================================
// Wire objects
// =============================================================================

#[derive(Deserialize)]
struct Paging<T> {
    items: Vec<T>,
    next: Option<String>,
}

#[derive(Deserialize)]
struct ImageObject {
    url: String,
}

#[derive(Deserialize)]
struct OwnerObject {
    display_name: Option<String>,
}

#[derive(Deserialize)]
struct FollowersObject {
    total: u64,
}

#[derive(Deserialize)]
struct PlaylistObject {
    id: String,
    name: String,
    #[serde(default)]
    images: Vec<ImageObject>,
    owner: OwnerObject,
    description: Option<String>,
    // The listing endpoint omits follower counts, the single-playlist
    // endpoint includes them.
    followers: Option<FollowersObject>,
}

impl PlaylistObject {
    fn normalize(self) -> RemotePlaylist {
        RemotePlaylist {
            id: self.id,
            name: self.name,
            image_url: self.images.into_iter().next().map(|image| image.url),
            owner: self.owner.display_name.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            followers: self.followers.map(|f| f.total).unwrap_or(0),
        }
    }
}

#[derive(Deserialize)]
struct PlaylistTrackObject {
    track: Option<TrackObject>,
}

#[derive(Deserialize)]
struct ArtistRefObject {
    id: Option<String>,
}

#[derive(Deserialize)]
struct AlbumObject {
    name: String,
    #[serde(default)]
    images: Vec<ImageObject>,
    release_date: Option<String>,
    release_date_precision: Option<ReleaseDatePrecision>,
}

#[derive(Deserialize)]
struct TrackObject {
    // Local files carry a null id; those slots are treated as unavailable.
    id: Option<String>,
    name: String,
    #[serde(default)]
    artists: Vec<ArtistRefObject>,
    album: AlbumObject,
    duration_ms: u64,
    #[serde(default)]
    external_urls: HashMap<String, String>,
}

impl TrackObject {
    fn normalize(self) -> Option<RemoteTrack> {
        let id = self.id?;
        Some(RemoteTrack {
            id,
            name: self.name,
            artist_ids: self.artists.into_iter().filter_map(|a| a.id).collect(),
            album: self.album.name,
            duration_ms: self.duration_ms,
            external_url: self
                .external_urls
                .get("spotify")
                .cloned()
                .unwrap_or_default(),
            image_url: self.album.images.into_iter().next().map(|image| image.url),
            release_date: self.album.release_date,
            release_date_precision: self.album.release_date_precision,
        })
    }
}

#[derive(Deserialize)]
struct ArtistsResponse {
    artists: Vec<Option<ArtistObject>>,
}

#[derive(Deserialize)]
struct ArtistObject {
    id: String,
    name: String,
    #[serde(default)]
    external_urls: HashMap<String, String>,
    #[serde(default)]
    popularity: u8,
    #[serde(default)]
    genres: Vec<String>,
    #[serde(default)]
    images: Vec<ImageObject>,
}

impl ArtistObject {
    fn normalize(self) -> RemoteArtist {
        RemoteArtist {
            id: self.id,
            name: self.name,
            external_url: self
                .external_urls
                .get("spotify")
                .cloned()
                .unwrap_or_default(),
            popularity: self.popularity,
            genres: self.genres,
            image_url: self.images.into_iter().next().map(|image| image.url),
        }
    }
}

#[derive(Deserialize)]
struct AudioFeaturesResponse {
    audio_features: Vec<Option<AudioFeaturesObject>>,
}

#[derive(Deserialize, Clone)]
struct AudioFeaturesObject {
    id: String,
    acousticness: f64,
    danceability: f64,
    energy: f64,
    instrumentalness: f64,
    liveness: f64,
    loudness: f64,
    speechiness: f64,
    tempo: f64,
    valence: f64,
    duration_ms: u64,
    key: i32,
    mode: i32,
    time_signature: i32,
}

impl AudioFeaturesObject {
    fn normalize(self) -> RemoteAudioFeatures {
        RemoteAudioFeatures {
            track_id: self.id,
            features: AudioFeatures {
                acousticness: self.acousticness,
                danceability: self.danceability,
                energy: self.energy,
                instrumentalness: self.instrumentalness,
                liveness: self.liveness,
                loudness: self.loudness,
                speechiness: self.speechiness,
                tempo: self.tempo,
                valence: self.valence,
                duration_ms: self.duration_ms,
                key: self.key,
                mode: self.mode,
                time_signature: self.time_signature,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_playlist_object_from_listing_endpoint() {
        let s = r#"
        {
            "id": "37i9dQZF1DXcBWIGoYBM5M",
            "name": "Today's Top Hits",
            "images": [{"url": "https://i.scdn.co/image/abc"}],
            "owner": {"display_name": "spotify"},
            "description": "The hottest 50."
        }
        "#;
        let playlist = serde_json::from_str::<PlaylistObject>(s)
            .expect("Did not parse json string.")
            .normalize();
        assert_eq!(playlist.id, "37i9dQZF1DXcBWIGoYBM5M");
        assert_eq!(playlist.owner, "spotify");
        assert_eq!(playlist.image_url.as_deref(), Some("https://i.scdn.co/image/abc"));
        assert_eq!(playlist.followers, 0);
    }

    #[test]
    fn normalizes_track_object() {
        let s = r#"
        {
            "id": "6rqhFgbbKwnb9MLmUQDhG6",
            "name": "Paranoid Android",
            "artists": [{"id": "4Z8W4fKeB5YxbusRsdQVPb"}, {"id": null}],
            "album": {
                "name": "OK Computer",
                "images": [{"url": "https://i.scdn.co/image/cover"}],
                "release_date": "1997-05-21",
                "release_date_precision": "day"
            },
            "duration_ms": 383066,
            "external_urls": {"spotify": "https://open.spotify.com/track/6rqhFgbbKwnb9MLmUQDhG6"}
        }
        "#;
        let track = serde_json::from_str::<TrackObject>(s)
            .expect("Did not parse json string.")
            .normalize()
            .expect("Track with an id should normalize");
        assert_eq!(track.artist_ids, vec!["4Z8W4fKeB5YxbusRsdQVPb".to_owned()]);
        assert_eq!(track.album, "OK Computer");
        assert_eq!(track.release_date.as_deref(), Some("1997-05-21"));
        assert_eq!(track.release_date_precision, Some(ReleaseDatePrecision::Day));
    }

    #[test]
    fn track_object_without_id_normalizes_to_none() {
        let s = r#"
        {
            "id": null,
            "name": "Some Local File",
            "artists": [],
            "album": {"name": "", "release_date": null, "release_date_precision": null},
            "duration_ms": 1000
        }
        "#;
        let track = serde_json::from_str::<TrackObject>(s).unwrap();
        assert!(track.normalize().is_none());
    }

    #[test]
    fn parses_batch_artists_response_with_nulls() {
        let s = r#"
        {
            "artists": [
                {
                    "id": "4Z8W4fKeB5YxbusRsdQVPb",
                    "name": "Radiohead",
                    "external_urls": {"spotify": "https://open.spotify.com/artist/4Z8W4fKeB5YxbusRsdQVPb"},
                    "popularity": 82,
                    "genres": ["art rock"],
                    "images": []
                },
                null
            ]
        }
        "#;
        let response: ArtistsResponse = serde_json::from_str(s).unwrap();
        assert_eq!(response.artists.len(), 2);
        assert!(response.artists[0].is_some());
        assert!(response.artists[1].is_none());
    }

    #[test]
    fn parses_audio_features_response() {
        let s = r#"
        {
            "audio_features": [
                {
                    "id": "6rqhFgbbKwnb9MLmUQDhG6",
                    "acousticness": 0.0649,
                    "danceability": 0.468,
                    "energy": 0.781,
                    "instrumentalness": 0.000169,
                    "liveness": 0.0943,
                    "loudness": -7.375,
                    "speechiness": 0.0565,
                    "tempo": 82.395,
                    "valence": 0.118,
                    "duration_ms": 383066,
                    "key": 7,
                    "mode": 1,
                    "time_signature": 4
                },
                null
            ]
        }
        "#;
        let response: AudioFeaturesResponse = serde_json::from_str(s).unwrap();
        let features = response.audio_features[0].clone().unwrap().normalize();
        assert_eq!(features.track_id, "6rqhFgbbKwnb9MLmUQDhG6");
        assert_eq!(features.features.key, 7);
        assert!(response.audio_features[1].is_none());
    }
}
