use serde::{Deserialize, Serialize};

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    pub image_url: Option<String>,
    pub owner: String,
    pub description: String,
    pub followers: u64,
    /// Ordered track references. A track appearing twice in the source
    /// playlist appears twice here, even though the track map holds it once.
    pub track_ids: Vec<String>,
    /// Derived statistics, attached by the aggregation engine after a
    /// snapshot is installed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<PlaylistMetrics>,
}

/// Per-playlist statistics derived purely from the cached snapshot.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct PlaylistMetrics {
    /// Number of track references, duplicate occurrences counted.
    pub track_count: usize,
    /// Summed duration of tracks with audio-feature data, in hours, rounded
    /// to 2 decimals. Tracks without audio features do not contribute.
    pub total_duration_hours: f64,
    /// Mean duration in seconds over the same tracks, 0 when none.
    pub avg_track_duration_secs: f64,
    /// Distinct genres observed across contributing artists.
    pub genre_distribution: Vec<String>,
    /// Count of distinct artist names observed.
    pub artist_diversity: usize,
    /// Top 5 artists by appearance count, rendered as "Name (count)".
    /// Contains a single "N/A" entry when the playlist has no artists.
    pub most_featured_artists: Vec<String>,
    /// "min - max" over parsed release years, or "N/A" when none parsed.
    pub release_year_range: String,
    pub avg_release_year: Option<f64>,
    pub avg_popularity: f64,
    pub feature_averages: AudioFeatureAverages,
}

/// Arithmetic means of the numeric audio-feature dimensions over the tracks
/// of one playlist. Each field is 0 when no track contributed data.
#[derive(Clone, Default, Serialize, Deserialize, Debug, PartialEq)]
pub struct AudioFeatureAverages {
    pub energy: f64,
    pub danceability: f64,
    pub valence: f64,
    pub acousticness: f64,
    pub instrumentalness: f64,
    pub speechiness: f64,
    pub loudness: f64,
    pub tempo: f64,
}
