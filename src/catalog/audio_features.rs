use serde::{Deserialize, Serialize};

/// Per-track audio attributes fetched in bulk from the remote catalog.
///
/// Always attached to an already-known [`super::Track`] after the structural
/// fetch, never fetched speculatively for unknown tracks.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct AudioFeatures {
    pub acousticness: f64,
    pub danceability: f64,
    pub energy: f64,
    pub instrumentalness: f64,
    pub liveness: f64,
    pub loudness: f64,
    pub speechiness: f64,
    pub tempo: f64,
    pub valence: f64,
    pub duration_ms: u64,
    pub key: i32,
    pub mode: i32,
    pub time_signature: i32,
}
