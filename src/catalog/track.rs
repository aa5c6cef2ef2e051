use super::AudioFeatures;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseDatePrecision {
    Day,
    Month,
    Year,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Track {
    pub id: String,
    pub name: String,
    /// Soft references into the artist map; an unresolvable ID is skipped on
    /// reads, never treated as an error.
    pub artist_ids: Vec<String>,
    pub album: String,
    pub duration_ms: u64,
    pub external_url: String,
    pub image_url: Option<String>,
    pub release_date: Option<String>,
    pub release_date_precision: Option<ReleaseDatePrecision>,
    /// Enrichment data, absent when the bulk audio-features fetch did not
    /// resolve this track.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_features: Option<AudioFeatures>,
}

impl Track {
    /// The 4-digit release year parsed from the release date prefix.
    /// Non-positive or unparsable years are reported as `None`.
    pub fn release_year(&self) -> Option<i32> {
        let date = self.release_date.as_deref()?;
        let year = date.get(..4)?.parse::<i32>().ok()?;
        (year > 0).then_some(year)
    }
}
