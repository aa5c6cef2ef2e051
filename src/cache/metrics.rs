//! Metrics aggregation engine.
//!
//! Pure derivation over an installed snapshot, no remote calls. Unresolved
//! track or artist references are omitted silently; excluded artist IDs
//! (compilation placeholders) never contribute to artist statistics.
//!
//! Duration statistics are sourced from the audio-features block, so a track
//! whose enrichment fetch failed counts toward `track_count` but not toward
//! duration or feature averages.

use crate::catalog::{AudioFeatureAverages, Playlist, PlaylistMetrics};
use crate::snapshot_store::Snapshot;
use std::collections::HashMap;

const MOST_FEATURED_LIMIT: usize = 5;

/// Compute metrics for every playlist in the snapshot.
pub fn compute_metrics(
    snapshot: &Snapshot,
    excluded_artist_ids: &[String],
) -> HashMap<String, PlaylistMetrics> {
    snapshot
        .playlists
        .values()
        .map(|playlist| {
            (
                playlist.id.clone(),
                playlist_metrics(playlist, snapshot, excluded_artist_ids),
            )
        })
        .collect()
}

fn playlist_metrics(
    playlist: &Playlist,
    snapshot: &Snapshot,
    excluded_artist_ids: &[String],
) -> PlaylistMetrics {
    // Durations in ms, from audio features only.
    let mut feature_durations: Vec<u64> = Vec::new();
    let mut feature_sums = FeatureSums::default();
    let mut release_years: Vec<i32> = Vec::new();
    // Appearance count and first-encountered rank per artist name.
    let mut artist_appearances: HashMap<String, (usize, usize)> = HashMap::new();
    let mut genres: HashMap<String, usize> = HashMap::new();
    let mut popularity_sum = 0u64;
    let mut popularity_count = 0usize;

    for track_id in &playlist.track_ids {
        // Unresolved references still count as track references but carry
        // no data.
        let Some(track) = snapshot.tracks.get(track_id) else {
            continue;
        };

        if let Some(year) = track.release_year() {
            release_years.push(year);
        }

        if let Some(features) = &track.audio_features {
            feature_durations.push(features.duration_ms);
            feature_sums.add(features);
        }

        for artist_id in &track.artist_ids {
            if excluded_artist_ids.iter().any(|id| id == artist_id) {
                continue;
            }
            let Some(artist) = snapshot.artists.get(artist_id) else {
                continue;
            };
            let next_rank = artist_appearances.len();
            let entry = artist_appearances
                .entry(artist.name.clone())
                .or_insert((0, next_rank));
            entry.0 += 1;
            popularity_sum += artist.popularity as u64;
            popularity_count += 1;
            for genre in &artist.genres {
                *genres.entry(genre.clone()).or_insert(0) += 1;
            }
        }
    }

    let total_duration_ms: u64 = feature_durations.iter().sum();
    let total_duration_hours = round2(total_duration_ms as f64 / 3_600_000.0);
    let avg_track_duration_secs = if feature_durations.is_empty() {
        0.0
    } else {
        round2(total_duration_ms as f64 / 1000.0 / feature_durations.len() as f64)
    };

    // The counts are accumulated anyway; only the distinct set is exposed.
    let mut genre_distribution: Vec<String> = genres.into_keys().collect();
    genre_distribution.sort();

    let artist_diversity = artist_appearances.len();
    let most_featured_artists = most_featured(artist_appearances);

    let release_year_range = match (release_years.iter().min(), release_years.iter().max()) {
        (Some(min), Some(max)) => format!("{} - {}", min, max),
        _ => "N/A".to_owned(),
    };
    let avg_release_year = if release_years.is_empty() {
        None
    } else {
        Some(round2(
            release_years.iter().map(|y| *y as f64).sum::<f64>() / release_years.len() as f64,
        ))
    };

    let avg_popularity = if popularity_count == 0 {
        0.0
    } else {
        round2(popularity_sum as f64 / popularity_count as f64)
    };

    PlaylistMetrics {
        track_count: playlist.track_ids.len(),
        total_duration_hours,
        avg_track_duration_secs,
        genre_distribution,
        artist_diversity,
        most_featured_artists,
        release_year_range,
        avg_release_year,
        avg_popularity,
        feature_averages: feature_sums.averages(),
    }
}

/// Top artists by appearance count, ties broken by first-encountered order.
fn most_featured(appearances: HashMap<String, (usize, usize)>) -> Vec<String> {
    if appearances.is_empty() {
        return vec!["N/A".to_owned()];
    }
    let mut ranked: Vec<(String, usize, usize)> = appearances
        .into_iter()
        .map(|(name, (count, rank))| (name, count, rank))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
    ranked
        .into_iter()
        .take(MOST_FEATURED_LIMIT)
        .map(|(name, count, _)| format!("{} ({})", name, count))
        .collect()
}

#[derive(Default)]
struct FeatureSums {
    energy: f64,
    danceability: f64,
    valence: f64,
    acousticness: f64,
    instrumentalness: f64,
    speechiness: f64,
    loudness: f64,
    tempo: f64,
    count: usize,
}

impl FeatureSums {
    fn add(&mut self, features: &crate::catalog::AudioFeatures) {
        self.energy += features.energy;
        self.danceability += features.danceability;
        self.valence += features.valence;
        self.acousticness += features.acousticness;
        self.instrumentalness += features.instrumentalness;
        self.speechiness += features.speechiness;
        self.loudness += features.loudness;
        self.tempo += features.tempo;
        self.count += 1;
    }

    fn averages(&self) -> AudioFeatureAverages {
        if self.count == 0 {
            return AudioFeatureAverages::default();
        }
        let n = self.count as f64;
        AudioFeatureAverages {
            energy: self.energy / n,
            danceability: self.danceability / n,
            valence: self.valence / n,
            acousticness: self.acousticness / n,
            instrumentalness: self.instrumentalness / n,
            speechiness: self.speechiness / n,
            loudness: self.loudness / n,
            tempo: self.tempo / n,
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
