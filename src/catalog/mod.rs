mod artist;
mod audio_features;
mod playlist;
mod track;

pub use artist::Artist;
pub use audio_features::AudioFeatures;
pub use playlist::{AudioFeatureAverages, Playlist, PlaylistMetrics};
pub use track::{ReleaseDatePrecision, Track};
