mod error;
mod spotify;
mod trait_def;

pub use error::RemoteError;
pub use spotify::{SpotifyWebClient, DEFAULT_API_BASE_URL};
pub use trait_def::{
    PlaylistPage, RemoteArtist, RemoteAudioFeatures, RemoteCatalog, RemotePlaylist, RemoteTrack,
    TrackPage,
};
