//! Playlist Mirror Library
//!
//! Mirrors a remote music catalog (playlists, tracks, artists, audio
//! features) into a local normalized snapshot so that rate-limited paginated
//! remote queries are paid once and amortized across many reads.

pub mod cache;
pub mod catalog;
pub mod config;
pub mod remote;
pub mod snapshot_store;

// Re-export commonly used types for convenience
pub use cache::{CatalogCache, LibraryOverview, RefreshOutcome, ResolvedTrack};
pub use config::{AppConfig, CacheSettings};
pub use remote::{RemoteCatalog, RemoteError, SpotifyWebClient};
pub use snapshot_store::{Snapshot, SnapshotStore};
