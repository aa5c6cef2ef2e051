use thiserror::Error;

/// Error raised by a remote catalog call.
///
/// Whether an error aborts a rebuild is decided by the pipeline stage it
/// occurs in: structural listing errors abort, enrichment errors are skipped
/// per chunk. `is_transient` classifies the cause for logging and for callers
/// that want to retry.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("remote endpoint returned status {status}")]
    Status { status: u16 },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("{0}")]
    Other(String),
}

impl RemoteError {
    /// True for failures worth retrying later: rate limits, server errors
    /// and transport problems. Auth and decode failures are not.
    pub fn is_transient(&self) -> bool {
        match self {
            RemoteError::Status { status } => *status == 429 || *status >= 500,
            RemoteError::Transport(_) => true,
            RemoteError::Decode(_) => false,
            RemoteError::Other(_) => false,
        }
    }
}
