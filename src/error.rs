// ABOUTME: Defines all error types for the recsync library using thiserror.
// ABOUTME: Each concern has its own error enum, unified under SyncError.

/// Top-level error type for a synchronization cycle.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Timestamp error: {0}")]
    Time(#[from] TimeError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Only raised while building a peer client; cycles never surface it.
    #[error("Peer error: {0}")]
    Peer(#[from] PeerError),
}

/// Errors from the persistence collaborator.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Persistence returned {status} for '{collection}'")]
    Status { collection: String, status: u16 },

    #[error("Deserialization error: {0}")]
    Deserialize(#[from] serde_json::Error),

    #[error("Source unavailable: {0}")]
    Unavailable(String),
}

/// Errors from querying a single peer for its cutoff.
///
/// These never abort a cycle; the coordinator logs them and moves on.
#[derive(Debug, thiserror::Error)]
pub enum PeerError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Peer answered with status {0}")]
    Status(u16),

    #[error("Peer did not answer within {0} ms")]
    Timeout(u64),

    #[error("Peer sent a non-integer body: {0:?}")]
    InvalidBody(String),
}

/// Errors from timestamp parsing.
#[derive(Debug, thiserror::Error)]
pub enum TimeError {
    #[error("Malformed timestamp '{text}': {reason}")]
    Malformed { text: String, reason: String },
}

/// Errors from reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required setting {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },
}
