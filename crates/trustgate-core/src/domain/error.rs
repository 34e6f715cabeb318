//! Domain-level error taxonomy for trustgate.

/// trustgate domain errors.
#[derive(Debug, thiserror::Error)]
pub enum TrustgateError {
    #[error("invalid artifact URL: {0}")]
    InvalidUrl(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("git error: {0}")]
    GitError(String),

    #[error("hub error: {0}")]
    Hub(#[from] hub_client::HubError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for trustgate domain operations.
pub type Result<T> = std::result::Result<T, TrustgateError>;
