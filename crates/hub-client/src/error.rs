//! Error types for hub-client

use thiserror::Error;

/// Errors that can occur while talking to a model hub
#[derive(Error, Debug)]
pub enum HubError {
    /// Repository or file does not exist on the hub
    #[error("not found on hub: {0}")]
    NotFound(String),

    /// Hub answered with an unexpected status
    #[error("hub request to {url} failed with status {status}")]
    Status { url: String, status: u16 },

    /// Transport-level failure
    #[error("HTTP error: {0}")]
    Http(String),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Client could not be constructed
    #[error("invalid hub client configuration: {0}")]
    InvalidConfig(String),
}

impl From<reqwest::Error> for HubError {
    fn from(err: reqwest::Error) -> Self {
        HubError::Http(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_display() {
        let err = HubError::Status {
            url: "https://huggingface.co/api/models/x".to_string(),
            status: 503,
        };
        let msg = err.to_string();
        assert!(msg.contains("503"));
        assert!(msg.contains("/api/models/x"));
    }

    #[test]
    fn test_json_error_converts() {
        let bad = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: HubError = bad.into();
        assert!(err.to_string().starts_with("JSON parsing error"));
    }
}
