//! Error types for the sandbox module.

/// Errors produced by the sandbox layer.
///
/// A sample that runs and fails, or runs past its deadline, is not an error;
/// see [`ExecutionOutcome`](super::ExecutionOutcome).
#[derive(Debug, thiserror::Error)]
pub enum SandboxError {
    #[error("failed to spawn interpreter '{interpreter}': {source}")]
    Spawn {
        interpreter: String,
        #[source]
        source: std::io::Error,
    },

    #[error("sandbox io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid sandbox configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for sandbox operations.
pub type SandboxResult<T> = std::result::Result<T, SandboxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_error_names_interpreter() {
        let err = SandboxError::Spawn {
            interpreter: "python9".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        assert!(err.to_string().contains("python9"));
    }
}
