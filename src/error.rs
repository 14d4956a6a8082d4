use std::io;

/// Custom error type for gitlab_trace_bridge operations
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    #[error("Trace identity requires a commit sha, a pipeline id and a finish time")]
    InvalidIdentityInput,

    #[error("Unparseable timestamp: {0:?}")]
    UnparseableTimestamp(String),

    #[error("Trace export failed: {0}")]
    SinkFailure(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("TOML parsing error: {0}")]
    TomlParseError(#[from] toml::de::Error),
}

/// Helper type for Results that use BridgeError
pub type Result<T> = std::result::Result<T, BridgeError>;
