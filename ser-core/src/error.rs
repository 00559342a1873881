//! Error types for SER operations

/// Result type for SER operations
pub type Result<T> = std::result::Result<T, SerError>;

/// Error types for the emotion and gait pipelines
#[derive(Debug, thiserror::Error)]
pub enum SerError {
    /// No API key could be resolved when building a client
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Caller supplied unusable input (e.g. empty text)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Transport failure (connect, timeout, body read)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status returned by the completion endpoint
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Malformed streaming response
    #[error("Stream error: {0}")]
    Stream(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<String> for SerError {
    fn from(s: String) -> Self {
        SerError::Other(s)
    }
}

impl From<&str> for SerError {
    fn from(s: &str) -> Self {
        SerError::Other(s.to_string())
    }
}

impl From<anyhow::Error> for SerError {
    fn from(err: anyhow::Error) -> Self {
        SerError::Other(err.to_string())
    }
}

impl From<figment::Error> for SerError {
    fn from(err: figment::Error) -> Self {
        SerError::Configuration(err.to_string())
    }
}
