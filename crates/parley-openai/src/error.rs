/// Client-specific result type
pub type Result<T> = std::result::Result<T, OpenAiError>;

/// Errors from the completion backend
#[derive(Debug, thiserror::Error)]
pub enum OpenAiError {
    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server returned a non-success response
    #[error("{status} {error_type}: {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error type identifier
        error_type: String,
        /// Human-readable error message
        message: String,
    },

    /// Failed to parse a complete response body
    #[error("failed to parse response: {0}")]
    Parse(String),

    /// A streamed record could not be decoded
    #[error("malformed stream record: {0}")]
    Decode(String),

    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    Config(String),
}
