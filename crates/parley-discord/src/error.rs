use std::fmt;

use crate::platform::ChannelId;

/// Platform-specific result type
pub type Result<T> = std::result::Result<T, PlatformError>;

/// Errors from a chat platform call
#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Platform rejected the request
    #[error("{status}: {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Platform-specific error code, when present
        code: Option<u64>,
        /// Human-readable error message
        message: String,
    },

    /// Failed to parse a response body
    #[error("failed to parse response: {0}")]
    Parse(String),

    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Platform operation names used in logs and errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Post a new message
    CreateMessage,
    /// Replace the content of a posted message
    EditMessage,
    /// Show the typing indicator
    SetTyping,
}

impl Operation {
    /// Snake-case operation name
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreateMessage => "create_message",
            Self::EditMessage => "edit_message",
            Self::SetTyping => "set_typing",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A platform failure attributed to the channel and operation it hit
#[derive(Debug, thiserror::Error)]
#[error("{operation} failed in channel {channel}: {source}")]
pub struct DeliveryError {
    /// Operation that failed
    pub operation: Operation,
    /// Channel the operation targeted
    pub channel: ChannelId,
    /// Underlying platform error
    #[source]
    pub source: PlatformError,
}
