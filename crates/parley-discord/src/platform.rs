use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Identifier of a platform channel, which is also the conversation key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(String);

impl ChannelId {
    /// Wrap a raw channel identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Raw identifier
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChannelId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ChannelId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Handle of a posted message
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    /// Wrap a raw message identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Raw identifier
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Operations the relay needs from the chat platform
#[async_trait]
pub trait Platform: Send + Sync {
    /// Post a new message, returning its handle
    async fn create_message(&self, channel: &ChannelId, content: &str) -> Result<MessageId>;

    /// Replace the full content of a posted message
    async fn edit_message(&self, channel: &ChannelId, message: &MessageId, content: &str) -> Result<()>;

    /// Show the typing indicator in a channel
    async fn set_typing(&self, channel: &ChannelId) -> Result<()>;
}
