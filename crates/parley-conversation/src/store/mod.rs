//! Transcript persistence
//!
//! Storage is best effort: callers log failures and carry on with the
//! in-memory state.

mod file;
mod memory;

use std::path::PathBuf;

use async_trait::async_trait;
use parley_discord::ChannelId;
use parley_openai::{Message, Usage};

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::record::ConversationRecord;

/// Result alias for storage operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Storage failures
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No conversation is stored for the channel
    #[error("no conversation stored for channel {0}")]
    NotFound(ChannelId),

    /// A conversation already exists for the channel
    #[error("conversation already stored for channel {0}")]
    AlreadyExists(ChannelId),

    /// The channel identifier cannot be used as a storage key
    #[error("invalid channel identifier: {0:?}")]
    InvalidChannel(String),

    /// Filesystem failure
    #[error("storage I/O failed at {}: {source}", path.display())]
    Io {
        /// File or directory involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// A stored document could not be encoded or decoded
    #[error("malformed conversation document {}: {source}", path.display())]
    Serde {
        /// Document involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: serde_json::Error,
    },
}

/// Durable home for conversation transcripts
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Every stored conversation
    async fn load_all(&self) -> Result<Vec<ConversationRecord>>;

    /// Store a new conversation with its initial transcript
    async fn create_conversation(&self, record: &ConversationRecord) -> Result<()>;

    /// Append one message to a stored transcript
    async fn insert_message(&self, channel: &ChannelId, message: &Message) -> Result<()>;

    /// Replace the stored usage counters
    async fn update_usage(&self, channel: &ChannelId, usage: Option<Usage>) -> Result<()>;

    /// Remove a conversation and its transcript
    async fn delete_conversation(&self, channel: &ChannelId) -> Result<()>;
}
