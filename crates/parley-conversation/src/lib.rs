#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

//! Conversation state for Parley
//!
//! A [`Conversation`] owns one channel's transcript and serializes every
//! turn behind its own lock. Transcripts are persisted through a
//! [`ConversationStore`].

mod conversation;
pub mod error;
mod record;
pub mod store;

#[cfg(test)]
mod testing;

pub use conversation::{Conversation, ReplyOutcome, ReplyStream, Settings, Turn};
pub use error::{ConversationError, Result};
pub use record::ConversationRecord;
pub use store::{ConversationStore, FileStore, MemoryStore, StoreError};
