#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

//! Discord delivery for Parley
//!
//! The [`Platform`] trait is the only surface the relay needs from the chat
//! platform. On top of it sit the static [`chunk_text`] splitter, the
//! live-editing [`Batcher`], and the [`TypingHeartbeat`].

mod batcher;
mod chunk;
mod client;
pub mod error;
mod platform;
mod typing;

#[cfg(test)]
mod testing;

pub use batcher::{BatchSummary, Batcher};
pub use chunk::{MESSAGE_CAP, chunk_text};
pub use client::DiscordClient;
pub use error::{DeliveryError, Operation, PlatformError, Result};
pub use platform::{ChannelId, MessageId, Platform};
pub use typing::TypingHeartbeat;
