#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

//! Channel event handlers for Parley
//!
//! A [`Bot`] keeps one [`Conversation`](parley_conversation::Conversation)
//! per watched channel and turns incoming messages into relayed replies.

mod bot;
mod event;
mod turn;

#[cfg(test)]
mod testing;

pub use bot::{Bot, BotSettings};
pub use event::{Disposition, IncomingMessage};
