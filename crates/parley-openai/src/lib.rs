#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

//! OpenAI chat-completion client for Parley
//!
//! Provides the wire types, a [`CompletionBackend`] abstraction over the
//! completion service, and the decoder that turns a streamed response body
//! into ordered text fragments

mod backend;
mod client;
pub mod decoder;
pub mod error;
pub mod types;

pub use backend::{ByteStream, CompletionBackend};
pub use client::OpenAiClient;
pub use decoder::{FragmentStream, decode};
pub use error::{OpenAiError, Result};
pub use types::*;
