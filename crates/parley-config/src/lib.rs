#![allow(clippy::must_use_candidate)]

pub mod conversation;
pub mod discord;
mod duration;
mod env;
mod loader;
pub mod log;
pub mod openai;
pub mod relay;
pub mod storage;

use serde::Deserialize;

pub use conversation::*;
pub use discord::*;
pub use log::*;
pub use openai::*;
pub use relay::*;
pub use storage::*;

/// Top-level Parley configuration
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Completion backend configuration
    pub openai: OpenAiConfig,
    /// Chat platform configuration
    pub discord: DiscordConfig,
    /// Relay pacing configuration
    #[serde(default)]
    pub relay: RelayConfig,
    /// Defaults for newly created conversations
    #[serde(default)]
    pub conversation: ConversationDefaults,
    /// Transcript storage configuration
    #[serde(default)]
    pub storage: StorageConfig,
    /// Logging configuration
    #[serde(default)]
    pub log: LogConfig,
}
