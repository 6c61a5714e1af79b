use parley_discord::ChannelId;
use parley_openai::{Message, Usage};
use serde::{Deserialize, Serialize};

/// Persisted form of a conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationRecord {
    /// Channel the conversation lives in
    pub channel: ChannelId,
    /// Display name
    pub name: String,
    /// Model identifier
    pub model: String,
    /// Sampling temperature, if set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Choices requested per completion
    pub choices: u32,
    /// Current system prompt
    pub system_prompt: String,
    /// Transcript, system prompt first
    pub messages: Vec<Message>,
    /// Usage of the most recent non-streaming turn
    #[serde(default)]
    pub usage: Option<Usage>,
}
