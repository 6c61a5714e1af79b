use std::fmt;

use serde::{Deserialize, Serialize};

// -- Transcript types --

/// Author of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Instructions placed at the head of a conversation
    System,
    /// The human participant
    User,
    /// The model
    Assistant,
}

impl Role {
    /// Wire name of the role
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Message in a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Role of the message author
    pub role: Role,
    /// Text content
    pub content: String,
}

impl Message {
    /// Create a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Token usage reported for a completion
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    /// Tokens generated by the model
    pub completion_tokens: u32,
    /// Tokens in the prompt
    pub prompt_tokens: u32,
    /// Sum of prompt and completion tokens
    pub total_tokens: u32,
}

// -- Request types --

/// Chat completion request
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    /// Model identifier
    pub model: String,
    /// Full transcript, system prompt first
    pub messages: Vec<Message>,
    /// Sampling temperature (0.0 to 2.0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Number of choices to generate
    #[serde(rename = "n")]
    pub choices: u32,
    /// Whether to stream the response
    pub stream: bool,
}

// -- Response types --

/// Non-streaming chat completion response
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    /// Completion identifier
    #[serde(default)]
    pub id: String,
    /// Model that produced the completion
    #[serde(default)]
    pub model: String,
    /// Generated choices
    #[serde(default)]
    pub choices: Vec<Choice>,
    /// Token usage, when reported
    #[serde(default)]
    pub usage: Option<Usage>,
}

impl ChatResponse {
    /// Text of the first choice, if any
    pub fn first_content(&self) -> Option<&str> {
        self.choices.first().map(|c| c.message.content.as_deref().unwrap_or_default())
    }
}

/// A single generated choice
#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    /// Choice index
    #[serde(default)]
    pub index: u32,
    /// Generated message
    pub message: ResponseMessage,
    /// Why generation stopped
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Message as returned by the backend, where content may be null
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseMessage {
    /// Role of the author
    pub role: Role,
    /// Text content
    #[serde(default)]
    pub content: Option<String>,
}

// -- Stream chunk types --

/// One record of a streamed completion
#[derive(Debug, Clone, Deserialize)]
pub struct StreamChunk {
    /// Incremental choices
    #[serde(default)]
    pub choices: Vec<StreamChoice>,
}

/// Incremental choice in a stream chunk
#[derive(Debug, Clone, Deserialize)]
pub struct StreamChoice {
    /// Which of the requested choices this increment belongs to
    #[serde(default)]
    pub index: u32,
    /// Increment to apply
    #[serde(default)]
    pub delta: Delta,
    /// Set on the record that ends the choice
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Content increment within a stream choice
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Delta {
    /// Role, sent on the first record only
    #[serde(default)]
    pub role: Option<Role>,
    /// Text to append
    #[serde(default)]
    pub content: Option<String>,
}
