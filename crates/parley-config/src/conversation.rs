use serde::Deserialize;

/// Settings applied to every newly created conversation
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConversationDefaults {
    /// Model identifier sent to the completion backend
    #[serde(default = "default_model")]
    pub model: String,
    /// System prompt placed at the head of the transcript
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
    /// Sampling temperature (0.0 to 2.0)
    #[serde(default)]
    pub temperature: Option<f64>,
    /// Number of choices requested per completion
    #[serde(default = "default_choices")]
    pub choices: u32,
}

impl Default for ConversationDefaults {
    fn default() -> Self {
        Self {
            model: default_model(),
            system_prompt: default_system_prompt(),
            temperature: None,
            choices: default_choices(),
        }
    }
}

fn default_model() -> String {
    "gpt-4-turbo-preview".to_owned()
}

fn default_system_prompt() -> String {
    "You are a helpful assistant. If you need to use formatting, send it with discord-flavoured markdown.".to_owned()
}

const fn default_choices() -> u32 {
    1
}
