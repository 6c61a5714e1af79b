use std::time::Duration;

use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

/// Completion backend configuration
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OpenAiConfig {
    /// API key sent as a bearer token
    pub api_key: SecretString,
    /// Base URL of the OpenAI-compatible API
    #[serde(default = "default_base_url")]
    pub base_url: Url,
    /// Request timeout, covering the whole streamed response
    #[serde(default = "default_timeout", with = "crate::duration")]
    pub timeout: Duration,
}

/// Default `OpenAI` API base URL
#[allow(clippy::missing_panics_doc)]
pub fn default_base_url() -> Url {
    Url::parse("https://api.openai.com/v1").expect("valid default URL")
}

const fn default_timeout() -> Duration {
    Duration::from_secs(120)
}
