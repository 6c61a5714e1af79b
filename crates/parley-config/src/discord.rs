use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

/// Chat platform configuration
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DiscordConfig {
    /// Bot token
    pub token: SecretString,
    /// Base URL of the Discord REST API
    #[serde(default = "default_api_base")]
    pub api_base: Url,
    /// Channel that receives the "online" announcement on startup
    #[serde(default)]
    pub general_channel: Option<String>,
}

/// Default Discord REST API base URL
#[allow(clippy::missing_panics_doc)]
pub fn default_api_base() -> Url {
    Url::parse("https://discord.com/api/v10").expect("valid default URL")
}
