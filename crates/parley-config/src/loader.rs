use std::path::Path;

use secrecy::ExposeSecret;

use crate::{Config, StorageType};

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Reads the file, expands `{{ env.VAR }}` placeholders, then
    /// deserializes and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, environment variable
    /// expansion fails, TOML parsing fails, or validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        Self::from_toml(&raw)
    }

    /// Parse and validate configuration from raw TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if expansion, parsing, or validation fails
    pub fn from_toml(raw: &str) -> anyhow::Result<Self> {
        let expanded =
            crate::env::expand_env(raw).map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let config: Self = toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate that the configuration is internally consistent
    ///
    /// # Errors
    ///
    /// Returns an error describing the first invalid setting
    pub fn validate(&self) -> anyhow::Result<()> {
        self.validate_credentials()?;
        self.validate_conversation()?;
        self.validate_relay()?;
        self.validate_storage()?;
        Ok(())
    }

    fn validate_credentials(&self) -> anyhow::Result<()> {
        if self.openai.api_key.expose_secret().is_empty() {
            anyhow::bail!("openai.api_key must not be empty");
        }

        if self.discord.token.expose_secret().is_empty() {
            anyhow::bail!("discord.token must not be empty");
        }

        Ok(())
    }

    fn validate_conversation(&self) -> anyhow::Result<()> {
        let defaults = &self.conversation;

        if defaults.model.trim().is_empty() {
            anyhow::bail!("conversation.model must not be empty");
        }

        if let Some(temperature) = defaults.temperature
            && !(0.0..=2.0).contains(&temperature)
        {
            anyhow::bail!("conversation.temperature must be between 0.0 and 2.0, got {temperature}");
        }

        if defaults.choices == 0 {
            anyhow::bail!("conversation.choices must be at least 1");
        }

        Ok(())
    }

    fn validate_relay(&self) -> anyhow::Result<()> {
        if self.relay.flush_interval.is_zero() {
            anyhow::bail!("relay.flush_interval must be greater than 0");
        }

        if self.relay.typing_interval.is_zero() {
            anyhow::bail!("relay.typing_interval must be greater than 0");
        }

        Ok(())
    }

    fn validate_storage(&self) -> anyhow::Result<()> {
        if self.storage.storage_type == StorageType::File && self.storage.path.is_none() {
            anyhow::bail!("storage.path is required for file storage");
        }

        Ok(())
    }
}
