use std::time::Duration;

use serde::Deserialize;

/// How replies are relayed to the platform
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RelayConfig {
    /// Stream replies into live-edited messages instead of posting them whole
    #[serde(default = "default_streaming")]
    pub streaming: bool,
    /// How often buffered fragments are flushed to the platform
    #[serde(default = "default_flush_interval", with = "crate::duration")]
    pub flush_interval: Duration,
    /// How often the typing indicator is refreshed
    #[serde(default = "default_typing_interval", with = "crate::duration")]
    pub typing_interval: Duration,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            streaming: default_streaming(),
            flush_interval: default_flush_interval(),
            typing_interval: default_typing_interval(),
        }
    }
}

const fn default_streaming() -> bool {
    true
}

const fn default_flush_interval() -> Duration {
    Duration::from_millis(500)
}

const fn default_typing_interval() -> Duration {
    Duration::from_secs(3)
}
