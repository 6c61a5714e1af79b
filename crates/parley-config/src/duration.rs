use std::time::Duration;

use serde::{Deserialize, Deserializer};

/// Deserialize a human-readable duration string such as `"500ms"` or `"3s"`
pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    duration_str::parse(&raw).map_err(|e| serde::de::Error::custom(format!("invalid duration '{raw}': {e}")))
}
