//! Configuration loading and management.

use serde::Deserialize;
use std::path::Path;

/// Top-level configuration for the channel core.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server identity.
    #[serde(default)]
    pub server: ServerConfig,

    /// Tunable limits.
    #[serde(default)]
    pub limits: LimitsConfig,
}

/// Server identity block.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Human-readable server name, used in logs only.
    #[serde(default = "default_server_name")]
    pub name: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: default_server_name(),
        }
    }
}

fn default_server_name() -> String {
    "chatter".to_string()
}

/// Limits block.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LimitsConfig {
    /// Maximum number of live channels. `0` means unlimited.
    ///
    /// A creating join past the cap is refused with `InvalidChannelName`;
    /// joins to existing channels are never affected.
    #[serde(default)]
    pub max_channels: usize,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config = toml::from_str(&raw)?;
        Ok(config)
    }
}
