use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::anyhow;
use mash_lauter_control::BAUD_RATE;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BrewConfig {
    pub serial: SerialConfig,
    pub log: LogConfig,
}

impl BrewConfig {
    pub fn load(path: &Path) -> anyhow::Result<BrewConfig> {
        let content = fs::read_to_string(path)
            .map_err(|err| anyhow!("Could not read config file {}: {:?}", path.display(), err))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> anyhow::Result<BrewConfig> {
        toml::from_str(content).map_err(|err| anyhow!("Could not parse TOML config: {}", err))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    /// Discovered under `/dev` when unset.
    pub path: Option<PathBuf>,
    pub baud_rate: u32,
    /// Bound on every read: handshake, acknowledgments and status lines.
    pub timeout_ms: u64,
}

impl SerialConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for SerialConfig {
    fn default() -> Self {
        SerialConfig {
            path: None,
            baud_rate: BAUD_RATE,
            timeout_ms: 5000,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub status_log: Option<PathBuf>,
}
