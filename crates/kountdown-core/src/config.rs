//! Configuration loading — TOML file under `~/.kountdown/`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{KountdownError, Result};

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KountdownConfig {
    /// Seconds between poller ticks.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Path to the sqlite database. Supports `~` expansion.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    #[serde(default)]
    pub dispatch: DispatchConfig,
}

/// Which dispatcher delivers notifications.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// "console" or "webhook".
    #[serde(default = "default_dispatch_mode")]
    pub mode: String,

    /// Target URL for the webhook dispatcher.
    pub webhook_url: Option<String>,
}

fn default_poll_interval() -> u64 {
    5
}

fn default_database_path() -> String {
    "~/.kountdown/kountdown.db".into()
}

fn default_dispatch_mode() -> String {
    "console".into()
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            mode: default_dispatch_mode(),
            webhook_url: None,
        }
    }
}

impl Default for KountdownConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval(),
            database_path: default_database_path(),
            dispatch: DispatchConfig::default(),
        }
    }
}

impl KountdownConfig {
    /// Home directory for config and data (`~/.kountdown`).
    pub fn home_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".kountdown")
    }

    /// Default config file location.
    pub fn default_path() -> PathBuf {
        Self::home_dir().join("config.toml")
    }

    /// Load from the default path, falling back to defaults when the file
    /// does not exist.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path())
    }

    /// Load from an explicit path. Missing file yields defaults.
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| KountdownError::Config(e.to_string()))
    }

    /// Write the current configuration to the default path.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::default_path())
    }

    /// Write the current configuration to an explicit path, creating parent
    /// directories as needed.
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| KountdownError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Database path with `~` expanded.
    pub fn database_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.database_path).into_owned())
    }
}
