//! Tracker configuration.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};

const APP_NAME: &str = "techtracker";
const CONFIG_FILE: &str = "config.json";

/// Five megabytes.
pub const DEFAULT_MAX_IMPORT_BYTES: u64 = 5 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Storage key the collection is persisted under.
    pub storage_key: String,
    /// Roadmap name written into exports and used for imports that carry none.
    pub roadmap_name: String,
    /// Largest file accepted by an import.
    pub max_import_bytes: u64,
    /// How long a success notification stays visible.
    pub success_notice_secs: u64,
    /// How long an error notification stays visible.
    pub error_notice_secs: u64,
    /// Overrides the storage file location in the data directory.
    pub data_path: Option<PathBuf>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            storage_key: "technologies".to_string(),
            roadmap_name: "Learning Roadmap".to_string(),
            max_import_bytes: DEFAULT_MAX_IMPORT_BYTES,
            success_notice_secs: 3,
            error_notice_secs: 5,
            data_path: None,
        }
    }
}

impl TrackerConfig {
    /// Load configuration from the user's config directory.
    /// Returns default config if file doesn't exist or fails to parse.
    pub fn load() -> Self {
        match Self::try_load() {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to load config, using defaults: {:#}", e);
                Self::default()
            }
        }
    }

    fn try_load() -> Result<Self> {
        let config_path = get_config_path()?;
        if !config_path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&config_path)
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config = serde_json::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }

    /// Save the current configuration to disk.
    pub fn save(&self) -> Result<PathBuf> {
        let config_path = get_config_path()?;
        self.save_to(&config_path)?;
        Ok(config_path)
    }

    pub fn save_to(&self, config_path: &std::path::Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(config_path, content).context("Failed to write config file")?;

        Ok(())
    }

    pub fn success_notice(&self) -> Duration {
        Duration::from_secs(self.success_notice_secs)
    }

    pub fn error_notice(&self) -> Duration {
        Duration::from_secs(self.error_notice_secs)
    }
}

fn get_config_path() -> Result<PathBuf> {
    let mut path =
        config_dir().ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
    path.push(APP_NAME);
    path.push(CONFIG_FILE);
    Ok(path)
}
