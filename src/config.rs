//! Persistent settings for the command-line front end.

use crate::upload::FileFormat;
use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// User settings, stored as JSON in the platform config directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweeperConfig {
    /// Rows shown by `preview`
    pub preview_rows: usize,
    /// Export format when none is given on the command line
    pub default_format: FileFormat,
    /// Where artifacts are written; the working directory when unset
    pub output_dir: Option<PathBuf>,
    /// Replace existing artifacts
    pub overwrite: bool,
    /// Also write logs to rolling files in the data directory
    pub log_to_file: bool,
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            preview_rows: 5,
            default_format: FileFormat::Csv,
            output_dir: None,
            overwrite: false,
            log_to_file: false,
        }
    }
}

impl SweeperConfig {
    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Failed to get config directory")?;
        Ok(config_dir.join("datasweeper").join("config.json"))
    }

    /// Load configuration from disk, falling back to defaults
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config JSON in {}", path.display()))
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let json = serde_json::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(path, json)
            .with_context(|| format!("Failed to write config to {}", path.display()))
    }
}
