//! Dashboard configuration: optional JSON file plus environment overrides.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const DEFAULT_CONFIG_FILE: &str = "dashboard.json";
/// Overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "ANDINA_DASHBOARD_CONFIG";
/// Overrides `data_dir` from the config file.
pub const DATA_DIR_ENV: &str = "ANDINA_DATA_DIR";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Directory holding the six CSV extracts.
    pub data_dir: PathBuf,
    /// Default destination for chart exports.
    pub export_dir: PathBuf,
    pub window_width: f32,
    pub window_height: f32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("Data"),
            export_dir: PathBuf::from("exports"),
            window_width: 1400.0,
            window_height: 900.0,
        }
    }
}

impl DashboardConfig {
    /// Resolve the configuration from the process environment.
    pub fn load() -> Result<Self> {
        let path = std::env::var_os(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

        let config = Self::from_file_or_default(&path)?
            .with_data_dir_override(std::env::var_os(DATA_DIR_ENV));
        info!(
            data_dir = %config.data_dir.display(),
            export_dir = %config.export_dir.display(),
            "configuration resolved"
        );
        Ok(config)
    }

    /// Read a JSON config file; a missing file yields the defaults.
    pub fn from_file_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        Ok(config)
    }

    pub fn with_data_dir_override(mut self, data_dir: Option<OsString>) -> Self {
        if let Some(dir) = data_dir.filter(|d| !d.is_empty()) {
            self.data_dir = PathBuf::from(dir);
        }
        self
    }
}
