use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::models::SeedData;
use crate::query::{SortKey, StatusFilter, ViewState};
use crate::store::Latency;
use crate::utils;

/// Current configuration version
pub const CURRENT_CONFIG_VERSION: u32 = 1;

/// Sample data loaded when no seed file is configured
pub const BUNDLED_SEED: &str = include_str!("../data/seed.json");

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// JSON file with initial tasks and categories; the bundled sample data when unset
    #[serde(default)]
    pub seed_path: Option<String>,
    #[serde(default = "default_task_latency_ms")]
    pub task_latency_ms: u64,
    #[serde(default = "default_category_latency_ms")]
    pub category_latency_ms: u64,
    #[serde(default = "default_sort")]
    pub default_sort: String,
    #[serde(default = "default_status")]
    pub default_status: String,
    /// tracing filter directive, overridden by RUST_LOG
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
    #[serde(default = "default_config_version")]
    pub config_version: Option<u32>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            seed_path: None,
            task_latency_ms: default_task_latency_ms(),
            category_latency_ms: default_category_latency_ms(),
            default_sort: default_sort(),
            default_status: default_status(),
            log_filter: default_log_filter(),
            config_version: Some(CURRENT_CONFIG_VERSION),
        }
    }
}

// Default value functions
fn default_task_latency_ms() -> u64 {
    300
}

fn default_category_latency_ms() -> u64 {
    250
}

fn default_sort() -> String {
    "dueDate".to_string()
}

fn default_status() -> String {
    "all".to_string()
}

fn default_log_filter() -> String {
    "warn".to_string()
}

fn default_config_version() -> Option<u32> {
    Some(CURRENT_CONFIG_VERSION)
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config directory: {0}")]
    ConfigDirError(String),
    #[error("Failed to read config file: {0}")]
    ReadError(String),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to write config file: {0}")]
    WriteError(String),
    #[error("Failed to read seed file {path}: {reason}")]
    SeedReadError { path: String, reason: String },
    #[error("Failed to parse seed data: {0}")]
    SeedParseError(#[from] serde_json::Error),
}

impl Config {
    /// Load configuration from file, or create default if missing
    /// Uses the provided profile to determine the config path
    pub fn load_with_profile(profile: utils::Profile) -> Result<Self, ConfigError> {
        let config_path = Self::get_config_path(profile)?;

        if config_path.exists() {
            Self::load_from_path(&config_path)
        } else {
            // Create default config and save it
            let mut config = Config::default();
            config.save_to_path(&config_path)?;
            Ok(config)
        }
    }

    /// Load configuration from an explicit file. The file must exist.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(format!("{}: {}", path.display(), e)))?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Save configuration to file
    pub fn save_to_path(&mut self, config_path: &Path) -> Result<(), ConfigError> {
        // Ensure config version is set before saving
        self.config_version = Some(CURRENT_CONFIG_VERSION);

        // Create parent directory if it doesn't exist
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| ConfigError::WriteError(e.to_string()))?;
        }

        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::WriteError(format!("Failed to serialize config: {}", e)))?;

        fs::write(config_path, toml_string)
            .map_err(|e| ConfigError::WriteError(e.to_string()))?;

        Ok(())
    }

    /// Get the path to the config file
    pub fn get_config_path(profile: utils::Profile) -> Result<PathBuf, ConfigError> {
        let config_dir = utils::get_config_dir(profile)
            .ok_or_else(|| ConfigError::ConfigDirError("Could not determine config directory".to_string()))?;
        Ok(config_dir.join("config.toml"))
    }

    /// Simulated store latency
    pub fn latency(&self) -> Latency {
        Latency::from_millis(self.task_latency_ms, self.category_latency_ms)
    }

    /// Initial view-state from the configured defaults
    pub fn default_view(&self) -> ViewState {
        ViewState {
            sort_key: SortKey::parse(&self.default_sort),
            status: StatusFilter::parse(&self.default_status),
            ..Default::default()
        }
    }

    /// Get the expanded seed path (with ~ expansion), if one is configured
    pub fn get_seed_path(&self) -> Option<PathBuf> {
        self.seed_path.as_deref().map(utils::expand_path)
    }

    /// Read the configured seed data, falling back to the bundled sample data
    pub fn load_seed(&self) -> Result<SeedData, ConfigError> {
        match self.get_seed_path() {
            Some(path) => load_seed_file(&path),
            None => Ok(SeedData::from_json(BUNDLED_SEED)?),
        }
    }
}

/// Read seed data from a JSON file
pub fn load_seed_file(path: &Path) -> Result<SeedData, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|e| ConfigError::SeedReadError {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    Ok(SeedData::from_json(&contents)?)
}
