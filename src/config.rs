//! Berth configuration file

use crate::error::{BerthError, Result};
use crate::history::DEFAULT_HISTORY_LIMIT;
use crate::ids::IdStrategy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the configuration file inside the config directory
pub const CONFIG_FILE: &str = "config.yaml";

/// Registry settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct BerthConfig {
    /// Commands kept in the history
    pub history_limit: usize,
    /// Random or sequential ids
    pub id_strategy: IdStrategy,
    /// Scenario loaded at startup
    pub initial_scenario: Option<String>,
    /// Extra scenario definitions (YAML)
    pub scenario_files: Vec<PathBuf>,
    /// Default log filter for the binaries
    pub log_level: String,
}

impl Default for BerthConfig {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_HISTORY_LIMIT,
            id_strategy: IdStrategy::Random,
            initial_scenario: None,
            scenario_files: Vec::new(),
            log_level: "info".to_string(),
        }
    }
}

impl BerthConfig {
    /// Default location: `<config dir>/berth/config.yaml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("berth").join(CONFIG_FILE))
    }

    /// Parse configuration from YAML
    pub fn parse_str(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file. Relative scenario paths are taken
    /// relative to the file's directory.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            BerthError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let mut config = Self::parse_str(&content)?;
        if let Some(dir) = path.parent() {
            for file in &mut config.scenario_files {
                if file.is_relative() {
                    *file = dir.join(&*file);
                }
            }
        }

        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load from the default location, falling back to defaults when the
    /// file does not exist
    pub fn load_default() -> Result<Self> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load from `path` when given, otherwise from the default location
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Self::load_default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.history_limit == 0 {
            return Err(BerthError::Config(
                "history_limit must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
