//! Scenario presets
//!
//! A scenario describes a complete replacement graph: images, volumes,
//! networks and the containers wired to them. Loading one discards whatever
//! the registry held before. Scenarios are plain data and can be written in
//! YAML:
//!
//! ```yaml
//! id: cache
//! name: Cache
//! description: A single redis instance
//! difficulty: beginner
//! images:
//!   - { name: redis, tag: alpine }
//! containers:
//!   - { name: cache, image: "redis:alpine", ports: "6379:6379" }
//! ```

pub mod loader;
pub mod presets;

pub use loader::instantiate;
pub use presets::STARTER;

use crate::container::{ContainerStatus, EnvVar, RunOptions};
use crate::error::{BerthError, ResourceKind, Result};
use crate::ids::SequentialIds;
use crate::network::{NetworkDriver, DEFAULT_NETWORK};
use crate::storage::VolumeDriver;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How much a scenario asks of the reader
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Difficulty::Beginner => write!(f, "Beginner"),
            Difficulty::Intermediate => write!(f, "Intermediate"),
            Difficulty::Advanced => write!(f, "Advanced"),
        }
    }
}

/// Image in a scenario. Size and layers fall back to the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSpec {
    pub name: String,
    pub tag: String,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub layers: Option<u32>,
}

/// Volume in a scenario
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeSpec {
    pub name: String,
    #[serde(default)]
    pub driver: VolumeDriver,
    #[serde(default)]
    pub size: Option<String>,
}

/// User-defined network in a scenario
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkSpec {
    pub name: String,
    #[serde(default)]
    pub driver: NetworkDriver,
}

/// Container in a scenario
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerSpec {
    pub name: String,
    /// Image reference (`name:tag`)
    pub image: String,
    #[serde(default = "running")]
    pub status: ContainerStatus,
    #[serde(default)]
    pub ports: Option<String>,
    #[serde(default = "default_network")]
    pub network: String,
    #[serde(default)]
    pub env: Vec<EnvVar>,
    #[serde(default)]
    pub volumes: Vec<String>,
}

fn running() -> ContainerStatus {
    ContainerStatus::Running
}

fn default_network() -> String {
    DEFAULT_NETWORK.to_string()
}

impl ContainerSpec {
    /// Equivalent run options
    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            name: Some(self.name.clone()),
            ports: self.ports.clone(),
            env: self.env.clone(),
            volumes: self.volumes.clone(),
            network: self.network.clone(),
        }
    }
}

/// A named preset graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    /// Stable identifier (e.g., "web-db")
    pub id: String,
    /// Display name
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub images: Vec<ImageSpec>,
    #[serde(default)]
    pub containers: Vec<ContainerSpec>,
    #[serde(default)]
    pub volumes: Vec<VolumeSpec>,
    #[serde(default)]
    pub networks: Vec<NetworkSpec>,
}

impl Scenario {
    /// Check that the scenario describes a consistent graph
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(BerthError::InvalidArgument(
                "scenario id must not be empty".to_string(),
            ));
        }
        instantiate(self, &mut SequentialIds::new()).map(|_| ())
    }

    /// Parse a scenario from YAML
    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Read a scenario from a YAML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }
}

/// The set of scenarios a registry can load
#[derive(Debug, Clone)]
pub struct ScenarioCatalog {
    scenarios: Vec<Scenario>,
}

impl Default for ScenarioCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ScenarioCatalog {
    /// Catalog with the built-in presets
    pub fn builtin() -> Self {
        Self {
            scenarios: presets::builtin(),
        }
    }

    /// Look up a scenario by id
    pub fn get(&self, id: &str) -> Option<&Scenario> {
        self.scenarios.iter().find(|s| s.id == id)
    }

    /// Scenarios in registration order
    pub fn iter(&self) -> impl Iterator<Item = &Scenario> {
        self.scenarios.iter()
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    /// Add a scenario after checking it is consistent and its id is new
    pub fn register(&mut self, scenario: Scenario) -> Result<()> {
        if self.get(&scenario.id).is_some() {
            return Err(BerthError::duplicate(ResourceKind::Scenario, &scenario.id));
        }
        scenario.validate()?;

        tracing::debug!("Registered scenario {}", scenario.id);
        self.scenarios.push(scenario);
        Ok(())
    }

    /// Read and register a scenario file
    pub fn load_file(&mut self, path: &Path) -> Result<&Scenario> {
        let scenario = Scenario::from_file(path)?;
        self.register(scenario)?;
        Ok(&self.scenarios[self.scenarios.len() - 1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::io::Write;

    const CACHE_YAML: &str = r#"
id: cache
name: Cache
description: A single redis instance
images:
  - { name: redis, tag: alpine }
containers:
  - { name: cache, image: "redis:alpine", ports: "6379:6379" }
"#;

    #[test]
    fn test_from_yaml_applies_defaults() {
        let scenario = Scenario::from_yaml(CACHE_YAML).unwrap();
        assert_eq!(scenario.difficulty, Difficulty::Beginner);

        let cache = &scenario.containers[0];
        assert_eq!(cache.status, ContainerStatus::Running);
        assert_eq!(cache.network, "bridge");
        assert!(cache.env.is_empty());
        assert!(scenario.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_dangling_reference() {
        let mut scenario = Scenario::from_yaml(CACHE_YAML).unwrap();
        scenario.containers[0].volumes.push("cache-data".to_string());

        let err = scenario.validate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_register_duplicate_id() {
        let mut catalog = ScenarioCatalog::builtin();
        let mut scenario = Scenario::from_yaml(CACHE_YAML).unwrap();
        scenario.id = "web-db".to_string();

        let err = catalog.register(scenario).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Duplicate);
        assert_eq!(catalog.len(), 5);
    }

    #[test]
    fn test_load_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(CACHE_YAML.as_bytes()).unwrap();

        let mut catalog = ScenarioCatalog::builtin();
        let scenario = catalog.load_file(file.path()).unwrap();
        assert_eq!(scenario.id, "cache");
        assert!(catalog.get("cache").is_some());
    }

    #[test]
    fn test_bad_yaml() {
        let err = Scenario::from_yaml("id: [unterminated").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Serialization);
    }
}
