//! Container configuration

use crate::error::{BerthError, Result};
use crate::image::catalog;
use crate::network::DEFAULT_NETWORK;
use serde::{Deserialize, Serialize};

/// Container status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerStatus {
    /// Container is running
    Running,
    /// Container has stopped
    Stopped,
}

impl ContainerStatus {
    /// The opposite status
    pub fn toggled(self) -> Self {
        match self {
            ContainerStatus::Running => ContainerStatus::Stopped,
            ContainerStatus::Stopped => ContainerStatus::Running,
        }
    }
}

impl std::fmt::Display for ContainerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContainerStatus::Running => write!(f, "running"),
            ContainerStatus::Stopped => write!(f, "stopped"),
        }
    }
}

/// Environment variable
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvVar {
    pub key: String,
    pub value: String,
}

impl EnvVar {
    pub fn new(key: &str, value: &str) -> Self {
        Self {
            key: key.to_string(),
            value: value.to_string(),
        }
    }

    /// Parse a `KEY=VALUE` pair. The value may itself contain `=`.
    pub fn parse(pair: &str) -> Result<Self> {
        match pair.split_once('=') {
            Some((key, value)) if !key.is_empty() => Ok(Self::new(key, value)),
            _ => Err(BerthError::InvalidArgument(format!(
                "environment variable must be KEY=VALUE, got {:?}",
                pair
            ))),
        }
    }
}

impl std::fmt::Display for EnvVar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

/// Options for running a container
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOptions {
    /// Container name; generated from the image name when absent
    pub name: Option<String>,
    /// Published port mapping (e.g., "8080:80")
    pub ports: Option<String>,
    /// Environment variables, in order
    pub env: Vec<EnvVar>,
    /// Named volumes to mount
    pub volumes: Vec<String>,
    /// Network to attach to
    pub network: String,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            name: None,
            ports: None,
            env: Vec::new(),
            volumes: Vec::new(),
            network: DEFAULT_NETWORK.to_string(),
        }
    }
}

impl RunOptions {
    /// Create empty run options on the default network
    pub fn new() -> Self {
        Self::default()
    }

    /// Run options pre-filled with the defaults for an image name
    pub fn for_image(image_name: &str) -> Self {
        Self {
            ports: catalog::default_ports(image_name).map(str::to_string),
            env: catalog::default_env(image_name),
            ..Self::default()
        }
    }

    /// Set container name
    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    /// Set port mapping
    pub fn ports(mut self, ports: &str) -> Self {
        self.ports = Some(ports.to_string());
        self
    }

    /// Add environment variable
    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.env.push(EnvVar::new(key, value));
        self
    }

    /// Add volume mount
    pub fn volume(mut self, name: &str) -> Self {
        self.volumes.push(name.to_string());
        self
    }

    /// Set network
    pub fn network(mut self, network: &str) -> Self {
        self.network = network.to_string();
        self
    }

    /// Drop blank entries: empty ports, env vars without a key, repeated volumes
    pub(crate) fn normalized(mut self) -> Self {
        self.name = self.name.filter(|n| !n.trim().is_empty());
        self.ports = self.ports.filter(|p| !p.trim().is_empty());
        self.env.retain(|e| !e.key.is_empty());

        let mut seen = Vec::with_capacity(self.volumes.len());
        self.volumes.retain(|v| {
            if v.is_empty() || seen.contains(v) {
                false
            } else {
                seen.push(v.clone());
                true
            }
        });

        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_options_builder() {
        let options = RunOptions::new()
            .name("web")
            .ports("8080:80")
            .env("MODE", "prod")
            .volume("data")
            .network("app-net");

        assert_eq!(options.name.as_deref(), Some("web"));
        assert_eq!(options.env, vec![EnvVar::new("MODE", "prod")]);
        assert_eq!(options.network, "app-net");
    }

    #[test]
    fn test_for_image_defaults() {
        let options = RunOptions::for_image("postgres");
        assert_eq!(options.ports.as_deref(), Some("5432:5432"));
        assert_eq!(options.env[0].key, "POSTGRES_PASSWORD");
        assert_eq!(options.network, "bridge");

        let options = RunOptions::for_image("alpine");
        assert!(options.ports.is_none());
        assert!(options.env.is_empty());
    }

    #[test]
    fn test_normalized() {
        let options = RunOptions::new()
            .name("  ")
            .ports("")
            .env("", "ignored")
            .env("A", "1")
            .volume("v1")
            .volume("v1")
            .volume("v2")
            .normalized();

        assert!(options.name.is_none());
        assert!(options.ports.is_none());
        assert_eq!(options.env, vec![EnvVar::new("A", "1")]);
        assert_eq!(options.volumes, vec!["v1", "v2"]);
    }

    #[test]
    fn test_env_var_parse() {
        let var = EnvVar::parse("URL=mongodb://db:27017/?a=b").unwrap();
        assert_eq!(var.key, "URL");
        assert_eq!(var.value, "mongodb://db:27017/?a=b");
        assert!(EnvVar::parse("NOVALUE").is_err());
        assert!(EnvVar::parse("=x").is_err());
    }

    #[test]
    fn test_status_toggle() {
        assert_eq!(ContainerStatus::Running.toggled(), ContainerStatus::Stopped);
        assert_eq!(ContainerStatus::Stopped.to_string(), "stopped");
    }
}
