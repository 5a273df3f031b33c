//! Container records
//!
//! A container here is bookkeeping only: starting one flips its status and
//! stamps a time, nothing is executed.

use super::config::{ContainerStatus, EnvVar, RunOptions};
use crate::ids::ResourceId;
use crate::store::{Entity, Table};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Container instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Container {
    /// Container ID
    pub id: ResourceId,
    /// Container name
    pub name: String,
    /// Image reference (`name:tag`)
    pub image: String,
    /// Current status
    pub status: ContainerStatus,
    /// Published port mapping
    pub ports: Option<String>,
    /// Environment variables
    pub env: Vec<EnvVar>,
    /// Mounted volume names
    pub volumes: Vec<String>,
    /// Attached network name
    pub network: String,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last start time
    pub started_at: Option<DateTime<Utc>>,
    /// Last stop time
    pub finished_at: Option<DateTime<Utc>>,
}

impl Container {
    /// Create a new running container record
    pub fn new(id: ResourceId, name: &str, image: &str, network: &str) -> Self {
        let now = Utc::now();
        Self {
            id,
            name: name.to_string(),
            image: image.to_string(),
            status: ContainerStatus::Running,
            ports: None,
            env: Vec::new(),
            volumes: Vec::new(),
            network: network.to_string(),
            created_at: now,
            started_at: Some(now),
            finished_at: None,
        }
    }

    /// Create a running container from normalized run options
    pub fn from_options(id: ResourceId, name: &str, image: &str, options: RunOptions) -> Self {
        let mut container = Self::new(id, name, image, &options.network);
        container.ports = options.ports;
        container.env = options.env;
        container.volumes = options.volumes;
        container
    }

    /// Check if container is running
    pub fn is_running(&self) -> bool {
        self.status == ContainerStatus::Running
    }

    /// Check if container mounts a volume
    pub fn uses_volume(&self, volume: &str) -> bool {
        self.volumes.iter().any(|v| v == volume)
    }

    /// Move to the given status. Returns false if it was already there.
    pub fn set_status(&mut self, status: ContainerStatus) -> bool {
        if self.status == status {
            return false;
        }

        self.status = status;
        match status {
            ContainerStatus::Running => self.started_at = Some(Utc::now()),
            ContainerStatus::Stopped => self.finished_at = Some(Utc::now()),
        }
        true
    }
}

impl Entity for Container {
    fn id(&self) -> &ResourceId {
        &self.id
    }

    fn key(&self) -> String {
        self.name.clone()
    }
}

/// Containers indexed by id and by name
pub type ContainerStore = Table<Container>;

impl Table<Container> {
    /// Names of containers matching a predicate, in creation order
    pub fn names_where(&self, predicate: impl Fn(&Container) -> bool) -> Vec<String> {
        self.iter()
            .filter(|c| predicate(c))
            .map(|c| c.name.clone())
            .collect()
    }
}
