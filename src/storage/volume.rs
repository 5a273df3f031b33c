//! Volume records

use crate::ids::ResourceId;
use crate::store::{Entity, Table};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Size label of a freshly created volume
pub const EMPTY_VOLUME_SIZE: &str = "0 MB";

/// Volume driver types
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VolumeDriver {
    /// Local filesystem driver
    #[default]
    Local,
    /// NFS driver
    Nfs,
    /// Custom driver
    Custom(String),
}

impl std::fmt::Display for VolumeDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VolumeDriver::Local => write!(f, "local"),
            VolumeDriver::Nfs => write!(f, "nfs"),
            VolumeDriver::Custom(name) => write!(f, "{}", name),
        }
    }
}

/// Named volume
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Volume {
    /// Volume ID
    pub id: ResourceId,
    /// Volume name
    pub name: String,
    /// Volume driver
    pub driver: VolumeDriver,
    /// Human-readable size
    pub size: String,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

impl Volume {
    /// Create a new, empty local volume
    pub fn new(id: ResourceId, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            driver: VolumeDriver::Local,
            size: EMPTY_VOLUME_SIZE.to_string(),
            created_at: Utc::now(),
        }
    }

    /// Set driver
    pub fn driver(mut self, driver: VolumeDriver) -> Self {
        self.driver = driver;
        self
    }

    /// Set size label
    pub fn size(mut self, size: &str) -> Self {
        self.size = size.to_string();
        self
    }
}

impl Entity for Volume {
    fn id(&self) -> &ResourceId {
        &self.id
    }

    fn key(&self) -> String {
        self.name.clone()
    }
}

/// Volumes indexed by id and by name
pub type VolumeStore = Table<Volume>;
