//! Network records and membership

use crate::error::{BerthError, Result};
use crate::ids::ResourceId;
use crate::store::{Entity, Table};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Network containers join when none is given
pub const DEFAULT_NETWORK: &str = "bridge";

/// The networks every engine starts with, and their drivers
pub const DEFAULT_NETWORKS: [(&str, NetworkDriver); 3] = [
    ("bridge", NetworkDriver::Bridge),
    ("host", NetworkDriver::Host),
    ("none", NetworkDriver::Null),
];

/// Check whether a name belongs to a default network
pub fn is_default_network(name: &str) -> bool {
    DEFAULT_NETWORKS.iter().any(|(n, _)| *n == name)
}

/// Network driver types
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkDriver {
    /// Bridge network (default)
    #[default]
    Bridge,
    /// Host network
    Host,
    /// No networking
    Null,
    /// Multi-host overlay network
    Overlay,
    /// Macvlan network
    Macvlan,
    /// IPvlan network
    Ipvlan,
}

impl std::fmt::Display for NetworkDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NetworkDriver::Bridge => write!(f, "bridge"),
            NetworkDriver::Host => write!(f, "host"),
            NetworkDriver::Null => write!(f, "null"),
            NetworkDriver::Overlay => write!(f, "overlay"),
            NetworkDriver::Macvlan => write!(f, "macvlan"),
            NetworkDriver::Ipvlan => write!(f, "ipvlan"),
        }
    }
}

impl std::str::FromStr for NetworkDriver {
    type Err = BerthError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "bridge" => Ok(NetworkDriver::Bridge),
            "host" => Ok(NetworkDriver::Host),
            "null" | "none" => Ok(NetworkDriver::Null),
            "overlay" => Ok(NetworkDriver::Overlay),
            "macvlan" => Ok(NetworkDriver::Macvlan),
            "ipvlan" => Ok(NetworkDriver::Ipvlan),
            other => Err(BerthError::InvalidArgument(format!(
                "unknown network driver: {}",
                other
            ))),
        }
    }
}

/// Network
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Network {
    /// Network ID
    pub id: ResourceId,
    /// Network name
    pub name: String,
    /// Network driver
    pub driver: NetworkDriver,
    /// Built-in network that cannot be removed
    pub is_default: bool,
    /// Attached container IDs, in attach order
    members: Vec<ResourceId>,
    /// Created timestamp
    pub created: DateTime<Utc>,
}

impl Network {
    /// Create a new user-defined network with no members
    pub fn new(id: ResourceId, name: &str, driver: NetworkDriver) -> Self {
        Self {
            id,
            name: name.to_string(),
            driver,
            is_default: false,
            members: Vec::new(),
            created: Utc::now(),
        }
    }

    /// Create one of the built-in networks
    pub fn builtin(id: ResourceId, name: &str, driver: NetworkDriver) -> Self {
        Self {
            is_default: true,
            ..Self::new(id, name, driver)
        }
    }

    /// Attached container IDs
    pub fn members(&self) -> &[ResourceId] {
        &self.members
    }

    /// Check whether a container is attached
    pub fn has_member(&self, container_id: &ResourceId) -> bool {
        self.members.contains(container_id)
    }

    /// Attach a container; attaching twice is a no-op
    pub(crate) fn attach(&mut self, container_id: &ResourceId) {
        if !self.has_member(container_id) {
            self.members.push(container_id.clone());
        }
    }

    /// Detach a container. Returns false if it was not attached.
    pub(crate) fn detach(&mut self, container_id: &ResourceId) -> bool {
        let before = self.members.len();
        self.members.retain(|id| id != container_id);
        self.members.len() != before
    }
}

impl Entity for Network {
    fn id(&self) -> &ResourceId {
        &self.id
    }

    fn key(&self) -> String {
        self.name.clone()
    }
}

/// Networks indexed by id and by name
pub type NetworkStore = Table<Network>;

impl Table<Network> {
    /// Create the three default networks with fresh ids
    pub fn with_defaults(mut next_id: impl FnMut() -> ResourceId) -> Self {
        let mut store = Self::new();
        for (name, driver) in DEFAULT_NETWORKS {
            store.insert(Network::builtin(next_id(), name, driver));
        }
        store
    }

    /// Detach a container from every network listing it
    pub(crate) fn detach_everywhere(&mut self, container_id: &ResourceId) -> usize {
        self.values_mut()
            .map(|network| network.detach(container_id))
            .filter(|detached| *detached)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counter() -> impl FnMut() -> ResourceId {
        let mut n = 0;
        move || {
            n += 1;
            ResourceId::from_string(format!("n{}", n))
        }
    }

    #[test]
    fn test_default_networks() {
        let store = NetworkStore::with_defaults(counter());
        assert_eq!(store.len(), 3);

        let none = store.find("none").unwrap();
        assert_eq!(none.driver, NetworkDriver::Null);
        assert!(none.is_default);
        assert!(none.members().is_empty());
        assert!(is_default_network("host"));
        assert!(!is_default_network("app-network"));
    }

    #[test]
    fn test_membership() {
        let mut network = Network::new(ResourceId::from("n1"), "app", NetworkDriver::Bridge);
        let c1 = ResourceId::from("c1");
        let c2 = ResourceId::from("c2");

        network.attach(&c1);
        network.attach(&c2);
        network.attach(&c1);
        assert_eq!(network.members(), &[c1.clone(), c2.clone()]);

        assert!(network.detach(&c1));
        assert!(!network.detach(&c1));
        assert_eq!(network.members(), &[c2]);
    }

    #[test]
    fn test_detach_everywhere() {
        let mut store = NetworkStore::with_defaults(counter());
        let c1 = ResourceId::from("c1");
        store.find_mut("bridge").unwrap().attach(&c1);

        assert_eq!(store.detach_everywhere(&c1), 1);
        assert!(store.find("bridge").unwrap().members().is_empty());
    }

    #[test]
    fn test_driver_parse() {
        assert_eq!("overlay".parse::<NetworkDriver>().unwrap(), NetworkDriver::Overlay);
        assert_eq!("none".parse::<NetworkDriver>().unwrap(), NetworkDriver::Null);
        assert!("weave".parse::<NetworkDriver>().is_err());
        assert_eq!(NetworkDriver::Null.to_string(), "null");
    }
}
