//! The resource graph: the four entity tables and the links between them

use crate::container::{Container, ContainerStore};
use crate::error::{BerthError, ResourceKind, Result};
use crate::ids::{IdGenerator, ResourceId};
use crate::image::ImageStore;
use crate::network::{is_default_network, NetworkStore, DEFAULT_NETWORKS};
use crate::storage::VolumeStore;
use crate::store::Entity;
use std::collections::HashSet;

/// Images, containers, volumes and networks, kept mutually consistent
#[derive(Debug, Clone)]
pub struct ResourceGraph {
    pub(crate) images: ImageStore,
    pub(crate) containers: ContainerStore,
    pub(crate) volumes: VolumeStore,
    pub(crate) networks: NetworkStore,
}

impl ResourceGraph {
    /// Empty graph holding only the default networks
    pub fn baseline(ids: &mut dyn IdGenerator) -> Self {
        Self {
            images: ImageStore::new(),
            containers: ContainerStore::new(),
            volumes: VolumeStore::new(),
            networks: NetworkStore::with_defaults(|| ids.next_id()),
        }
    }

    pub fn images(&self) -> &ImageStore {
        &self.images
    }

    pub fn containers(&self) -> &ContainerStore {
        &self.containers
    }

    pub fn volumes(&self) -> &VolumeStore {
        &self.volumes
    }

    pub fn networks(&self) -> &NetworkStore {
        &self.networks
    }

    /// Insert a container and attach it to its network in one step
    pub(crate) fn insert_container(&mut self, container: Container) -> Result<&Container> {
        let network = self
            .networks
            .find_mut(&container.network)
            .ok_or_else(|| BerthError::not_found(ResourceKind::Network, &container.network))?;
        network.attach(&container.id);

        Ok(self.containers.insert(container))
    }

    /// Remove a container and detach it from whichever network lists it
    pub(crate) fn remove_container(&mut self, id: &ResourceId) -> Option<Container> {
        let container = self.containers.remove(id)?;
        self.networks.detach_everywhere(id);
        Some(container)
    }

    /// Names of containers attached to a network, in attach order
    pub fn member_names(&self, network: &str) -> Vec<String> {
        self.networks
            .find(network)
            .map(|n| {
                n.members()
                    .iter()
                    .filter_map(|id| self.containers.get(id))
                    .map(|c| c.name.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Describe every broken integrity rule. Empty when the graph is consistent.
    pub fn violations(&self) -> Vec<String> {
        let mut problems = Vec::new();

        check_unique(self.images.iter(), "image", &mut problems);
        check_unique(self.volumes.iter(), "volume", &mut problems);
        check_unique(self.networks.iter(), "network", &mut problems);
        check_unique(self.containers.iter(), "container", &mut problems);

        for container in self.containers.iter() {
            if self.images.find(&container.image).is_none() {
                problems.push(format!(
                    "container {} references missing image {}",
                    container.name, container.image
                ));
            }
            for volume in &container.volumes {
                if !self.volumes.contains_key(volume) {
                    problems.push(format!(
                        "container {} references missing volume {}",
                        container.name, volume
                    ));
                }
            }
            match self.networks.find(&container.network) {
                None => problems.push(format!(
                    "container {} references missing network {}",
                    container.name, container.network
                )),
                Some(network) if !network.has_member(&container.id) => problems.push(format!(
                    "network {} does not list container {}",
                    network.name, container.name
                )),
                Some(_) => {}
            }
        }

        for network in self.networks.iter() {
            for member in network.members() {
                match self.containers.get(member) {
                    None => problems.push(format!(
                        "network {} lists unknown container {}",
                        network.name, member
                    )),
                    Some(c) if c.network != network.name => problems.push(format!(
                        "network {} lists container {} attached to {}",
                        network.name, c.name, c.network
                    )),
                    Some(_) => {}
                }
            }
        }

        for network in self.networks.iter() {
            if network.is_default != is_default_network(&network.name) {
                problems.push(format!(
                    "network {} is_default = {}",
                    network.name, network.is_default
                ));
            }
        }
        let defaults = self.networks.iter().filter(|n| n.is_default).count();
        if defaults != DEFAULT_NETWORKS.len() {
            problems.push(format!(
                "{} default networks, expected {}",
                defaults,
                DEFAULT_NETWORKS.len()
            ));
        }

        problems
    }
}

fn check_unique<'a, T: Entity + 'a>(
    entities: impl Iterator<Item = &'a T>,
    label: &str,
    problems: &mut Vec<String>,
) {
    let mut keys = HashSet::new();
    let mut ids = HashSet::new();
    for entity in entities {
        let key = entity.key();
        if !keys.insert(key.clone()) {
            problems.push(format!("duplicate {} {}", label, key));
        }
        if !ids.insert(entity.id().clone()) {
            problems.push(format!("duplicate {} id {}", label, entity.id()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::SequentialIds;
    use crate::image::Image;
    use crate::network::{Network, NetworkDriver};

    fn graph_with_web() -> (ResourceGraph, ResourceId) {
        let mut ids = SequentialIds::new();
        let mut graph = ResourceGraph::baseline(&mut ids);
        graph
            .images
            .insert(Image::new(ids.next_id(), "nginx", "latest"));
        let id = ids.next_id();
        graph
            .insert_container(Container::new(id.clone(), "web", "nginx:latest", "bridge"))
            .unwrap();
        (graph, id)
    }

    #[test]
    fn test_baseline_is_consistent() {
        let graph = ResourceGraph::baseline(&mut SequentialIds::new());
        assert_eq!(graph.networks().len(), 3);
        assert!(graph.images().is_empty());
        assert!(graph.violations().is_empty());
    }

    #[test]
    fn test_insert_and_remove_container_maintains_membership() {
        let (mut graph, id) = graph_with_web();
        assert_eq!(graph.member_names("bridge"), vec!["web"]);
        assert!(graph.violations().is_empty());

        graph.remove_container(&id).unwrap();
        assert!(graph.networks().find("bridge").unwrap().members().is_empty());
        assert!(graph.violations().is_empty());
    }

    #[test]
    fn test_insert_container_unknown_network() {
        let mut graph = ResourceGraph::baseline(&mut SequentialIds::new());
        let result = graph.insert_container(Container::new(
            ResourceId::from("c1"),
            "web",
            "nginx:latest",
            "missing",
        ));
        assert!(result.is_err());
        assert!(graph.containers().is_empty());
    }

    #[test]
    fn test_violations_detect_dangling_references() {
        let (mut graph, id) = graph_with_web();
        graph.images.clear();
        graph.networks.detach_everywhere(&id);

        let problems = graph.violations();
        assert_eq!(problems.len(), 2);
        assert!(problems[0].contains("missing image nginx:latest"));
        assert!(problems[1].contains("does not list container web"));
    }

    #[test]
    fn test_violations_detect_misflagged_networks() {
        let mut ids = SequentialIds::new();
        let mut graph = ResourceGraph::baseline(&mut ids);
        let app = ids.next_id();
        graph
            .networks
            .insert(Network::new(app.clone(), "app", NetworkDriver::Bridge));
        graph.networks.get_mut(&app).unwrap().is_default = true;

        let problems = graph.violations();
        assert_eq!(problems.len(), 2);
        assert_eq!(problems[0], "network app is_default = true");
        assert_eq!(problems[1], "4 default networks, expected 3");

        let host = graph.networks.find("host").unwrap().id.clone();
        graph.networks.remove(&host);
        graph.networks.get_mut(&app).unwrap().is_default = false;
        assert_eq!(graph.violations(), vec!["2 default networks, expected 3"]);
    }
}
