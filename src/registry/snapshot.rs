//! Read-only views of the registry

use super::graph::ResourceGraph;
use crate::container::{Container, ContainerStatus};
use crate::image::Image;
use crate::network::Network;
use crate::storage::Volume;
use serde::{Deserialize, Serialize};

/// Point-in-time copy of every resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub images: Vec<Image>,
    pub containers: Vec<Container>,
    pub volumes: Vec<Volume>,
    pub networks: Vec<Network>,
    /// Preset the graph was last loaded from
    pub active_scenario: Option<String>,
}

impl Snapshot {
    pub(crate) fn capture(graph: &ResourceGraph, active_scenario: Option<&str>) -> Self {
        Self {
            images: graph.images.to_vec(),
            containers: graph.containers.to_vec(),
            volumes: graph.volumes.to_vec(),
            networks: graph.networks.to_vec(),
            active_scenario: active_scenario.map(str::to_string),
        }
    }

    pub fn image(&self, reference: &str) -> Option<&Image> {
        self.images.iter().find(|i| i.reference() == reference)
    }

    pub fn container(&self, name: &str) -> Option<&Container> {
        self.containers.iter().find(|c| c.name == name)
    }

    pub fn volume(&self, name: &str) -> Option<&Volume> {
        self.volumes.iter().find(|v| v.name == name)
    }

    pub fn network(&self, name: &str) -> Option<&Network> {
        self.networks.iter().find(|n| n.name == name)
    }

    /// User-created networks only
    pub fn custom_networks(&self) -> impl Iterator<Item = &Network> {
        self.networks.iter().filter(|n| !n.is_default)
    }

    pub fn stats(&self) -> Stats {
        Stats::tally(
            self.images.len(),
            &self.containers,
            self.volumes.len(),
            self.networks.len(),
        )
    }
}

/// Resource counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub images: usize,
    pub containers_running: usize,
    pub containers_stopped: usize,
    pub volumes: usize,
    pub networks: usize,
}

impl Stats {
    pub(crate) fn of(graph: &ResourceGraph) -> Self {
        Self::tally(
            graph.images.len(),
            graph.containers.iter(),
            graph.volumes.len(),
            graph.networks.len(),
        )
    }

    fn tally<'a>(
        images: usize,
        containers: impl IntoIterator<Item = &'a Container>,
        volumes: usize,
        networks: usize,
    ) -> Self {
        let (running, stopped) = containers
            .into_iter()
            .fold((0, 0), |(running, stopped), c| match c.status {
                ContainerStatus::Running => (running + 1, stopped),
                ContainerStatus::Stopped => (running, stopped + 1),
            });
        Self {
            images,
            containers_running: running,
            containers_stopped: stopped,
            volumes,
            networks,
        }
    }
}

impl std::fmt::Display for Stats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Images: {} | Running: {} | Stopped: {} | Volumes: {} | Networks: {}",
            self.images,
            self.containers_running,
            self.containers_stopped,
            self.volumes,
            self.networks
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{IdGenerator, SequentialIds};

    #[test]
    fn test_snapshot_and_graph_counts_agree() {
        let mut ids = SequentialIds::new();
        let mut graph = ResourceGraph::baseline(&mut ids);
        graph
            .images
            .insert(Image::new(ids.next_id(), "nginx", "latest"));
        for name in ["web", "worker"] {
            graph
                .insert_container(Container::new(ids.next_id(), name, "nginx:latest", "bridge"))
                .unwrap();
        }
        let worker = graph.containers.find("worker").unwrap().id.clone();
        graph
            .containers
            .get_mut(&worker)
            .unwrap()
            .set_status(ContainerStatus::Stopped);

        let stats = Stats::of(&graph);
        assert_eq!(stats.containers_running, 1);
        assert_eq!(stats.containers_stopped, 1);
        assert_eq!(stats.networks, 3);
        assert_eq!(Snapshot::capture(&graph, None).stats(), stats);
    }
}
