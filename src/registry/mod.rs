//! Resource registry
//!
//! The registry owns the resource graph, the command log and the id
//! generator. Every mutation follows the same path: the matching check in
//! [`constraints`] runs against the current graph, and only if it passes are
//! the tables and network membership updated together and the canonical
//! command recorded. A rejected mutation leaves everything untouched.

pub mod constraints;
pub mod graph;
pub mod snapshot;

pub use graph::ResourceGraph;
pub use snapshot::{Snapshot, Stats};

use crate::config::BerthConfig;
use crate::container::{Container, ContainerStatus, RunOptions};
use crate::error::{BerthError, ResourceKind, Result};
use crate::history::{Command, CommandLog, RunCommand};
use crate::ids::{IdGenerator, RandomIds, ResourceId};
use crate::image::store::UNKNOWN_SIZE;
use crate::image::{catalog, format_reference, parse_reference, Image};
use crate::network::{Network, NetworkDriver};
use crate::scenario::{instantiate, Scenario, ScenarioCatalog};
use crate::storage::Volume;

/// Log a rejected mutation on its way back to the caller
fn rejected(action: &'static str) -> impl Fn(BerthError) -> BerthError {
    move |err| {
        tracing::warn!("Rejected {}: {}", action, err);
        err
    }
}

/// In-memory container engine state
pub struct Registry {
    graph: ResourceGraph,
    history: CommandLog,
    ids: Box<dyn IdGenerator>,
    scenarios: ScenarioCatalog,
    active_scenario: Option<String>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("graph", &self.graph)
            .field("history", &self.history)
            .field("active_scenario", &self.active_scenario)
            .finish_non_exhaustive()
    }
}

impl Registry {
    /// Create a registry with random ids and the built-in scenarios
    pub fn new() -> Self {
        Self::from_generator(Box::new(RandomIds))
    }

    /// Create a registry drawing ids and name suffixes from `ids`
    pub fn with_generator(ids: impl IdGenerator + 'static) -> Self {
        Self::from_generator(Box::new(ids))
    }

    fn from_generator(mut ids: Box<dyn IdGenerator>) -> Self {
        let graph = ResourceGraph::baseline(ids.as_mut());
        Self {
            graph,
            history: CommandLog::default(),
            ids,
            scenarios: ScenarioCatalog::builtin(),
            active_scenario: None,
        }
    }

    /// Replace the command log with an empty one of the given bound
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history = CommandLog::new(limit);
        self
    }

    /// Build a registry as described by a configuration: id strategy,
    /// history bound, extra scenario files and the scenario to start from
    pub fn from_config(config: &BerthConfig) -> Result<Self> {
        config.validate()?;

        let mut registry = Self::from_generator(config.id_strategy.generator())
            .with_history_limit(config.history_limit);
        for path in &config.scenario_files {
            let scenario = registry.scenarios.load_file(path)?;
            tracing::info!("Loaded scenario {} from {}", scenario.id, path.display());
        }
        if let Some(id) = &config.initial_scenario {
            registry.load_scenario(id)?;
        }

        Ok(registry)
    }

    fn accept(&mut self, command: Command) {
        let line = command.to_string();
        tracing::info!("{}", line);
        self.history.record(line);

        debug_assert!(
            self.graph.violations().is_empty(),
            "integrity violated: {:?}",
            self.graph.violations()
        );
    }

    // Images

    /// Pull an image. Size and layer count come from the catalog when the
    /// image is listed there.
    pub fn add_image(&mut self, name: &str, tag: &str) -> Result<Image> {
        constraints::validate_add_image(&self.graph, name, tag).map_err(rejected("pull"))?;

        let known = catalog::lookup(name, tag);
        let image = Image::new(self.ids.next_id(), name, tag)
            .size(known.map_or(UNKNOWN_SIZE, |c| c.size))
            .layers(known.map_or(1, |c| c.layers));
        let image = self.graph.images.insert(image).clone();

        self.accept(Command::Pull {
            name: image.name.clone(),
            tag: image.tag.clone(),
        });
        Ok(image)
    }

    /// Pull an image by reference (`name[:tag]`)
    pub fn pull(&mut self, reference: &str) -> Result<Image> {
        let (name, tag) = parse_reference(reference).map_err(rejected("pull"))?;
        self.add_image(&name, &tag)
    }

    pub fn remove_image(&mut self, id: &ResourceId) -> Result<()> {
        constraints::validate_remove_image(&self.graph, id).map_err(rejected("rmi"))?;

        let image = self
            .graph
            .images
            .remove(id)
            .ok_or_else(|| BerthError::not_found(ResourceKind::Image, id.as_str()))?;
        self.accept(Command::RemoveImage {
            name: image.name,
            tag: image.tag,
        });
        Ok(())
    }

    // Containers

    /// Run a container from a present image. Without a name, one is
    /// generated as `<image>-<suffix>`.
    pub fn create_container(&mut self, image_ref: &str, options: RunOptions) -> Result<Container> {
        let options = options.normalized();
        let (image_name, tag) = parse_reference(image_ref).map_err(rejected("run"))?;
        let name = match &options.name {
            Some(name) => name.clone(),
            None => self.generate_name(&image_name),
        };

        constraints::validate_create_container(&self.graph, image_ref, &name, &options)
            .map_err(rejected("run"))?;

        let container = Container::from_options(
            self.ids.next_id(),
            &name,
            &format_reference(&image_name, &tag),
            options,
        );
        let container = self.graph.insert_container(container)?.clone();

        self.accept(Command::Run(RunCommand {
            name: Some(container.name.clone()),
            ports: container.ports.clone(),
            network: container.network.clone(),
            env: container.env.clone(),
            volumes: container.volumes.clone(),
            image: container.image.clone(),
        }));
        Ok(container)
    }

    fn generate_name(&mut self, image_name: &str) -> String {
        let base = image_name.rsplit('/').next().unwrap_or(image_name);
        loop {
            let candidate = format!("{}-{}", base, self.ids.name_suffix());
            if !self.graph.containers.contains_key(&candidate) {
                return candidate;
            }
        }
    }

    /// Flip a container between running and stopped
    pub fn toggle_container(&mut self, id: &ResourceId) -> Result<Container> {
        let status = self
            .graph
            .containers
            .get(id)
            .map(|c| c.status.toggled())
            .ok_or_else(|| BerthError::not_found(ResourceKind::Container, id.as_str()))
            .map_err(rejected("toggle"))?;
        self.set_container_status(id, status)
    }

    /// Start a container. Starting a running container changes nothing.
    pub fn start_container(&mut self, id: &ResourceId) -> Result<Container> {
        self.set_container_status(id, ContainerStatus::Running)
    }

    /// Stop a container. Stopping a stopped container changes nothing.
    pub fn stop_container(&mut self, id: &ResourceId) -> Result<Container> {
        self.set_container_status(id, ContainerStatus::Stopped)
    }

    fn set_container_status(
        &mut self,
        id: &ResourceId,
        status: ContainerStatus,
    ) -> Result<Container> {
        let container = self
            .graph
            .containers
            .get_mut(id)
            .ok_or_else(|| BerthError::not_found(ResourceKind::Container, id.as_str()))
            .map_err(rejected("status change"))?;

        if !container.set_status(status) {
            tracing::debug!("Container {} already {}", container.name, status);
            return Ok(container.clone());
        }
        let container = container.clone();

        let name = container.name.clone();
        self.accept(match status {
            ContainerStatus::Running => Command::Start { container: name },
            ContainerStatus::Stopped => Command::Stop { container: name },
        });
        Ok(container)
    }

    /// Remove a stopped container and drop it from its network
    pub fn remove_container(&mut self, id: &ResourceId) -> Result<()> {
        constraints::validate_remove_container(&self.graph, id).map_err(rejected("rm"))?;

        let container = self
            .graph
            .remove_container(id)
            .ok_or_else(|| BerthError::not_found(ResourceKind::Container, id.as_str()))?;
        self.accept(Command::Remove {
            container: container.name,
        });
        Ok(())
    }

    // Volumes

    pub fn add_volume(&mut self, name: &str) -> Result<Volume> {
        constraints::validate_add_volume(&self.graph, name).map_err(rejected("volume create"))?;

        let volume = Volume::new(self.ids.next_id(), name);
        let volume = self.graph.volumes.insert(volume).clone();
        self.accept(Command::VolumeCreate {
            name: volume.name.clone(),
        });
        Ok(volume)
    }

    pub fn remove_volume(&mut self, id: &ResourceId) -> Result<()> {
        constraints::validate_remove_volume(&self.graph, id).map_err(rejected("volume rm"))?;

        let volume = self
            .graph
            .volumes
            .remove(id)
            .ok_or_else(|| BerthError::not_found(ResourceKind::Volume, id.as_str()))?;
        self.accept(Command::VolumeRemove { name: volume.name });
        Ok(())
    }

    // Networks

    pub fn add_network(&mut self, name: &str, driver: NetworkDriver) -> Result<Network> {
        constraints::validate_add_network(&self.graph, name)
            .map_err(rejected("network create"))?;

        let network = Network::new(self.ids.next_id(), name, driver);
        let network = self.graph.networks.insert(network).clone();
        self.accept(Command::NetworkCreate {
            name: network.name.clone(),
            driver,
        });
        Ok(network)
    }

    /// Remove a user network with no attached containers
    pub fn remove_network(&mut self, id: &ResourceId) -> Result<()> {
        constraints::validate_remove_network(&self.graph, id)
            .map_err(rejected("network rm"))?;

        let network = self
            .graph
            .networks
            .remove(id)
            .ok_or_else(|| BerthError::not_found(ResourceKind::Network, id.as_str()))?;
        self.accept(Command::NetworkRemove { name: network.name });
        Ok(())
    }

    // Scenarios

    /// Replace the whole graph with a registered scenario
    pub fn load_scenario(&mut self, id: &str) -> Result<Snapshot> {
        let scenario = self
            .scenarios
            .get(id)
            .cloned()
            .ok_or_else(|| BerthError::not_found(ResourceKind::Scenario, id))
            .map_err(rejected("scenario load"))?;
        self.apply_scenario(&scenario)
    }

    /// Replace the whole graph with `scenario`, registered or not. On error
    /// the current graph is kept.
    pub fn apply_scenario(&mut self, scenario: &Scenario) -> Result<Snapshot> {
        let graph = instantiate(scenario, self.ids.as_mut()).map_err(rejected("scenario load"))?;

        self.graph = graph;
        self.active_scenario = Some(scenario.id.clone());
        debug_assert!(self.graph.violations().is_empty());

        tracing::info!(
            "Loaded scenario {}: {}",
            scenario.id,
            Stats::of(&self.graph)
        );
        Ok(self.snapshot())
    }

    /// Back to the three default networks and nothing else
    pub fn reset_all(&mut self) -> Snapshot {
        self.graph = ResourceGraph::baseline(self.ids.as_mut());
        self.active_scenario = None;

        tracing::info!("Registry reset");
        self.snapshot()
    }

    /// Id of the last loaded scenario, cleared by a reset
    pub fn active_scenario(&self) -> Option<&str> {
        self.active_scenario.as_deref()
    }

    pub fn scenarios(&self) -> &ScenarioCatalog {
        &self.scenarios
    }

    /// Make a scenario available to `load_scenario`
    pub fn register_scenario(&mut self, scenario: Scenario) -> Result<()> {
        self.scenarios.register(scenario)
    }

    // Queries

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.graph, self.active_scenario.as_deref())
    }

    pub fn stats(&self) -> Stats {
        Stats::of(&self.graph)
    }

    pub fn graph(&self) -> &ResourceGraph {
        &self.graph
    }

    pub fn command_log(&self) -> &CommandLog {
        &self.history
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    pub fn find_image(&self, name: &str, tag: &str) -> Option<&Image> {
        self.graph.images.find_by_name(name, tag)
    }

    /// Look up an image by reference; a missing tag means `latest`
    pub fn find_image_ref(&self, reference: &str) -> Option<&Image> {
        self.graph.images.find_reference(reference)
    }

    pub fn find_container(&self, name: &str) -> Option<&Container> {
        self.graph.containers.find(name)
    }

    pub fn find_volume(&self, name: &str) -> Option<&Volume> {
        self.graph.volumes.find(name)
    }

    pub fn find_network(&self, name: &str) -> Option<&Network> {
        self.graph.networks.find(name)
    }

    pub fn image(&self, id: &ResourceId) -> Option<&Image> {
        self.graph.images.get(id)
    }

    pub fn container(&self, id: &ResourceId) -> Option<&Container> {
        self.graph.containers.get(id)
    }

    pub fn volume(&self, id: &ResourceId) -> Option<&Volume> {
        self.graph.volumes.get(id)
    }

    pub fn network(&self, id: &ResourceId) -> Option<&Network> {
        self.graph.networks.get(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::ids::SequentialIds;

    fn registry() -> Registry {
        Registry::with_generator(SequentialIds::new())
    }

    #[test]
    fn test_add_image_uses_catalog() {
        let mut registry = registry();
        let nginx = registry.add_image("nginx", "latest").unwrap();
        assert_eq!(nginx.size, "142 MB");
        assert_eq!(nginx.layers, 7);

        let custom = registry.add_image("acme/tool", "2.0").unwrap();
        assert_eq!(custom.size, "0 MB");
        assert_eq!(custom.layers, 1);

        assert_eq!(
            registry.command_log().commands(),
            vec!["docker pull nginx:latest", "docker pull acme/tool:2.0"]
        );
    }

    #[test]
    fn test_generated_container_name() {
        let mut registry = registry();
        registry.pull("redis:alpine").unwrap();

        let container = registry
            .create_container("redis:alpine", RunOptions::for_image("redis"))
            .unwrap();
        assert_eq!(container.name, "redis-0001");
        assert_eq!(
            registry.command_log().last().unwrap().command,
            "docker run -d --name redis-0001 -p 6379:6379 redis:alpine"
        );
    }

    #[test]
    fn test_generated_name_skips_taken() {
        let mut registry = registry();
        registry.pull("alpine").unwrap();
        registry
            .create_container("alpine", RunOptions::new().name("alpine-0001"))
            .unwrap();

        let container = registry.create_container("alpine", RunOptions::new()).unwrap();
        assert_eq!(container.name, "alpine-0002");
    }

    #[test]
    fn test_rejected_mutation_is_not_logged() {
        let mut registry = registry();
        let err = registry
            .create_container("nginx:latest", RunOptions::new())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(registry.command_log().is_empty());
        assert!(registry.graph().containers().is_empty());
    }

    #[test]
    fn test_start_stop_idempotent() {
        let mut registry = registry();
        registry.pull("nginx").unwrap();
        let web = registry
            .create_container("nginx", RunOptions::new().name("web"))
            .unwrap();

        registry.start_container(&web.id).unwrap();
        assert_eq!(registry.command_log().len(), 2);

        let stopped = registry.stop_container(&web.id).unwrap();
        assert_eq!(stopped.status, ContainerStatus::Stopped);
        registry.stop_container(&web.id).unwrap();
        assert_eq!(
            registry.command_log().commands()[1..],
            ["docker run -d --name web nginx:latest", "docker stop web"]
        );
    }

    #[test]
    fn test_failed_scenario_keeps_graph() {
        let mut registry = registry();
        registry.load_scenario("hello-world").unwrap();

        let mut broken = crate::scenario::presets::web_db();
        broken.volumes.clear();
        let err = registry.apply_scenario(&broken).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(registry.active_scenario(), Some("hello-world"));
        assert!(registry.find_container("hello-nginx").is_some());
    }

    #[test]
    fn test_scenario_load_skips_history() {
        let mut registry = registry();
        registry.add_volume("scratch").unwrap();
        registry.load_scenario("full-stack").unwrap();

        assert_eq!(registry.command_log().commands(), vec!["docker volume create scratch"]);
        assert!(registry.find_volume("scratch").is_none());

        let err = registry.load_scenario("nope").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_from_config() {
        let config = BerthConfig {
            history_limit: 2,
            id_strategy: crate::ids::IdStrategy::Sequential,
            initial_scenario: Some("web-db".to_string()),
            ..BerthConfig::default()
        };
        let mut registry = Registry::from_config(&config).unwrap();
        assert_eq!(registry.active_scenario(), Some("web-db"));

        for name in ["a", "b", "c"] {
            registry.add_volume(name).unwrap();
        }
        assert_eq!(registry.command_log().len(), 2);
    }
}
