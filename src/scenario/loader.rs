//! Building a resource graph from a scenario

use super::Scenario;
use crate::container::Container;
use crate::error::Result;
use crate::ids::IdGenerator;
use crate::image::{catalog, format_reference, parse_reference, Image};
use crate::network::Network;
use crate::registry::constraints;
use crate::registry::ResourceGraph;
use crate::storage::volume::EMPTY_VOLUME_SIZE;
use crate::storage::Volume;

/// Build a fresh graph for a scenario: default networks, then images,
/// volumes, networks and containers, each with a new id.
///
/// The graph is assembled off to the side, so a failing scenario leaves
/// nothing half-applied.
pub fn instantiate(scenario: &Scenario, ids: &mut dyn IdGenerator) -> Result<ResourceGraph> {
    let mut graph = ResourceGraph::baseline(ids);

    for spec in &scenario.images {
        constraints::validate_add_image(&graph, &spec.name, &spec.tag)?;

        let known = catalog::lookup(&spec.name, &spec.tag);
        let mut image = Image::new(ids.next_id(), &spec.name, &spec.tag);
        if let Some(size) = spec.size.as_deref().or(known.map(|c| c.size)) {
            image = image.size(size);
        }
        if let Some(layers) = spec.layers.or(known.map(|c| c.layers)) {
            image = image.layers(layers);
        }
        graph.images.insert(image);
    }

    for spec in &scenario.volumes {
        constraints::validate_add_volume(&graph, &spec.name)?;
        graph.volumes.insert(
            Volume::new(ids.next_id(), &spec.name)
                .driver(spec.driver.clone())
                .size(spec.size.as_deref().unwrap_or(EMPTY_VOLUME_SIZE)),
        );
    }

    for spec in &scenario.networks {
        constraints::validate_add_network(&graph, &spec.name)?;
        graph
            .networks
            .insert(Network::new(ids.next_id(), &spec.name, spec.driver));
    }

    for spec in &scenario.containers {
        let options = spec.run_options().normalized();
        constraints::validate_create_container(&graph, &spec.image, &spec.name, &options)?;

        let (image_name, tag) = parse_reference(&spec.image)?;
        let mut container = Container::from_options(
            ids.next_id(),
            &spec.name,
            &format_reference(&image_name, &tag),
            options,
        );
        container.status = spec.status;
        graph.insert_container(container)?;
    }

    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::ContainerStatus;
    use crate::error::ErrorKind;
    use crate::ids::SequentialIds;
    use crate::scenario::{ContainerSpec, ImageSpec, NetworkSpec};

    fn scenario() -> Scenario {
        Scenario {
            id: "pair".to_string(),
            name: "Pair".to_string(),
            description: String::new(),
            difficulty: Default::default(),
            images: vec![ImageSpec {
                name: "alpine".to_string(),
                tag: "latest".to_string(),
                size: None,
                layers: None,
            }],
            containers: vec![
                ContainerSpec {
                    name: "one".to_string(),
                    image: "alpine:latest".to_string(),
                    status: ContainerStatus::Stopped,
                    ports: None,
                    network: "lan".to_string(),
                    env: Vec::new(),
                    volumes: Vec::new(),
                },
                ContainerSpec {
                    name: "two".to_string(),
                    image: "alpine".to_string(),
                    status: ContainerStatus::Running,
                    ports: None,
                    network: "lan".to_string(),
                    env: Vec::new(),
                    volumes: Vec::new(),
                },
            ],
            volumes: Vec::new(),
            networks: vec![NetworkSpec {
                name: "lan".to_string(),
                driver: Default::default(),
            }],
        }
    }

    #[test]
    fn test_instantiate_assigns_fresh_ids_in_order() {
        let graph = instantiate(&scenario(), &mut SequentialIds::new()).unwrap();

        // three default networks, then image, network, two containers
        let image = graph.images().find("alpine:latest").unwrap();
        assert_eq!(image.id.as_str(), "000000000004");
        assert_eq!(image.size, "7 MB");
        let lan = graph.networks().find("lan").unwrap();
        assert_eq!(lan.id.as_str(), "000000000005");

        let members: Vec<&str> = lan.members().iter().map(|id| id.as_str()).collect();
        assert_eq!(members, vec!["000000000006", "000000000007"]);
        assert!(graph.violations().is_empty());
    }

    #[test]
    fn test_instantiate_keeps_status_and_normalizes_reference() {
        let graph = instantiate(&scenario(), &mut SequentialIds::new()).unwrap();
        let one = graph.containers().find("one").unwrap();
        assert_eq!(one.status, ContainerStatus::Stopped);
        let two = graph.containers().find("two").unwrap();
        assert_eq!(two.image, "alpine:latest");
    }

    #[test]
    fn test_instantiate_rejects_shadowing_default_network() {
        let mut bad = scenario();
        bad.networks[0].name = "bridge".to_string();

        let err = instantiate(&bad, &mut SequentialIds::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Duplicate);
    }
}
