//! Integrity checks run before each mutation
//!
//! Every function here is a pure predicate over the current graph: it either
//! accepts the proposed mutation or names the rule it would break. Nothing is
//! removed implicitly; dependents must be stopped or removed first.

use super::graph::ResourceGraph;
use crate::container::RunOptions;
use crate::error::{BerthError, ResourceKind, Result};
use crate::ids::ResourceId;
use crate::image::parse_reference;
use regex::Regex;
use std::sync::OnceLock;

fn object_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[a-zA-Z0-9][a-zA-Z0-9_.-]*$").expect("valid regex"))
}

/// `[registry-host[:port]/]component[/component...]`, each component
/// lowercase alphanumeric runs joined by `.`, `_`, `__` or dashes
fn image_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(concat!(
            r"^(?:[a-zA-Z0-9](?:[a-zA-Z0-9-]*[a-zA-Z0-9])?",
            r"(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]*[a-zA-Z0-9])?)*(?::[0-9]+)?/)?",
            r"[a-z0-9]+(?:(?:[._]|__|-+)[a-z0-9]+)*",
            r"(?:/[a-z0-9]+(?:(?:[._]|__|-+)[a-z0-9]+)*)*$",
        ))
        .expect("valid regex")
    })
}

fn tag_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9_][A-Za-z0-9_.-]{0,127}$").expect("valid regex")
    })
}

/// One published port: `[ip:][host:]container[/proto]`, ranges allowed
fn port_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(concat!(
            r"^(\d{1,3}(\.\d{1,3}){3}:)?(\d{1,5}(-\d{1,5})?:)?",
            r"\d{1,5}(-\d{1,5})?(/(tcp|udp|sctp))?$",
        ))
        .expect("valid regex")
    })
}

/// Container, volume and network names
pub fn validate_name(kind: ResourceKind, name: &str) -> Result<()> {
    if object_name_pattern().is_match(name) {
        Ok(())
    } else {
        Err(BerthError::InvalidArgument(format!(
            "invalid {} name {:?}: only [a-zA-Z0-9][a-zA-Z0-9_.-] are allowed",
            kind, name
        )))
    }
}

/// Published port specification (e.g., "8080:80", "127.0.0.1:53:53/udp").
/// Several mappings may be given separated by commas.
pub fn validate_ports(ports: &str) -> Result<()> {
    if ports.split(',').all(|spec| port_pattern().is_match(spec.trim())) {
        Ok(())
    } else {
        Err(BerthError::InvalidArgument(format!(
            "invalid port mapping {:?}",
            ports
        )))
    }
}

pub fn validate_add_image(graph: &ResourceGraph, name: &str, tag: &str) -> Result<()> {
    if !image_name_pattern().is_match(name) {
        return Err(BerthError::InvalidArgument(format!(
            "invalid image name {:?}",
            name
        )));
    }
    if !tag_pattern().is_match(tag) {
        return Err(BerthError::InvalidArgument(format!("invalid tag {:?}", tag)));
    }

    match graph.images.find_by_name(name, tag) {
        Some(existing) => Err(BerthError::duplicate(
            ResourceKind::Image,
            existing.reference(),
        )),
        None => Ok(()),
    }
}

pub fn validate_remove_image(graph: &ResourceGraph, id: &ResourceId) -> Result<()> {
    let image = graph
        .images
        .get(id)
        .ok_or_else(|| BerthError::not_found(ResourceKind::Image, id.as_str()))?;

    let reference = image.reference();
    let users = graph.containers.names_where(|c| c.image == reference);
    if users.is_empty() {
        Ok(())
    } else {
        Err(BerthError::InUse {
            kind: ResourceKind::Image,
            name: reference,
            users,
        })
    }
}

/// `options` must already be normalized and carry the final container name
pub fn validate_create_container(
    graph: &ResourceGraph,
    image_ref: &str,
    name: &str,
    options: &RunOptions,
) -> Result<()> {
    validate_name(ResourceKind::Container, name)?;
    if let Some(ports) = &options.ports {
        validate_ports(ports)?;
    }

    let (image_name, tag) = parse_reference(image_ref)?;
    if graph.images.find_by_name(&image_name, &tag).is_none() {
        return Err(BerthError::not_found(ResourceKind::Image, image_ref));
    }
    for volume in &options.volumes {
        if !graph.volumes.contains_key(volume) {
            return Err(BerthError::not_found(ResourceKind::Volume, volume));
        }
    }
    if !graph.networks.contains_key(&options.network) {
        return Err(BerthError::not_found(ResourceKind::Network, &options.network));
    }
    if graph.containers.contains_key(name) {
        return Err(BerthError::duplicate(ResourceKind::Container, name));
    }

    Ok(())
}

pub fn validate_remove_container(graph: &ResourceGraph, id: &ResourceId) -> Result<()> {
    let container = graph
        .containers
        .get(id)
        .ok_or_else(|| BerthError::not_found(ResourceKind::Container, id.as_str()))?;

    if container.is_running() {
        return Err(BerthError::ResourceBusy(container.name.clone()));
    }
    Ok(())
}

pub fn validate_add_volume(graph: &ResourceGraph, name: &str) -> Result<()> {
    validate_name(ResourceKind::Volume, name)?;
    if graph.volumes.contains_key(name) {
        return Err(BerthError::duplicate(ResourceKind::Volume, name));
    }
    Ok(())
}

pub fn validate_remove_volume(graph: &ResourceGraph, id: &ResourceId) -> Result<()> {
    let volume = graph
        .volumes
        .get(id)
        .ok_or_else(|| BerthError::not_found(ResourceKind::Volume, id.as_str()))?;

    let users = graph.containers.names_where(|c| c.uses_volume(&volume.name));
    if users.is_empty() {
        Ok(())
    } else {
        Err(BerthError::InUse {
            kind: ResourceKind::Volume,
            name: volume.name.clone(),
            users,
        })
    }
}

pub fn validate_add_network(graph: &ResourceGraph, name: &str) -> Result<()> {
    validate_name(ResourceKind::Network, name)?;
    if graph.networks.contains_key(name) {
        return Err(BerthError::duplicate(ResourceKind::Network, name));
    }
    Ok(())
}

pub fn validate_remove_network(graph: &ResourceGraph, id: &ResourceId) -> Result<()> {
    let network = graph
        .networks
        .get(id)
        .ok_or_else(|| BerthError::not_found(ResourceKind::Network, id.as_str()))?;

    if network.is_default {
        return Err(BerthError::Immutable(network.name.clone()));
    }
    if !network.members().is_empty() {
        return Err(BerthError::InUse {
            kind: ResourceKind::Network,
            name: network.name.clone(),
            users: graph.member_names(&network.name),
        });
    }
    Ok(())
}
