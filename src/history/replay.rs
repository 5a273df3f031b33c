//! Replaying command scripts against a registry
//!
//! A script is one canonical command per line, as found in the command log.
//! Blank lines and lines starting with `#` are skipped. Resource names are
//! resolved to ids through the registry's lookups before each call.

use super::command::Command;
use super::parse::parse_command;
use crate::container::RunOptions;
use crate::error::{BerthError, ResourceKind, Result};
use crate::ids::ResourceId;
use crate::registry::Registry;

/// Outcome of a replay
#[derive(Debug, Default)]
pub struct ReplayReport {
    /// Commands applied successfully
    pub applied: usize,
    /// Blank and comment lines
    pub skipped: usize,
    /// Rejected lines, only collected when continuing past errors
    pub failures: Vec<BerthError>,
}

impl ReplayReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Apply one command to the registry
pub fn execute(registry: &mut Registry, command: &Command) -> Result<()> {
    match command {
        Command::Pull { name, tag } => {
            registry.add_image(name, tag)?;
        }
        Command::RemoveImage { name, tag } => {
            let id = registry
                .find_image(name, tag)
                .map(|i| i.id.clone())
                .ok_or_else(|| {
                    BerthError::not_found(ResourceKind::Image, format!("{}:{}", name, tag))
                })?;
            registry.remove_image(&id)?;
        }
        Command::Run(run) => {
            let options = RunOptions {
                name: run.name.clone(),
                ports: run.ports.clone(),
                env: run.env.clone(),
                volumes: run.volumes.clone(),
                network: run.network.clone(),
            };
            registry.create_container(&run.image, options)?;
        }
        Command::Start { container } => {
            let id = container_id(registry, container)?;
            registry.start_container(&id)?;
        }
        Command::Stop { container } => {
            let id = container_id(registry, container)?;
            registry.stop_container(&id)?;
        }
        Command::Remove { container } => {
            let id = container_id(registry, container)?;
            registry.remove_container(&id)?;
        }
        Command::VolumeCreate { name } => {
            registry.add_volume(name)?;
        }
        Command::VolumeRemove { name } => {
            let id = registry
                .find_volume(name)
                .map(|v| v.id.clone())
                .ok_or_else(|| BerthError::not_found(ResourceKind::Volume, name))?;
            registry.remove_volume(&id)?;
        }
        Command::NetworkCreate { name, driver } => {
            registry.add_network(name, *driver)?;
        }
        Command::NetworkRemove { name } => {
            let id = registry
                .find_network(name)
                .map(|n| n.id.clone())
                .ok_or_else(|| BerthError::not_found(ResourceKind::Network, name))?;
            registry.remove_network(&id)?;
        }
    }
    Ok(())
}

fn container_id(registry: &Registry, name: &str) -> Result<ResourceId> {
    registry
        .find_container(name)
        .map(|c| c.id.clone())
        .ok_or_else(|| BerthError::not_found(ResourceKind::Container, name))
}

/// Run every command in `script`. Stops at the first rejected line unless
/// `keep_going` is set, in which case failures are collected in the report.
pub fn replay(registry: &mut Registry, script: &str, keep_going: bool) -> Result<ReplayReport> {
    let mut report = ReplayReport::default();

    for (index, line) in script.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            report.skipped += 1;
            continue;
        }

        match parse_command(line).and_then(|command| execute(registry, &command)) {
            Ok(()) => report.applied += 1,
            Err(err) => {
                let err = BerthError::Script {
                    line: index + 1,
                    message: err.to_string(),
                };
                if !keep_going {
                    return Err(err);
                }
                tracing::warn!("{}", err);
                report.failures.push(err);
            }
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::ids::SequentialIds;

    const SCRIPT: &str = "\
# web stack
docker pull nginx:latest
docker volume create site
docker network create --driver bridge front

docker run -d --name web -p 8080:80 --network front -v site:/data nginx:latest
docker stop web
";

    #[test]
    fn test_replay_script() {
        let mut registry = Registry::with_generator(SequentialIds::new());
        let report = replay(&mut registry, SCRIPT, false).unwrap();

        assert_eq!(report.applied, 5);
        assert_eq!(report.skipped, 2);
        let web = registry.find_container("web").unwrap();
        assert!(!web.is_running());
        assert_eq!(web.volumes, vec!["site"]);
        assert_eq!(registry.graph().member_names("front"), vec!["web"]);
    }

    #[test]
    fn test_replay_reproduces_log() {
        let mut first = Registry::with_generator(SequentialIds::new());
        replay(&mut first, SCRIPT, false).unwrap();
        let log = first.command_log().commands().join("\n");

        let mut second = Registry::with_generator(SequentialIds::new());
        replay(&mut second, &log, false).unwrap();
        assert_eq!(second.command_log().commands(), first.command_log().commands());
    }

    #[test]
    fn test_replay_stops_at_first_error() {
        let mut registry = Registry::with_generator(SequentialIds::new());
        let script = "docker pull alpine\ndocker rm ghost\ndocker volume create after";

        let err = replay(&mut registry, script, false).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Script);
        assert_eq!(err.to_string(), "Script error at line 2: container not found: ghost");
        assert!(registry.find_volume("after").is_none());
    }

    #[test]
    fn test_replay_keep_going() {
        let mut registry = Registry::with_generator(SequentialIds::new());
        let script = "docker pull alpine\ndocker network rm bridge\ndocker volume create after";

        let report = replay(&mut registry, script, true).unwrap();
        assert_eq!(report.applied, 2);
        assert_eq!(report.failures.len(), 1);
        assert!(registry.find_volume("after").is_some());
    }
}
