//! Canonical command strings
//!
//! Every accepted mutation is described by the `docker` command that would
//! have produced it. The rendering is a pure function of the mutation's final
//! arguments.

use crate::container::EnvVar;
use crate::network::{NetworkDriver, DEFAULT_NETWORK};

/// Mount point used for every named volume
pub const VOLUME_MOUNT_PATH: &str = "/data";

/// A `docker run` invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunCommand {
    /// Container name; `None` only for parsed commands without `--name`
    pub name: Option<String>,
    pub ports: Option<String>,
    pub network: String,
    pub env: Vec<EnvVar>,
    pub volumes: Vec<String>,
    /// Image reference (`name:tag`)
    pub image: String,
}

/// A mutation expressed as a `docker` command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Pull { name: String, tag: String },
    RemoveImage { name: String, tag: String },
    Run(RunCommand),
    Start { container: String },
    Stop { container: String },
    Remove { container: String },
    VolumeCreate { name: String },
    VolumeRemove { name: String },
    NetworkCreate { name: String, driver: NetworkDriver },
    NetworkRemove { name: String },
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::Pull { name, tag } => write!(f, "docker pull {}:{}", name, tag),
            Command::RemoveImage { name, tag } => write!(f, "docker rmi {}:{}", name, tag),
            Command::Run(run) => write!(f, "{}", run),
            Command::Start { container } => write!(f, "docker start {}", container),
            Command::Stop { container } => write!(f, "docker stop {}", container),
            Command::Remove { container } => write!(f, "docker rm {}", container),
            Command::VolumeCreate { name } => write!(f, "docker volume create {}", name),
            Command::VolumeRemove { name } => write!(f, "docker volume rm {}", name),
            Command::NetworkCreate { name, driver } => {
                write!(f, "docker network create --driver {} {}", driver, name)
            }
            Command::NetworkRemove { name } => write!(f, "docker network rm {}", name),
        }
    }
}

impl std::fmt::Display for RunCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "docker run -d")?;
        if let Some(name) = &self.name {
            write!(f, " --name {}", name)?;
        }
        if let Some(ports) = &self.ports {
            write!(f, " -p {}", ports)?;
        }
        if self.network != DEFAULT_NETWORK {
            write!(f, " --network {}", self.network)?;
        }
        for var in &self.env {
            write!(f, " -e {}", var)?;
        }
        for volume in &self.volumes {
            write!(f, " -v {}:{}", volume, VOLUME_MOUNT_PATH)?;
        }
        write!(f, " {}", self.image)
    }
}
