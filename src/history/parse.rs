//! Parsing canonical command strings back into [`Command`] values
//!
//! Accepts the same grammar the command log produces. Arguments are split on
//! whitespace; quoting is not supported.

use super::command::{Command, RunCommand};
use crate::container::EnvVar;
use crate::error::{BerthError, Result};
use crate::image::parse_reference;
use crate::network::DEFAULT_NETWORK;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "docker",
    disable_help_flag = true,
    disable_help_subcommand = true,
    disable_version_flag = true
)]
struct DockerLine {
    #[command(subcommand)]
    command: DockerCommand,
}

#[derive(Subcommand, Debug)]
enum DockerCommand {
    /// Pull an image
    Pull { image: String },
    /// Remove an image
    Rmi { image: String },
    /// Run a container
    Run {
        /// Run in detached mode
        #[arg(short, long)]
        detach: bool,
        /// Container name
        #[arg(long)]
        name: Option<String>,
        /// Port mapping (host:container)
        #[arg(short, long)]
        publish: Option<String>,
        /// Network to connect to
        #[arg(long)]
        network: Option<String>,
        /// Environment variable
        #[arg(short, long)]
        env: Vec<String>,
        /// Volume mount
        #[arg(short, long)]
        volume: Vec<String>,
        /// Image to run
        image: String,
    },
    /// Start a container
    Start { container: String },
    /// Stop a container
    Stop { container: String },
    /// Remove a container
    Rm { container: String },
    /// Manage volumes
    Volume {
        #[command(subcommand)]
        command: VolumeCommand,
    },
    /// Manage networks
    Network {
        #[command(subcommand)]
        command: NetworkCommand,
    },
}

#[derive(Subcommand, Debug)]
enum VolumeCommand {
    Create { name: String },
    Rm { name: String },
}

#[derive(Subcommand, Debug)]
enum NetworkCommand {
    Create {
        #[arg(short, long, default_value = "bridge")]
        driver: String,
        name: String,
    },
    Rm { name: String },
}

/// Parse one `docker ...` line
pub fn parse_command(line: &str) -> Result<Command> {
    let words: Vec<&str> = line.split_whitespace().collect();
    if words.first() != Some(&"docker") {
        return Err(BerthError::InvalidArgument(format!(
            "expected a docker command, got {:?}",
            line.trim()
        )));
    }

    let parsed = DockerLine::try_parse_from(words).map_err(|e| {
        let rendered = e.to_string();
        let first = rendered.lines().next().unwrap_or("invalid command");
        BerthError::InvalidArgument(first.trim_start_matches("error: ").to_string())
    })?;

    Ok(match parsed.command {
        DockerCommand::Pull { image } => {
            let (name, tag) = parse_reference(&image)?;
            Command::Pull { name, tag }
        }
        DockerCommand::Rmi { image } => {
            let (name, tag) = parse_reference(&image)?;
            Command::RemoveImage { name, tag }
        }
        DockerCommand::Run {
            detach: _,
            name,
            publish,
            network,
            env,
            volume,
            image,
        } => {
            let (image_name, tag) = parse_reference(&image)?;
            let env = env
                .iter()
                .map(String::as_str)
                .map(EnvVar::parse)
                .collect::<Result<Vec<_>>>()?;
            let volumes = volume
                .iter()
                .map(|spec| spec.split(':').next().unwrap_or(spec).to_string())
                .collect();

            Command::Run(RunCommand {
                name,
                ports: publish,
                network: network.unwrap_or_else(|| DEFAULT_NETWORK.to_string()),
                env,
                volumes,
                image: format!("{}:{}", image_name, tag),
            })
        }
        DockerCommand::Start { container } => Command::Start { container },
        DockerCommand::Stop { container } => Command::Stop { container },
        DockerCommand::Rm { container } => Command::Remove { container },
        DockerCommand::Volume { command } => match command {
            VolumeCommand::Create { name } => Command::VolumeCreate { name },
            VolumeCommand::Rm { name } => Command::VolumeRemove { name },
        },
        DockerCommand::Network { command } => match command {
            NetworkCommand::Create { driver, name } => Command::NetworkCreate {
                name,
                driver: driver.parse()?,
            },
            NetworkCommand::Rm { name } => Command::NetworkRemove { name },
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::network::NetworkDriver;

    #[test]
    fn test_parse_pull_defaults_tag() {
        assert_eq!(
            parse_command("docker pull redis").unwrap(),
            Command::Pull {
                name: "redis".to_string(),
                tag: "latest".to_string()
            }
        );
    }

    #[test]
    fn test_parse_run() {
        let line = "docker run -d --name database -p 5432:5432 --network app-network \
                    -e POSTGRES_PASSWORD=secret -v db-data:/data postgres:15";
        let Command::Run(run) = parse_command(line).unwrap() else {
            panic!("expected run command");
        };

        assert_eq!(run.name.as_deref(), Some("database"));
        assert_eq!(run.ports.as_deref(), Some("5432:5432"));
        assert_eq!(run.network, "app-network");
        assert_eq!(run.env, vec![EnvVar::new("POSTGRES_PASSWORD", "secret")]);
        assert_eq!(run.volumes, vec!["db-data"]);
        assert_eq!(run.image, "postgres:15");
    }

    #[test]
    fn test_parse_renders_back_identically() {
        let lines = [
            "docker run -d --name web -p 8080:80 nginx:latest",
            "docker network create --driver macvlan lan",
            "docker volume rm data",
            "docker stop web",
            "docker rmi node:18-alpine",
        ];
        for line in lines {
            assert_eq!(parse_command(line).unwrap().to_string(), line);
        }
    }

    #[test]
    fn test_parse_network_default_driver() {
        assert_eq!(
            parse_command("docker network create app").unwrap(),
            Command::NetworkCreate {
                name: "app".to_string(),
                driver: NetworkDriver::Bridge
            }
        );
    }

    #[test]
    fn test_parse_errors() {
        for line in ["podman ps", "docker", "docker exec web sh", "docker run -d --name x"] {
            let err = parse_command(line).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidArgument, "{}", line);
        }
    }
}
