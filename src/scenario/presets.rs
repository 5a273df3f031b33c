//! Built-in scenarios

use super::{ContainerSpec, Difficulty, ImageSpec, NetworkSpec, Scenario, VolumeSpec};
use crate::container::{ContainerStatus, EnvVar};
use crate::network::NetworkDriver;
use crate::storage::volume::EMPTY_VOLUME_SIZE;
use crate::storage::VolumeDriver;

fn image(name: &str, tag: &str, size: &str, layers: u32) -> ImageSpec {
    ImageSpec {
        name: name.to_string(),
        tag: tag.to_string(),
        size: Some(size.to_string()),
        layers: Some(layers),
    }
}

fn volume(name: &str) -> VolumeSpec {
    VolumeSpec {
        name: name.to_string(),
        driver: VolumeDriver::Local,
        size: Some(EMPTY_VOLUME_SIZE.to_string()),
    }
}

fn network(name: &str) -> NetworkSpec {
    NetworkSpec {
        name: name.to_string(),
        driver: NetworkDriver::Bridge,
    }
}

fn container(
    name: &str,
    image: &str,
    ports: Option<&str>,
    network: &str,
    env: &[(&str, &str)],
    volumes: &[&str],
) -> ContainerSpec {
    ContainerSpec {
        name: name.to_string(),
        image: image.to_string(),
        status: ContainerStatus::Running,
        ports: ports.map(str::to_string),
        network: network.to_string(),
        env: env.iter().map(|(k, v)| EnvVar::new(k, v)).collect(),
        volumes: volumes.iter().map(|v| v.to_string()).collect(),
    }
}

fn nginx() -> ImageSpec {
    image("nginx", "latest", "142 MB", 7)
}

fn node() -> ImageSpec {
    image("node", "18-alpine", "175 MB", 5)
}

fn postgres() -> ImageSpec {
    image("postgres", "15", "379 MB", 13)
}

/// Single nginx container
pub fn hello_world() -> Scenario {
    Scenario {
        id: "hello-world".to_string(),
        name: "Hello World".to_string(),
        description: "Single nginx container serving a webpage".to_string(),
        difficulty: Difficulty::Beginner,
        images: vec![nginx()],
        containers: vec![container(
            "hello-nginx",
            "nginx:latest",
            Some("8080:80"),
            "bridge",
            &[],
            &[],
        )],
        volumes: Vec::new(),
        networks: Vec::new(),
    }
}

/// nginx and postgres sharing a user network
pub fn web_db() -> Scenario {
    Scenario {
        id: "web-db".to_string(),
        name: "Web + Database".to_string(),
        description: "Web server with PostgreSQL database on custom network".to_string(),
        difficulty: Difficulty::Intermediate,
        images: vec![nginx(), postgres()],
        containers: vec![
            container(
                "web-server",
                "nginx:latest",
                Some("8080:80"),
                "app-network",
                &[],
                &[],
            ),
            container(
                "database",
                "postgres:15",
                Some("5432:5432"),
                "app-network",
                &[("POSTGRES_PASSWORD", "secret")],
                &["db-data"],
            ),
        ],
        volumes: vec![volume("db-data")],
        networks: vec![network("app-network")],
    }
}

pub fn full_stack() -> Scenario {
    Scenario {
        id: "full-stack".to_string(),
        name: "Full Stack App".to_string(),
        description: "Frontend + API + Database + Cache with volumes".to_string(),
        difficulty: Difficulty::Advanced,
        images: vec![
            nginx(),
            node(),
            postgres(),
            image("redis", "alpine", "30 MB", 5),
        ],
        containers: vec![
            container(
                "frontend",
                "nginx:latest",
                Some("3000:80"),
                "fullstack-net",
                &[],
                &[],
            ),
            container(
                "api",
                "node:18-alpine",
                Some("4000:4000"),
                "fullstack-net",
                &[("DB_HOST", "postgres"), ("REDIS_HOST", "cache")],
                &["api-logs"],
            ),
            container(
                "postgres",
                "postgres:15",
                None,
                "fullstack-net",
                &[("POSTGRES_PASSWORD", "secret"), ("POSTGRES_DB", "myapp")],
                &["pg-data"],
            ),
            container("cache", "redis:alpine", None, "fullstack-net", &[], &[]),
        ],
        volumes: vec![volume("pg-data"), volume("api-logs")],
        networks: vec![network("fullstack-net")],
    }
}

pub fn microservices() -> Scenario {
    Scenario {
        id: "microservices".to_string(),
        name: "Microservices".to_string(),
        description: "Multiple services communicating over networks".to_string(),
        difficulty: Difficulty::Advanced,
        images: vec![
            nginx(),
            node(),
            image("python", "3.11-slim", "125 MB", 5),
            image("mongo", "latest", "695 MB", 10),
        ],
        containers: vec![
            container(
                "gateway",
                "nginx:latest",
                Some("80:80"),
                "frontend-net",
                &[],
                &[],
            ),
            container(
                "user-service",
                "node:18-alpine",
                None,
                "backend-net",
                &[("MONGO_URL", "mongodb://users-db:27017")],
                &[],
            ),
            container(
                "order-service",
                "python:3.11-slim",
                None,
                "backend-net",
                &[("MONGO_URL", "mongodb://orders-db:27017")],
                &[],
            ),
            container(
                "users-db",
                "mongo:latest",
                None,
                "backend-net",
                &[],
                &["users-data"],
            ),
            container(
                "orders-db",
                "mongo:latest",
                None,
                "backend-net",
                &[],
                &["orders-data"],
            ),
        ],
        volumes: vec![volume("users-data"), volume("orders-data")],
        networks: vec![network("frontend-net"), network("backend-net")],
    }
}

/// A fresh interactive session: two pulled images and one volume
pub fn starter() -> Scenario {
    Scenario {
        id: STARTER.to_string(),
        name: "Starter".to_string(),
        description: "A couple of pulled images and an empty volume, ready to run".to_string(),
        difficulty: Difficulty::Beginner,
        images: vec![nginx(), node()],
        containers: Vec::new(),
        volumes: vec![volume("app-data")],
        networks: Vec::new(),
    }
}

/// Id of the preset interactive sessions open with
pub const STARTER: &str = "starter";

/// All built-in scenarios, in display order
pub fn builtin() -> Vec<Scenario> {
    vec![hello_world(), web_db(), full_stack(), microservices(), starter()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_scenarios_are_consistent() {
        for scenario in builtin() {
            assert!(scenario.validate().is_ok(), "{}", scenario.id);
        }
    }

    #[test]
    fn test_builtin_ids_are_unique() {
        let ids: Vec<String> = builtin().into_iter().map(|s| s.id).collect();
        assert_eq!(
            ids,
            vec!["hello-world", "web-db", "full-stack", "microservices", "starter"]
        );
    }

    #[test]
    fn test_starter_contents() {
        let scenario = starter();
        let images: Vec<String> = scenario
            .images
            .iter()
            .map(|i| format!("{}:{}", i.name, i.tag))
            .collect();
        assert_eq!(images, vec!["nginx:latest", "node:18-alpine"]);
        assert_eq!(scenario.volumes.len(), 1);
        assert_eq!(scenario.volumes[0].name, "app-data");
        assert!(scenario.containers.is_empty());
        assert!(scenario.networks.is_empty());
    }

    #[test]
    fn test_microservices_shape() {
        let scenario = microservices();
        assert_eq!(scenario.containers.len(), 5);
        assert_eq!(scenario.networks.len(), 2);
        assert_eq!(
            scenario
                .containers
                .iter()
                .filter(|c| c.network == "backend-net")
                .count(),
            4
        );
    }
}
