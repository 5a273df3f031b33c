//! Berth - an in-memory container engine registry
//!
//! Berth models the resource graph of a container engine (images,
//! containers, volumes and networks) and enforces the integrity rules a real
//! engine applies before changing it:
//!
//! - Images, volumes and networks are unique by natural key
//! - Containers only reference resources that exist
//! - Nothing in use can be removed, and running containers cannot be removed
//! - The `bridge`, `host` and `none` networks always exist
//!
//! Every accepted mutation is recorded as the `docker` command that would
//! have produced it. Whole graphs can be swapped in from named scenarios.
//!
//! ```
//! use berth::container::RunOptions;
//! use berth::ids::SequentialIds;
//! use berth::registry::Registry;
//!
//! let mut registry = Registry::with_generator(SequentialIds::new());
//! registry.add_image("nginx", "latest").unwrap();
//! let web = registry
//!     .create_container("nginx:latest", RunOptions::new().ports("8080:80"))
//!     .unwrap();
//! assert_eq!(web.name, "nginx-0001");
//! assert_eq!(
//!     registry.command_log().last().unwrap().command,
//!     "docker run -d --name nginx-0001 -p 8080:80 nginx:latest"
//! );
//! ```

pub mod config;
pub mod container;
pub mod error;
pub mod history;
pub mod ids;
pub mod image;
pub mod network;
pub mod registry;
pub mod scenario;
pub mod storage;
pub mod store;
pub mod tui;

pub use config::BerthConfig;
pub use error::{BerthError, ErrorKind, ResourceKind, Result};
pub use registry::{Registry, Snapshot, Stats};
