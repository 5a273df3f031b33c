//! Container management module
//!
//! Container records, their status, and the options used to run them.

pub mod config;
pub mod runtime;

pub use config::{ContainerStatus, EnvVar, RunOptions};
pub use runtime::{Container, ContainerStore};
