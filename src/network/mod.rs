//! Network management module
//!
//! Networks and the set of containers attached to each.

pub mod config;

pub use config::{
    is_default_network, Network, NetworkDriver, NetworkStore, DEFAULT_NETWORK, DEFAULT_NETWORKS,
};
