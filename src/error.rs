//! Error types for Berth

use thiserror::Error;

/// Result type for Berth operations
pub type Result<T> = std::result::Result<T, BerthError>;

/// Kind of resource an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Image,
    Container,
    Volume,
    Network,
    Scenario,
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceKind::Image => write!(f, "image"),
            ResourceKind::Container => write!(f, "container"),
            ResourceKind::Volume => write!(f, "volume"),
            ResourceKind::Network => write!(f, "network"),
            ResourceKind::Scenario => write!(f, "scenario"),
        }
    }
}

/// Discriminant of [`BerthError`], for matching without inspecting payloads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Duplicate,
    NotFound,
    InUse,
    ResourceBusy,
    Immutable,
    InvalidArgument,
    Config,
    Script,
    Io,
    Serialization,
}

/// Berth error types
#[derive(Error, Debug)]
pub enum BerthError {
    #[error("{kind} {name} already exists")]
    Duplicate { kind: ResourceKind, name: String },

    #[error("{kind} not found: {reference}")]
    NotFound {
        kind: ResourceKind,
        reference: String,
    },

    #[error("{kind} {name} is in use by container(s): {}", .users.join(", "))]
    InUse {
        kind: ResourceKind,
        name: String,
        users: Vec<String>,
    },

    #[error("container {0} is running; stop it before removing it")]
    ResourceBusy(String),

    #[error("network {0} is a default network and cannot be removed")]
    Immutable(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Script error at line {line}: {message}")]
    Script { line: usize, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(String),
}

impl BerthError {
    /// Shorthand for a `NotFound` error
    pub fn not_found(kind: ResourceKind, reference: impl Into<String>) -> Self {
        BerthError::NotFound {
            kind,
            reference: reference.into(),
        }
    }

    /// Shorthand for a `Duplicate` error
    pub fn duplicate(kind: ResourceKind, name: impl Into<String>) -> Self {
        BerthError::Duplicate {
            kind,
            name: name.into(),
        }
    }

    /// The category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            BerthError::Duplicate { .. } => ErrorKind::Duplicate,
            BerthError::NotFound { .. } => ErrorKind::NotFound,
            BerthError::InUse { .. } => ErrorKind::InUse,
            BerthError::ResourceBusy(_) => ErrorKind::ResourceBusy,
            BerthError::Immutable(_) => ErrorKind::Immutable,
            BerthError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            BerthError::Config(_) => ErrorKind::Config,
            BerthError::Script { .. } => ErrorKind::Script,
            BerthError::Io(_) => ErrorKind::Io,
            BerthError::Json(_) | BerthError::Yaml(_) => ErrorKind::Serialization,
        }
    }
}

impl From<serde_yaml::Error> for BerthError {
    fn from(e: serde_yaml::Error) -> Self {
        BerthError::Yaml(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_use_message_lists_users() {
        let err = BerthError::InUse {
            kind: ResourceKind::Volume,
            name: "db-data".to_string(),
            users: vec!["database".to_string(), "backup".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "volume db-data is in use by container(s): database, backup"
        );
        assert_eq!(err.kind(), ErrorKind::InUse);
    }

    #[test]
    fn test_kind_mapping() {
        assert_eq!(
            BerthError::duplicate(ResourceKind::Image, "nginx:latest").kind(),
            ErrorKind::Duplicate
        );
        assert_eq!(
            BerthError::not_found(ResourceKind::Network, "app-net").to_string(),
            "network not found: app-net"
        );
        assert_eq!(
            BerthError::Immutable("bridge".to_string()).kind(),
            ErrorKind::Immutable
        );
        assert_eq!(BerthError::Yaml("bad".to_string()).kind(), ErrorKind::Serialization);
    }
}
