//! Image store - the local image table

use crate::error::{BerthError, Result};
use crate::ids::ResourceId;
use crate::store::{Entity, Table};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Tag assumed when a reference carries none
pub const DEFAULT_TAG: &str = "latest";

/// Size label for images the catalog knows nothing about
pub const UNKNOWN_SIZE: &str = "0 MB";

/// Container image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    /// Image ID
    pub id: ResourceId,
    /// Repository name (e.g., "nginx")
    pub name: String,
    /// Tag (e.g., "latest")
    pub tag: String,
    /// Human-readable size (e.g., "142 MB")
    pub size: String,
    /// Number of layers
    pub layers: u32,
    /// Pulled timestamp
    pub created: DateTime<Utc>,
}

impl Image {
    /// Create a new image record
    pub fn new(id: ResourceId, name: &str, tag: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            tag: tag.to_string(),
            size: UNKNOWN_SIZE.to_string(),
            layers: 1,
            created: Utc::now(),
        }
    }

    /// Set size label
    pub fn size(mut self, size: &str) -> Self {
        self.size = size.to_string();
        self
    }

    /// Set layer count
    pub fn layers(mut self, layers: u32) -> Self {
        self.layers = layers;
        self
    }

    /// `name:tag`
    pub fn reference(&self) -> String {
        format_reference(&self.name, &self.tag)
    }
}

impl Entity for Image {
    fn id(&self) -> &ResourceId {
        &self.id
    }

    fn key(&self) -> String {
        self.reference()
    }
}

/// Images indexed by id and by `name:tag`
pub type ImageStore = Table<Image>;

impl Table<Image> {
    /// Find an image by name and tag
    pub fn find_by_name(&self, name: &str, tag: &str) -> Option<&Image> {
        self.find(&format_reference(name, tag))
    }

    /// Find an image by `name[:tag]` reference
    pub fn find_reference(&self, reference: &str) -> Option<&Image> {
        let (name, tag) = parse_reference(reference).ok()?;
        self.find_by_name(&name, &tag)
    }
}

/// Join a name and tag into a reference
pub fn format_reference(name: &str, tag: &str) -> String {
    format!("{}:{}", name, tag)
}

/// Split `name[:tag]` into its parts, defaulting the tag to `latest`.
///
/// A colon followed by a `/` belongs to a registry host (`localhost:5000/app`),
/// not to the tag.
pub fn parse_reference(reference: &str) -> Result<(String, String)> {
    let reference = reference.trim();
    let (name, tag) = match reference.rsplit_once(':') {
        Some((name, tag)) if !tag.contains('/') => (name, tag),
        _ => (reference, DEFAULT_TAG),
    };

    if name.is_empty() || tag.is_empty() {
        return Err(BerthError::InvalidArgument(format!(
            "invalid image reference: {:?}",
            reference
        )));
    }

    Ok((name.to_string(), tag.to_string()))
}
