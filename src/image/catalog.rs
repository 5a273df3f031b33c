//! Well-known images and their run defaults

use super::store::ImageStore;
use crate::container::EnvVar;

/// A catalog entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogImage {
    pub name: &'static str,
    pub tag: &'static str,
    pub size: &'static str,
    pub layers: u32,
}

impl CatalogImage {
    const fn new(name: &'static str, tag: &'static str, size: &'static str, layers: u32) -> Self {
        Self {
            name,
            tag,
            size,
            layers,
        }
    }

    pub fn reference(&self) -> String {
        super::store::format_reference(self.name, self.tag)
    }
}

/// Images offered for quick pulls
pub const CATALOG: &[CatalogImage] = &[
    CatalogImage::new("nginx", "latest", "142 MB", 7),
    CatalogImage::new("node", "18-alpine", "175 MB", 5),
    CatalogImage::new("postgres", "15", "379 MB", 13),
    CatalogImage::new("redis", "alpine", "30 MB", 5),
    CatalogImage::new("python", "3.11-slim", "125 MB", 5),
    CatalogImage::new("mongo", "latest", "695 MB", 10),
    CatalogImage::new("mysql", "8", "544 MB", 11),
    CatalogImage::new("alpine", "latest", "7 MB", 1),
];

/// Look up a catalog entry by name and tag
pub fn lookup(name: &str, tag: &str) -> Option<&'static CatalogImage> {
    CATALOG.iter().find(|c| c.name == name && c.tag == tag)
}

/// Catalog entries not yet present in the store
pub fn available(images: &ImageStore) -> Vec<&'static CatalogImage> {
    CATALOG
        .iter()
        .filter(|c| images.find_by_name(c.name, c.tag).is_none())
        .collect()
}

/// Default published port for an image name
pub fn default_ports(image_name: &str) -> Option<&'static str> {
    match image_name {
        "nginx" => Some("8080:80"),
        "postgres" => Some("5432:5432"),
        "redis" => Some("6379:6379"),
        "mysql" => Some("3306:3306"),
        "mongo" => Some("27017:27017"),
        _ => None,
    }
}

/// Environment an image needs to start
pub fn default_env(image_name: &str) -> Vec<EnvVar> {
    match image_name {
        "postgres" => vec![EnvVar::new("POSTGRES_PASSWORD", "secret")],
        "mysql" => vec![EnvVar::new("MYSQL_ROOT_PASSWORD", "secret")],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::ResourceId;
    use crate::image::Image;

    #[test]
    fn test_lookup() {
        let pg = lookup("postgres", "15").unwrap();
        assert_eq!(pg.size, "379 MB");
        assert_eq!(pg.layers, 13);
        assert!(lookup("postgres", "16").is_none());
    }

    #[test]
    fn test_available_excludes_pulled() {
        let mut images = ImageStore::new();
        images.insert(Image::new(ResourceId::from("1"), "nginx", "latest"));

        let remaining = available(&images);
        assert_eq!(remaining.len(), CATALOG.len() - 1);
        assert!(remaining.iter().all(|c| c.reference() != "nginx:latest"));
    }

    #[test]
    fn test_run_defaults() {
        assert_eq!(default_ports("nginx"), Some("8080:80"));
        assert_eq!(default_ports("alpine"), None);
        assert_eq!(default_env("mysql")[0].to_string(), "MYSQL_ROOT_PASSWORD=secret");
        assert!(default_env("redis").is_empty());
    }
}
