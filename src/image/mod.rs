//! Image management module
//!
//! Images are immutable records keyed by `name:tag`, plus a catalog of
//! well-known images with their sizes and run defaults.

pub mod catalog;
pub mod store;

pub use catalog::{CatalogImage, CATALOG};
pub use store::{format_reference, parse_reference, Image, ImageStore, DEFAULT_TAG};
