//! Storage management module
//!
//! Named volumes that containers mount.

pub mod volume;

pub use volume::{Volume, VolumeDriver, VolumeStore};
