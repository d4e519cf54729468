mod directory;

pub use directory::DirectoryAssets;

use crate::error::Result;
use image::RgbaImage;

/// Trait for named image sources
pub trait AssetSource {
    /// Load the image registered under `name`
    fn load(&self, name: &str) -> Result<RgbaImage>;

    /// Whether an image exists under `name` without decoding it
    fn contains(&self, name: &str) -> bool;
}
