mod png_dir;

pub use png_dir::PngDirectory;

use crate::error::Result;
use image::RgbaImage;
use std::fmt;

/// The two display surfaces the slideshow drives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    /// Cutout produced by the segmentation pipeline
    Preview,
    /// Untouched original, shown after the preview
    Reveal,
}

impl fmt::Display for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Surface::Preview => f.write_str("preview"),
            Surface::Reveal => f.write_str("reveal"),
        }
    }
}

/// Trait for output destinations
pub trait OutputSink {
    /// Show `frame` on `surface`; `index` is the slideshow position
    fn show(&mut self, surface: Surface, index: usize, frame: &RgbaImage) -> Result<()>;
}
