use super::{OutputSink, Surface};
use crate::error::{Result, SegcutError};
use image::RgbaImage;
use std::path::{Path, PathBuf};

/// Writes every shown frame as `<dir>/<surface>_<index>.png`
pub struct PngDirectory {
    dir: PathBuf,
}

impl PngDirectory {
    pub fn new<P: AsRef<Path>>(dir: P) -> std::io::Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        tracing::info!("Writing frames to {}", dir.display());
        Ok(Self { dir })
    }

    pub fn frame_path(&self, surface: Surface, index: usize) -> PathBuf {
        self.dir.join(format!("{surface}_{index}.png"))
    }
}

impl OutputSink for PngDirectory {
    fn show(&mut self, surface: Surface, index: usize, frame: &RgbaImage) -> Result<()> {
        let path = self.frame_path(surface, index);
        frame
            .save(&path)
            .map_err(|source| SegcutError::Output {
                path: path.clone(),
                source,
            })?;

        tracing::debug!("Wrote {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn frames_are_named_by_surface_and_index() {
        let dir = std::env::temp_dir().join(format!("segcut-png-{}", std::process::id()));
        let mut sink = PngDirectory::new(&dir).unwrap();
        let frame = RgbaImage::from_pixel(3, 2, Rgba([9, 8, 7, 128]));

        sink.show(Surface::Preview, 2, &frame).unwrap();
        sink.show(Surface::Reveal, 0, &frame).unwrap();

        let written = image::open(dir.join("preview_2.png")).unwrap().to_rgba8();
        assert_eq!(written, frame);
        assert!(dir.join("reveal_0.png").is_file());

        std::fs::remove_dir_all(dir).unwrap();
    }
}
