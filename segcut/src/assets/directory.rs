use super::AssetSource;
use crate::error::{Result, SegcutError};
use image::RgbaImage;
use std::path::{Path, PathBuf};

const EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Assets stored as `<root>/<name>.<ext>` image files
pub struct DirectoryAssets {
    root: PathBuf,
}

impl DirectoryAssets {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        let root = root.as_ref().to_path_buf();
        tracing::info!("Reading assets from {}", root.display());
        Self { root }
    }

    fn resolve(&self, name: &str) -> Option<PathBuf> {
        EXTENSIONS
            .iter()
            .map(|ext| self.root.join(format!("{name}.{ext}")))
            .find(|path| path.is_file())
    }
}

impl AssetSource for DirectoryAssets {
    fn load(&self, name: &str) -> Result<RgbaImage> {
        let path = self.resolve(name).ok_or_else(|| SegcutError::AssetMissing {
            name: name.to_string(),
        })?;

        let image = image::open(&path).map_err(|source| SegcutError::AssetUnreadable {
            path: path.clone(),
            source,
        })?;

        tracing::debug!(
            "Loaded asset {} from {} ({}x{})",
            name,
            path.display(),
            image.width(),
            image.height()
        );

        Ok(image.to_rgba8())
    }

    fn contains(&self, name: &str) -> bool {
        self.resolve(name).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn scratch_dir(label: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("segcut-{label}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn loads_png_by_name() {
        let dir = scratch_dir("assets-load");
        RgbaImage::from_pixel(5, 4, Rgba([1, 2, 3, 255]))
            .save(dir.join("img1.png"))
            .unwrap();

        let assets = DirectoryAssets::new(&dir);

        assert!(assets.contains("img1"));
        let image = assets.load("img1").unwrap();
        assert_eq!(image.dimensions(), (5, 4));
        assert_eq!(image.get_pixel(0, 0), &Rgba([1, 2, 3, 255]));

        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn unknown_name_is_reported_as_missing() {
        let dir = scratch_dir("assets-missing");
        let assets = DirectoryAssets::new(&dir);

        assert!(!assets.contains("img9"));
        let err = assets.load("img9").unwrap_err();
        assert!(matches!(err, SegcutError::AssetMissing { name } if name == "img9"));

        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn undecodable_file_is_reported_as_unreadable() {
        let dir = scratch_dir("assets-corrupt");
        std::fs::write(dir.join("broken.png"), b"not a png").unwrap();
        let assets = DirectoryAssets::new(&dir);

        let err = assets.load("broken").unwrap_err();
        assert!(matches!(err, SegcutError::AssetUnreadable { .. }));

        std::fs::remove_dir_all(dir).unwrap();
    }
}
