mod blur;
mod composite;
mod cube;
mod resize;

pub use blur::{gaussian_blur, DEFAULT_BLUR_RADIUS};
pub use composite::source_out;
pub use cube::{ColorCube, DEFAULT_CUBE_DIMENSION};
pub use resize::{resize, ResizeFilter};

use crate::error::Result;
use image::{Rgb, Rgb32FImage, RgbImage, Rgba32FImage, RgbaImage};

/// Tuning for mask synthesis
#[derive(Debug, Clone)]
pub struct SynthesisConfig {
    /// Grid points per axis of the chroma-key cube
    pub cube_dimension: usize,
    /// Gaussian sigma used to soften the cutout edge, in pixels
    pub blur_radius: f32,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            cube_dimension: DEFAULT_CUBE_DIMENSION,
            blur_radius: DEFAULT_BLUR_RADIUS,
        }
    }
}

/// Turns a rendered prediction into a background mask and cuts the photo with it
///
/// White prediction pixels mark the region to keep. The chroma-key cube
/// makes them transparent in the mask, so source-out compositing leaves
/// the photo visible exactly there.
pub struct MaskSynthesizer {
    cube: ColorCube,
    blur_radius: f32,
}

impl MaskSynthesizer {
    pub fn new(config: &SynthesisConfig) -> Result<Self> {
        let cube = ColorCube::white_key(config.cube_dimension)?;
        tracing::debug!(
            "Built {}^3 chroma-key cube, blur radius {}",
            cube.dimension(),
            config.blur_radius
        );

        Ok(Self {
            cube,
            blur_radius: config.blur_radius,
        })
    }

    #[cfg(test)]
    pub fn cube(&self) -> &ColorCube {
        &self.cube
    }

    /// Key out white and soften the edge, producing a premultiplied mask
    pub fn mask(&self, prediction: &RgbImage) -> Result<Rgba32FImage> {
        let keyed = self.cube.apply(&normalize(prediction));
        gaussian_blur(&keyed, self.blur_radius)
    }

    /// Full synthesis: mask from `prediction`, then source-out against `photo`
    pub fn synthesize(&self, prediction: &RgbImage, photo: &RgbaImage) -> Result<RgbaImage> {
        let _span = tracing::debug_span!("synthesize").entered();

        let mask = self.mask(prediction)?;
        source_out(photo, &mask)
    }
}

fn normalize(image: &RgbImage) -> Rgb32FImage {
    Rgb32FImage::from_fn(image.width(), image.height(), |x, y| {
        let Rgb([r, g, b]) = *image.get_pixel(x, y);
        Rgb([r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn photo() -> RgbaImage {
        RgbaImage::from_fn(16, 12, |x, y| Rgba([x as u8 * 10, y as u8 * 20, 90, 255]))
    }

    #[test]
    fn white_prediction_keeps_the_whole_photo() {
        let synth = MaskSynthesizer::new(&SynthesisConfig::default()).unwrap();
        let prediction = RgbImage::from_pixel(16, 12, Rgb([255, 255, 255]));

        let mask = synth.mask(&prediction).unwrap();
        assert!(mask.pixels().all(|p| p.0[3] == 0.0));

        let out = synth.synthesize(&prediction, &photo()).unwrap();
        assert_eq!(out, photo());
    }

    #[test]
    fn black_prediction_removes_the_whole_photo() {
        let synth = MaskSynthesizer::new(&SynthesisConfig::default()).unwrap();
        let prediction = RgbImage::new(16, 12);

        let mask = synth.mask(&prediction).unwrap();
        assert!(mask.pixels().all(|p| (p.0[3] - 1.0).abs() < 1e-5));

        let out = synth.synthesize(&prediction, &photo()).unwrap();
        assert!(out.pixels().all(|p| p.0[3] == 0));
    }

    #[test]
    fn cutout_follows_the_white_region() {
        let synth = MaskSynthesizer::new(&SynthesisConfig::default()).unwrap();
        let prediction = RgbImage::from_fn(16, 12, |x, _| {
            if x < 8 {
                Rgb([255, 255, 255])
            } else {
                Rgb([0, 0, 0])
            }
        });

        let out = synth.synthesize(&prediction, &photo()).unwrap();

        assert_eq!(out.get_pixel(0, 6).0[3], 255);
        assert_eq!(out.get_pixel(15, 6).0[3], 0);
        let edge = out.get_pixel(7, 6).0[3];
        assert!(edge > 0 && edge < 255);
    }

    #[test]
    fn default_config_matches_chroma_key_defaults() {
        let synth = MaskSynthesizer::new(&SynthesisConfig::default()).unwrap();

        assert_eq!(synth.cube().dimension(), 64);
        assert_eq!(synth.blur_radius, 2.0);
    }
}
