use super::types::ScoreMap;
use crate::error::{FilterStage, Result, SegcutError};
use crate::mask::{resize, ResizeFilter};
use image::{Rgb, RgbImage};
use ndarray::Array4;

const IMAGENET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];
const IMAGENET_STD: [f32; 3] = [0.229, 0.224, 0.225];

/// How pixel values are scaled before inference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Normalization {
    /// Divide by 255 into [0, 1]
    #[default]
    Unit,
    /// [0, 1] followed by ImageNet mean/std standardization
    Imagenet,
}

/// Preprocessor for converting RGB images to model input tensors
pub struct Preprocessor {
    target_width: u32,
    target_height: u32,
    normalization: Normalization,
}

impl Preprocessor {
    pub fn new(target_width: u32, target_height: u32, normalization: Normalization) -> Self {
        Self {
            target_width,
            target_height,
            normalization,
        }
    }

    /// Preprocess an RGB image into a normalized NCHW tensor
    ///
    /// Steps:
    /// 1. Resize to target dimensions
    /// 2. Convert to float and normalize
    /// 3. Transpose from HWC to NCHW format
    ///
    /// Returns: Array4<f32> with shape [1, 3, height, width]
    pub fn preprocess(&self, image: &RgbImage) -> Result<Array4<f32>> {
        let _span = tracing::debug_span!("preprocess").entered();

        let resized = resize(
            image,
            self.target_width,
            self.target_height,
            ResizeFilter::Bilinear,
        )?;

        let (width, height) = resized.dimensions();
        let mut tensor = Array4::<f32>::zeros((1, 3, height as usize, width as usize));

        for (x, y, pixel) in resized.enumerate_pixels() {
            for c in 0..3 {
                let mut value = pixel[c] as f32 / 255.0;
                if self.normalization == Normalization::Imagenet {
                    value = (value - IMAGENET_MEAN[c]) / IMAGENET_STD[c];
                }
                tensor[[0, c, y as usize, x as usize]] = value;
            }
        }

        Ok(tensor)
    }
}

/// Render a score map as a grayscale RGB raster
///
/// Scores are mapped linearly from `[min, max]` to `[0, 255]` and clamped,
/// so with the `0..1` window background is black and every foreground
/// class is white.
pub fn render_prediction(scores: &ScoreMap, min: f32, max: f32) -> Result<RgbImage> {
    let _span = tracing::debug_span!("render_prediction").entered();

    if min.is_nan() || max.is_nan() || max <= min {
        return Err(SegcutError::filter(
            FilterStage::RenderPrediction,
            format!("invalid score window [{min}, {max}]"),
        ));
    }

    let (height, width) = scores.dim();
    if width == 0 || height == 0 {
        return Err(SegcutError::filter(
            FilterStage::RenderPrediction,
            "score map is empty",
        ));
    }

    let range = max - min;
    Ok(RgbImage::from_fn(width as u32, height as u32, |x, y| {
        let score = scores[[y as usize, x as usize]];
        let value = (((score - min) / range).clamp(0.0, 1.0) * 255.0).round() as u8;
        Rgb([value, value, value])
    }))
}
