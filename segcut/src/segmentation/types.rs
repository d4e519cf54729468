use crate::error::Result;
use image::RgbImage;
use ndarray::Array2;

/// Per-pixel class labels at model resolution, shape [height, width]
///
/// Label 0 is background; every other label is some foreground class.
pub type ScoreMap = Array2<f32>;

/// Trait for segmentation models
/// Allows swapping the ONNX backend for other implementations (and mocks in tests)
pub trait SegmentationModel {
    /// Run the model on a frame already sized to `input_size()`
    ///
    /// # Returns
    /// * Score map with one value per input pixel
    fn predict(&mut self, image: &RgbImage) -> Result<ScoreMap>;

    /// Get the model's required input dimensions
    ///
    /// Returns (width, height)
    fn input_size(&self) -> (u32, u32);
}
