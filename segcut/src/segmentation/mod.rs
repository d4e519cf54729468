mod deeplab;
mod preprocess;
pub mod types;

pub use deeplab::{DeepLabV3, ModelConfig, DEEPLAB_INPUT_SIZE};
pub use preprocess::{render_prediction, Normalization};
pub use types::SegmentationModel;

use crate::error::Result;
use std::path::Path;

/// Create the default segmentation model (DeepLabV3)
pub fn create_default_model<P: AsRef<Path>>(
    model_path: P,
    config: &ModelConfig,
) -> Result<Box<dyn SegmentationModel>> {
    let model = DeepLabV3::new(model_path, config)?;
    Ok(Box::new(model))
}
