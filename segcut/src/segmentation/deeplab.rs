use super::preprocess::{Normalization, Preprocessor};
use super::types::{ScoreMap, SegmentationModel};
use crate::error::{Result, SegcutError};
use image::RgbImage;
use ndarray::{Array2, ArrayD, ArrayViewD, Axis, Ix2, Ix4};
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::{DynValue, TensorRef};
use std::path::Path;

/// DeepLabV3 expects a fixed square input
pub const DEEPLAB_INPUT_SIZE: u32 = 513;

/// Construction options for [`DeepLabV3`]
#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub input_width: u32,
    pub input_height: u32,
    pub normalization: Normalization,
    pub intra_threads: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            input_width: DEEPLAB_INPUT_SIZE,
            input_height: DEEPLAB_INPUT_SIZE,
            normalization: Normalization::Unit,
            intra_threads: 4,
        }
    }
}

/// DeepLabV3 semantic segmentation exported to ONNX
///
/// Accepts exports that emit raw logits `[1, C, H, W]` as well as ones
/// that already apply the argmax and emit class labels.
pub struct DeepLabV3 {
    session: Session,
    preprocessor: Preprocessor,
    width: u32,
    height: u32,
}

impl DeepLabV3 {
    /// Create a new DeepLabV3 model from an ONNX file
    ///
    /// # Arguments
    /// * `model_path` - Path to the ONNX model file
    /// * `config` - Input size, normalization and threading
    pub fn new<P: AsRef<Path>>(model_path: P, config: &ModelConfig) -> Result<Self> {
        let path = model_path.as_ref();

        tracing::info!("Loading DeepLabV3 model from {}", path.display());

        let load_failed = |err: &dyn std::fmt::Display| SegcutError::ModelLoadFailed {
            path: path.to_path_buf(),
            reason: err.to_string(),
        };

        let session = Session::builder()
            .map_err(|e| load_failed(&e))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| load_failed(&e))?
            .with_intra_threads(config.intra_threads)
            .map_err(|e| load_failed(&e))?
            .commit_from_file(path)
            .map_err(|e| load_failed(&e))?;

        tracing::info!("DeepLabV3 model loaded successfully");

        Ok(Self {
            session,
            preprocessor: Preprocessor::new(
                config.input_width,
                config.input_height,
                config.normalization,
            ),
            width: config.input_width,
            height: config.input_height,
        })
    }
}

impl SegmentationModel for DeepLabV3 {
    fn predict(&mut self, image: &RgbImage) -> Result<ScoreMap> {
        let _span = tracing::debug_span!("deeplab_predict").entered();

        let input_tensor = self.preprocessor.preprocess(image)?;
        let input = TensorRef::from_array_view(input_tensor.view()).map_err(SegcutError::inference)?;

        let _infer_span = tracing::debug_span!("inference").entered();
        let outputs = self
            .session
            .run(ort::inputs![input])
            .map_err(SegcutError::inference)?;
        drop(_infer_span);

        let scores = extract_scores(&outputs[0])?;
        labels_from_output(scores.view())
    }

    fn input_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Pull the first output out as floats, whatever numeric type the export uses
fn extract_scores(value: &DynValue) -> Result<ArrayD<f32>> {
    if let Ok(view) = value.try_extract_array::<f32>() {
        return Ok(view.to_owned());
    }
    if let Ok(view) = value.try_extract_array::<i64>() {
        return Ok(view.mapv(|v| v as f32));
    }
    value
        .try_extract_array::<i32>()
        .map(|view| view.mapv(|v| v as f32))
        .map_err(SegcutError::inference)
}

/// Reduce a model output to a `[height, width]` label map
///
/// * `[1, C, H, W]` with `C > 1` - argmax over classes
/// * `[1, 1, H, W]`, `[1, H, W]`, `[H, W]` - already labels
pub fn labels_from_output(output: ArrayViewD<'_, f32>) -> Result<ScoreMap> {
    let shape = output.shape().to_vec();
    let unexpected = || SegcutError::InferenceFailed(format!("unexpected output shape {shape:?}"));

    match output.ndim() {
        4 => {
            let logits = output.into_dimensionality::<Ix4>().map_err(|_| unexpected())?;
            let (batch, classes, height, width) = logits.dim();
            if batch != 1 || classes == 0 {
                return Err(unexpected());
            }
            if classes == 1 {
                return Ok(logits.index_axis(Axis(0), 0).index_axis(Axis(0), 0).to_owned());
            }

            Ok(Array2::from_shape_fn((height, width), |(y, x)| {
                let mut best = 0;
                let mut best_score = f32::NEG_INFINITY;
                for class in 0..classes {
                    let score = logits[[0, class, y, x]];
                    if score > best_score {
                        best = class;
                        best_score = score;
                    }
                }
                best as f32
            }))
        }
        3 => {
            if shape[0] != 1 {
                return Err(unexpected());
            }
            output
                .index_axis(Axis(0), 0)
                .into_dimensionality::<Ix2>()
                .map(|labels| labels.to_owned())
                .map_err(|_| unexpected())
        }
        2 => output
            .into_dimensionality::<Ix2>()
            .map(|labels| labels.to_owned())
            .map_err(|_| unexpected()),
        _ => Err(unexpected()),
    }
}
