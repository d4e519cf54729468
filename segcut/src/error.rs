use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Filter stage that failed inside the cutout pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterStage {
    RenderPrediction,
    ColorCube,
    Blur,
    Composite,
    Resize,
}

impl fmt::Display for FilterStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FilterStage::RenderPrediction => "render-prediction",
            FilterStage::ColorCube => "color-cube",
            FilterStage::Blur => "blur",
            FilterStage::Composite => "composite",
            FilterStage::Resize => "resize",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum SegcutError {
    #[error("asset '{name}' not found")]
    AssetMissing { name: String },

    #[error("failed to read asset at '{}': {source}", path.display())]
    AssetUnreadable {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to load model from '{}': {reason}", path.display())]
    ModelLoadFailed { path: PathBuf, reason: String },

    #[error("inference failed: {0}")]
    InferenceFailed(String),

    #[error("{stage} filter failed: {reason}")]
    FilterFailed { stage: FilterStage, reason: String },

    #[error("failed to write '{}': {source}", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

impl SegcutError {
    pub fn filter(stage: FilterStage, reason: impl Into<String>) -> Self {
        SegcutError::FilterFailed {
            stage,
            reason: reason.into(),
        }
    }

    /// Stage of a filter failure, if this is one
    #[cfg(test)]
    pub fn stage(&self) -> Option<FilterStage> {
        match self {
            SegcutError::FilterFailed { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    pub fn inference(err: impl fmt::Display) -> Self {
        SegcutError::InferenceFailed(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SegcutError>;
