use crate::assets::AssetSource;
use crate::error::Result;
use crate::mask::{resize, MaskSynthesizer, ResizeFilter};
use crate::segmentation::{render_prediction, SegmentationModel};
use image::buffer::ConvertBuffer;
use image::{RgbImage, RgbaImage};
use std::time::Instant;

/// Score window used to render predictions: class 0 is black, the rest white
const PREDICTION_MIN: f32 = 0.0;
const PREDICTION_MAX: f32 = 1.0;

/// Asset -> model -> mask -> cutout, for one image at a time
pub struct CutoutPipeline {
    model: Box<dyn SegmentationModel>,
    synthesizer: MaskSynthesizer,
    filter: ResizeFilter,
}

impl CutoutPipeline {
    pub fn new(
        model: Box<dyn SegmentationModel>,
        synthesizer: MaskSynthesizer,
        filter: ResizeFilter,
    ) -> Self {
        Self {
            model,
            synthesizer,
            filter,
        }
    }

    /// Load `name` and return its background-removed cutout
    pub fn run(&mut self, assets: &dyn AssetSource, name: &str) -> Result<RgbaImage> {
        let original = assets.load(name)?;
        self.cut(&original)
    }

    /// Cut the background out of `original`, keeping its dimensions
    pub fn cut(&mut self, original: &RgbaImage) -> Result<RgbaImage> {
        let _span = tracing::debug_span!("cutout").entered();

        let (width, height) = original.dimensions();
        let (model_width, model_height) = self.model.input_size();

        let resized = resize(original, model_width, model_height, self.filter)?;
        let model_input: RgbImage = resized.convert();

        let infer_start = Instant::now();
        let scores = self.model.predict(&model_input)?;
        let infer_time = infer_start.elapsed();

        let synth_start = Instant::now();
        let prediction = render_prediction(&scores, PREDICTION_MIN, PREDICTION_MAX)?;
        // Some exports emit a strided label map; labels must not be blended
        let prediction = resize(&prediction, model_width, model_height, ResizeFilter::Nearest)?;
        let composite = self.synthesizer.synthesize(&prediction, &resized)?;
        let cutout = resize(&composite, width, height, self.filter)?;
        let synth_time = synth_start.elapsed();

        tracing::info!(
            "Cutout {}x{}: inference={:.1}ms, mask={:.1}ms",
            width,
            height,
            infer_time.as_secs_f64() * 1000.0,
            synth_time.as_secs_f64() * 1000.0
        );

        Ok(cutout)
    }

    /// Like [`run`](Self::run), but a failure yields a transparent placeholder
    ///
    /// The placeholder has the asset's dimensions when it could be loaded,
    /// otherwise it is a single transparent pixel.
    pub fn render_or_placeholder(&mut self, assets: &dyn AssetSource, name: &str) -> RgbaImage {
        match self.run(assets, name) {
            Ok(cutout) => cutout,
            Err(err) => {
                tracing::warn!("Showing placeholder for {}: {}", name, err);
                let (width, height) = assets
                    .load(name)
                    .map(|original| original.dimensions())
                    .unwrap_or((1, 1));
                placeholder(width, height)
            }
        }
    }
}

fn placeholder(width: u32, height: u32) -> RgbaImage {
    RgbaImage::new(width.max(1), height.max(1))
}
