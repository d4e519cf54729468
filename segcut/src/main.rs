mod assets;
mod error;
mod mask;
mod output;
mod pipeline;
mod segmentation;
mod slideshow;

use anyhow::{Context, Result};
use assets::{AssetSource, DirectoryAssets};
use clap::Parser;
use image::RgbaImage;
use mask::{MaskSynthesizer, ResizeFilter, SynthesisConfig};
use output::{OutputSink, PngDirectory, Surface};
use pipeline::CutoutPipeline;
use segmentation::{ModelConfig, Normalization};
use slideshow::{Schedule, ScheduleConfig, Stage, Tick};
use std::path::PathBuf;
use std::time::{Duration, Instant};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory holding the sample images
    #[arg(short, long, default_value = "assets")]
    assets: PathBuf,

    /// Names of the images to cycle through, without extension
    #[arg(
        short,
        long,
        value_delimiter = ',',
        default_value = "img1,img2,img3,img4,img5,img6,img7,img8"
    )]
    images: Vec<String>,

    /// Directory the preview and reveal frames are written to
    #[arg(short, long, default_value = "out")]
    output: PathBuf,

    /// Path to segmentation model (ONNX file)
    /// If not provided, runs in passthrough mode without segmentation
    #[arg(long)]
    model: Option<PathBuf>,

    /// Square model input size in pixels
    #[arg(long, default_value_t = segmentation::DEEPLAB_INPUT_SIZE)]
    model_size: u32,

    /// Pixel normalization expected by the model
    #[arg(long, value_enum, default_value_t = Normalization::Unit)]
    normalization: Normalization,

    /// ONNX Runtime intra-op threads
    #[arg(long, default_value_t = 4)]
    threads: usize,

    /// Grid points per axis of the chroma-key color cube
    #[arg(long, default_value_t = mask::DEFAULT_CUBE_DIMENSION)]
    cube_dimension: usize,

    /// Gaussian blur radius applied to the mask edge
    #[arg(long, default_value_t = mask::DEFAULT_BLUR_RADIUS)]
    blur_radius: f32,

    /// Resampling used when scaling images
    #[arg(long, value_enum, default_value_t = ResizeFilter::Bilinear)]
    filter: ResizeFilter,

    /// Milliseconds between preview ticks
    #[arg(long, default_value_t = 1200)]
    period_ms: u64,

    /// Milliseconds between a preview tick and its reveal
    #[arg(long, default_value_t = 400)]
    reveal_offset_ms: u64,

    /// Process every event immediately instead of pacing them
    #[arg(long)]
    no_wait: bool,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    tracing::info!("segcut starting");
    tracing::info!("Images: {}", args.images.join(", "));
    tracing::info!(
        "Cadence: preview every {}ms, reveal {}ms later",
        args.period_ms,
        args.reveal_offset_ms
    );

    let assets = DirectoryAssets::new(&args.assets);

    let mut output = PngDirectory::new(&args.output)
        .with_context(|| format!("Failed to create output directory {}", args.output.display()))?;

    // Initialize segmentation model if provided
    let mut pipeline = if let Some(model_path) = &args.model {
        let model_config = ModelConfig {
            input_width: args.model_size,
            input_height: args.model_size,
            normalization: args.normalization,
            intra_threads: args.threads,
        };
        let model = segmentation::create_default_model(model_path, &model_config)
            .context("Failed to load segmentation model")?;

        let synthesis = SynthesisConfig {
            cube_dimension: args.cube_dimension,
            blur_radius: args.blur_radius,
        };
        let synthesizer =
            MaskSynthesizer::new(&synthesis).context("Failed to build mask synthesizer")?;

        Some(CutoutPipeline::new(model, synthesizer, args.filter))
    } else {
        tracing::info!("Running in passthrough mode (no segmentation)");
        None
    };

    let schedule = ScheduleConfig {
        period: Duration::from_millis(args.period_ms),
        reveal_offset: Duration::from_millis(args.reveal_offset_ms),
    };

    run_slideshow(
        &assets,
        pipeline.as_mut(),
        &mut output,
        &args.images,
        schedule,
        !args.no_wait,
    )?;

    tracing::info!("Slideshow finished");
    Ok(())
}

fn run_slideshow<O>(
    assets: &dyn AssetSource,
    mut pipeline: Option<&mut CutoutPipeline>,
    output: &mut O,
    images: &[String],
    schedule: ScheduleConfig,
    pace: bool,
) -> Result<()>
where
    O: OutputSink,
{
    for name in images {
        if !assets.contains(name) {
            tracing::warn!("Asset {} not found, it will show as a placeholder", name);
        }
    }

    let start = Instant::now();

    // The reveal surface starts on the first image
    if let Some(first) = images.first() {
        output
            .show(Surface::Reveal, 0, &original_or_placeholder(assets, first))
            .context("Failed to show initial frame")?;
    }

    for event in Schedule::new(images.len(), schedule) {
        if pace {
            let elapsed = start.elapsed();
            if event.at > elapsed {
                std::thread::sleep(event.at - elapsed);
            }
        }

        let index = match event.tick {
            Tick::Render(index) => index,
            Tick::Finished => {
                tracing::info!("{:?} stage finished", event.stage);
                continue;
            }
        };
        let name = &images[index];

        match event.stage {
            Stage::Preview => {
                let Some(pipeline) = pipeline.as_deref_mut() else {
                    continue;
                };
                let frame = pipeline.render_or_placeholder(assets, name);
                output
                    .show(Surface::Preview, index, &frame)
                    .with_context(|| format!("Failed to show preview of {name}"))?;
            }
            Stage::Reveal => {
                let frame = original_or_placeholder(assets, name);
                output
                    .show(Surface::Reveal, index, &frame)
                    .with_context(|| format!("Failed to show {name}"))?;
            }
        }

        tracing::info!("{:?} {} ({}/{})", event.stage, name, index + 1, images.len());
    }

    Ok(())
}

fn original_or_placeholder(assets: &dyn AssetSource, name: &str) -> RgbaImage {
    assets.load(name).unwrap_or_else(|err| {
        tracing::warn!("Showing placeholder for {}: {}", name, err);
        RgbaImage::new(1, 1)
    })
}
