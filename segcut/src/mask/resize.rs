use crate::error::{FilterStage, Result, SegcutError};
use image::{imageops, ImageBuffer, Pixel};

/// Sampling quality used when scaling rasters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ResizeFilter {
    Nearest,
    #[default]
    Bilinear,
}

impl ResizeFilter {
    fn filter_type(self) -> imageops::FilterType {
        match self {
            ResizeFilter::Nearest => imageops::FilterType::Nearest,
            ResizeFilter::Bilinear => imageops::FilterType::Triangle,
        }
    }
}

/// Scale `image` to exactly `width` x `height`, ignoring aspect ratio
pub fn resize<P>(
    image: &ImageBuffer<P, Vec<P::Subpixel>>,
    width: u32,
    height: u32,
    filter: ResizeFilter,
) -> Result<ImageBuffer<P, Vec<P::Subpixel>>>
where
    P: Pixel + 'static,
    P::Subpixel: 'static,
{
    let _span = tracing::debug_span!("resize", width, height).entered();

    if width == 0 || height == 0 {
        return Err(SegcutError::filter(
            FilterStage::Resize,
            format!("target size {width}x{height} is empty"),
        ));
    }
    if image.width() == 0 || image.height() == 0 {
        return Err(SegcutError::filter(FilterStage::Resize, "input image is empty"));
    }

    if image.dimensions() == (width, height) {
        return Ok(image.clone());
    }

    Ok(imageops::resize(image, width, height, filter.filter_type()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};

    #[test]
    fn output_matches_requested_size_regardless_of_aspect() {
        let wide = RgbImage::from_pixel(300, 100, Rgb([10, 20, 30]));

        for filter in [ResizeFilter::Nearest, ResizeFilter::Bilinear] {
            let square = resize(&wide, 513, 513, filter).unwrap();
            assert_eq!(square.dimensions(), (513, 513));

            let tall = resize(&wide, 7, 91, filter).unwrap();
            assert_eq!(tall.dimensions(), (7, 91));
        }
    }

    #[test]
    fn round_trip_restores_dimensions() {
        let original = RgbaImage::from_fn(37, 53, |x, y| Rgba([x as u8, y as u8, 0, 255]));

        let down = resize(&original, 513, 513, ResizeFilter::Bilinear).unwrap();
        let back = resize(&down, 37, 53, ResizeFilter::Bilinear).unwrap();

        assert_eq!(back.dimensions(), original.dimensions());
    }

    #[test]
    fn empty_target_fails_in_resize_stage() {
        let image = RgbImage::new(4, 4);

        let err = resize(&image, 0, 10, ResizeFilter::Nearest).unwrap_err();

        assert_eq!(err.stage(), Some(FilterStage::Resize));
    }

    #[test]
    fn empty_input_fails_in_resize_stage() {
        let image = RgbImage::new(0, 0);

        assert!(resize(&image, 10, 10, ResizeFilter::Nearest).is_err());
    }
}
