use crate::error::{FilterStage, Result, SegcutError};
use image::Rgba32FImage;

/// Default blur radius in pixels, used as the Gaussian sigma
pub const DEFAULT_BLUR_RADIUS: f32 = 2.0;

/// Largest accepted blur radius. Keeps the kernel length bounded.
pub const MAX_BLUR_RADIUS: f32 = 256.0;

/// Gaussian blur over all four channels
///
/// Samples outside the raster replicate the nearest edge pixel, so a
/// uniform image stays uniform right up to its border.
pub fn gaussian_blur(image: &Rgba32FImage, radius: f32) -> Result<Rgba32FImage> {
    let _span = tracing::debug_span!("blur", radius).entered();

    if !radius.is_finite() || !(0.0..=MAX_BLUR_RADIUS).contains(&radius) {
        return Err(SegcutError::filter(
            FilterStage::Blur,
            format!("radius must be between 0 and {MAX_BLUR_RADIUS}, got {radius}"),
        ));
    }
    if radius == 0.0 || image.width() == 0 || image.height() == 0 {
        return Ok(image.clone());
    }

    Ok(imageproc::filter::gaussian_blur_f32(image, radius))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn uniform_image_is_not_faded_at_the_border() {
        let image = Rgba32FImage::from_pixel(9, 5, Rgba([0.25, 0.5, 0.75, 1.0]));

        let blurred = gaussian_blur(&image, DEFAULT_BLUR_RADIUS).unwrap();

        for p in blurred.pixels() {
            assert!((p.0[0] - 0.25).abs() < 1e-5);
            assert!((p.0[3] - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn softens_a_hard_edge() {
        let image = Rgba32FImage::from_fn(20, 1, |x, _| {
            if x < 10 {
                Rgba([0.0, 0.0, 0.0, 0.0])
            } else {
                Rgba([1.0, 1.0, 1.0, 1.0])
            }
        });

        let blurred = gaussian_blur(&image, DEFAULT_BLUR_RADIUS).unwrap();

        let left = blurred.get_pixel(9, 0).0[3];
        let right = blurred.get_pixel(10, 0).0[3];
        assert!(left > 0.0 && left < 0.5);
        assert!(right > 0.5 && right < 1.0);
        assert!(blurred.get_pixel(0, 0).0[3] < 1e-6);
        assert!(blurred.get_pixel(19, 0).0[3] > 1.0 - 1e-6);
    }

    #[test]
    fn zero_radius_is_identity() {
        let image = Rgba32FImage::from_fn(4, 4, |x, y| Rgba([x as f32, y as f32, 0.0, 1.0]));

        let blurred = gaussian_blur(&image, 0.0).unwrap();

        assert_eq!(blurred, image);
    }

    #[test]
    fn negative_radius_fails_in_blur_stage() {
        let image = Rgba32FImage::new(2, 2);

        let err = gaussian_blur(&image, -1.0).unwrap_err();

        assert_eq!(err.stage(), Some(FilterStage::Blur));
    }

    #[test]
    fn oversized_radius_fails_in_blur_stage() {
        let image = Rgba32FImage::new(2, 2);

        for radius in [MAX_BLUR_RADIUS * 2.0, 1e20, f32::INFINITY, f32::NAN] {
            let err = gaussian_blur(&image, radius).unwrap_err();
            assert_eq!(err.stage(), Some(FilterStage::Blur));
        }
    }

    #[test]
    fn largest_radius_still_blurs() {
        let image = Rgba32FImage::from_pixel(3, 3, Rgba([0.5, 0.5, 0.5, 1.0]));

        let blurred = gaussian_blur(&image, MAX_BLUR_RADIUS).unwrap();

        assert!((blurred.get_pixel(1, 1).0[0] - 0.5).abs() < 1e-3);
    }
}
