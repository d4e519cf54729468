use crate::error::{FilterStage, Result, SegcutError};
use image::{Rgba, Rgba32FImage, RgbaImage};

/// Source-out composite of `source` against a premultiplied `mask`
///
/// Keeps the part of `source` that the mask leaves transparent:
/// `out = source * (1 - mask.alpha)`. The result is returned with straight
/// alpha, so color channels are the source's and only alpha is scaled.
pub fn source_out(source: &RgbaImage, mask: &Rgba32FImage) -> Result<RgbaImage> {
    let _span = tracing::debug_span!("composite").entered();

    if source.dimensions() != mask.dimensions() {
        let (sw, sh) = source.dimensions();
        let (mw, mh) = mask.dimensions();
        return Err(SegcutError::filter(
            FilterStage::Composite,
            format!("source is {sw}x{sh} but mask is {mw}x{mh}"),
        ));
    }

    let mut out = RgbaImage::new(source.width(), source.height());
    for ((src, m), dst) in source.pixels().zip(mask.pixels()).zip(out.pixels_mut()) {
        let Rgba([r, g, b, a]) = *src;
        let coverage = 1.0 - m.0[3].clamp(0.0, 1.0);
        let alpha = (a as f32 * coverage).round().clamp(0.0, 255.0) as u8;
        *dst = Rgba([r, g, b, alpha]);
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn photo() -> RgbaImage {
        RgbaImage::from_fn(4, 3, |x, y| Rgba([x as u8 * 40, y as u8 * 60, 200, 255]))
    }

    #[test]
    fn transparent_mask_keeps_the_source() {
        let mask = Rgba32FImage::new(4, 3);

        let out = source_out(&photo(), &mask).unwrap();

        assert_eq!(out, photo());
    }

    #[test]
    fn opaque_mask_removes_everything() {
        let mask = Rgba32FImage::from_pixel(4, 3, Rgba([0.0, 0.0, 0.0, 1.0]));

        let out = source_out(&photo(), &mask).unwrap();

        assert!(out.pixels().all(|p| p.0[3] == 0));
    }

    #[test]
    fn partial_alpha_scales_coverage() {
        let mask = Rgba32FImage::from_pixel(4, 3, Rgba([0.0, 0.0, 0.0, 0.5]));

        let out = source_out(&photo(), &mask).unwrap();

        assert!(out.pixels().all(|p| p.0[3] == 128));
    }

    #[test]
    fn mismatched_dimensions_fail_in_composite_stage() {
        let mask = Rgba32FImage::new(2, 2);

        let err = source_out(&photo(), &mask).unwrap_err();

        assert_eq!(err.stage(), Some(FilterStage::Composite));
    }
}
