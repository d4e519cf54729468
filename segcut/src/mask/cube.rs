use crate::error::{FilterStage, Result, SegcutError};
use image::{Rgb, Rgb32FImage, Rgba, Rgba32FImage};

/// Default number of grid points per axis
pub const DEFAULT_CUBE_DIMENSION: usize = 64;

/// Largest accepted number of grid points per axis (256³ entries)
pub const MAX_CUBE_DIMENSION: usize = 256;

/// Dense 3D color lookup table with premultiplied RGBA entries
///
/// Entries are laid out with red varying fastest, then green, then blue:
/// entry `(x, y, z)` lives at `x + y * S + z * S * S`.
#[derive(Debug, Clone)]
pub struct ColorCube {
    dimension: usize,
    entries: Vec<[f32; 4]>,
}

impl ColorCube {
    /// Build a cube by evaluating `f(r, g, b)` at every grid point
    ///
    /// Grid coordinates are `index / (dimension - 1)`, so both 0.0 and 1.0
    /// are hit exactly.
    pub fn from_fn<F>(dimension: usize, mut f: F) -> Result<Self>
    where
        F: FnMut(f64, f64, f64) -> [f32; 4],
    {
        if !(2..=MAX_CUBE_DIMENSION).contains(&dimension) {
            return Err(SegcutError::filter(
                FilterStage::ColorCube,
                format!("cube dimension must be between 2 and {MAX_CUBE_DIMENSION}, got {dimension}"),
            ));
        }

        let step = (dimension - 1) as f64;
        let mut entries = Vec::with_capacity(dimension.pow(3));
        for z in 0..dimension {
            let blue = z as f64 / step;
            for y in 0..dimension {
                let green = y as f64 / step;
                for x in 0..dimension {
                    let red = x as f64 / step;
                    entries.push(f(red, green, blue));
                }
            }
        }

        Ok(Self { dimension, entries })
    }

    /// Chroma-key cube that makes pure white transparent
    ///
    /// Any grid point whose HSB brightness is exactly 1.0 gets alpha 0,
    /// everything else keeps its color with alpha 1. Brightness is the
    /// largest channel, so saturated primaries are keyed out along with white.
    pub fn white_key(dimension: usize) -> Result<Self> {
        let _span = tracing::debug_span!("color_cube", dimension).entered();

        Self::from_fn(dimension, |red, green, blue| {
            let alpha = if brightness(red, green, blue) == 1.0 {
                0.0
            } else {
                1.0
            };
            [
                (red * alpha) as f32,
                (green * alpha) as f32,
                (blue * alpha) as f32,
                alpha as f32,
            ]
        })
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Stored entry at grid indices (red, green, blue)
    pub fn entry(&self, x: usize, y: usize, z: usize) -> [f32; 4] {
        let s = self.dimension;
        self.entries[x + y * s + z * s * s]
    }

    /// Look up a normalized RGB color with trilinear interpolation
    pub fn lookup(&self, rgb: [f32; 3]) -> [f32; 4] {
        let max_index = self.dimension - 1;
        let scale = max_index as f32;

        let mut base = [0usize; 3];
        let mut frac = [0f32; 3];
        for c in 0..3 {
            let pos = rgb[c].clamp(0.0, 1.0) * scale;
            // Keep one cell in range so `base + 1` is always valid
            let cell = (pos.floor() as usize).min(max_index - 1);
            base[c] = cell;
            frac[c] = pos - cell as f32;
        }

        let mut out = [0f32; 4];
        for corner in 0..8 {
            let dx = corner & 1;
            let dy = (corner >> 1) & 1;
            let dz = (corner >> 2) & 1;

            let weight = axis_weight(frac[0], dx) * axis_weight(frac[1], dy) * axis_weight(frac[2], dz);
            if weight == 0.0 {
                continue;
            }

            let entry = self.entry(base[0] + dx, base[1] + dy, base[2] + dz);
            for (o, e) in out.iter_mut().zip(entry) {
                *o += weight * e;
            }
        }

        out
    }

    /// Apply the cube to every pixel of a normalized RGB raster
    pub fn apply(&self, image: &Rgb32FImage) -> Rgba32FImage {
        let _span = tracing::debug_span!("color_cube_apply").entered();

        let (width, height) = image.dimensions();
        let mut mask = Rgba32FImage::new(width, height);
        for (src, dst) in image.pixels().zip(mask.pixels_mut()) {
            let Rgb(rgb) = *src;
            *dst = Rgba(self.lookup(rgb));
        }
        mask
    }
}

/// HSB brightness of a color: its largest channel
pub fn brightness(red: f64, green: f64, blue: f64) -> f64 {
    red.max(green).max(blue)
}

fn axis_weight(frac: f32, offset: usize) -> f32 {
    if offset == 0 {
        1.0 - frac
    } else {
        frac
    }
}
