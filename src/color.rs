use std::fmt;

use image::{Rgba, RgbaImage};
use ndarray::Array2;
use palette::{LinSrgb, Mix, Srgb};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Colour maps
// ---------------------------------------------------------------------------

/// Colour map used for slices, the colour bar and exported frames.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ColorMapKind {
    #[default]
    Viridis,
    Magma,
    Grayscale,
}

const VIRIDIS: &[(u8, u8, u8)] = &[
    (68, 1, 84),
    (59, 82, 139),
    (33, 145, 140),
    (94, 201, 98),
    (253, 231, 37),
];

const MAGMA: &[(u8, u8, u8)] = &[
    (0, 0, 4),
    (81, 18, 124),
    (183, 55, 121),
    (252, 137, 97),
    (252, 253, 191),
];

const GRAYSCALE: &[(u8, u8, u8)] = &[(0, 0, 0), (255, 255, 255)];

/// Pixel used where the scaled value is NaN.
pub const NAN_PIXEL: [u8; 4] = [0, 0, 0, 0];

impl ColorMapKind {
    pub const ALL: [ColorMapKind; 3] = [
        ColorMapKind::Viridis,
        ColorMapKind::Magma,
        ColorMapKind::Grayscale,
    ];

    fn anchors(self) -> &'static [(u8, u8, u8)] {
        match self {
            ColorMapKind::Viridis => VIRIDIS,
            ColorMapKind::Magma => MAGMA,
            ColorMapKind::Grayscale => GRAYSCALE,
        }
    }

    /// Colour at normalised position `t` (clamped to [0, 1]).
    ///
    /// Neighbouring anchors are blended in linear sRGB.
    pub fn sample(self, t: f64) -> [u8; 4] {
        let anchors = self.anchors();
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) } as f32;
        let segments = (anchors.len() - 1) as f32;
        let pos = t * segments;
        let lower = (pos.floor() as usize).min(anchors.len() - 2);
        let frac = pos - lower as f32;

        let to_linear = |(r, g, b): (u8, u8, u8)| -> LinSrgb {
            Srgb::new(r, g, b).into_format::<f32>().into_linear()
        };
        let mixed = to_linear(anchors[lower]).mix(to_linear(anchors[lower + 1]), frac);
        let rgb: Srgb<u8> = Srgb::<f32>::from_linear(mixed).into_format();
        [rgb.red, rgb.green, rgb.blue, 255]
    }
}

impl fmt::Display for ColorMapKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorMapKind::Viridis => write!(f, "Viridis"),
            ColorMapKind::Magma => write!(f, "Magma"),
            ColorMapKind::Grayscale => write!(f, "Grayscale"),
        }
    }
}

// ---------------------------------------------------------------------------
// Slice → RGBA
// ---------------------------------------------------------------------------

/// Map a scaled value into [0, 1] for the given range.
pub fn normalize(value: f64, (low, high): (f64, f64)) -> f64 {
    ((value - low) / (high - low)).clamp(0.0, 1.0)
}

/// Render a scaled slice as an image with `u` left→right and `v` bottom→top.
///
/// Pixel `(u - 1, nv - v)` holds `slice[[u - 1, v - 1]]`, so the image reads
/// like a plot with the origin in the lower-left corner.
pub fn colorize(slice: &Array2<f64>, range: (f64, f64), map: ColorMapKind) -> RgbaImage {
    let (nu, nv) = slice.dim();
    let mut img = RgbaImage::new(nu as u32, nv as u32);
    for ((u, v), &value) in slice.indexed_iter() {
        let pixel = if value.is_nan() {
            NAN_PIXEL
        } else {
            map.sample(normalize(value, range))
        };
        img.put_pixel(u as u32, (nv - 1 - v) as u32, Rgba(pixel));
    }
    img
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    #[test]
    fn test_endpoints_match_anchors() {
        assert_eq!(ColorMapKind::Grayscale.sample(0.0), [0, 0, 0, 255]);
        assert_eq!(ColorMapKind::Grayscale.sample(1.0), [255, 255, 255, 255]);
        let close = |a: [u8; 4], b: [u8; 4]| a.iter().zip(b).all(|(&x, y)| x.abs_diff(y) <= 1);
        assert!(close(ColorMapKind::Viridis.sample(0.0), [68, 1, 84, 255]));
        assert!(close(ColorMapKind::Viridis.sample(1.0), [253, 231, 37, 255]));
    }

    #[test]
    fn test_sample_clamps() {
        assert_eq!(
            ColorMapKind::Magma.sample(-3.0),
            ColorMapKind::Magma.sample(0.0)
        );
        assert_eq!(
            ColorMapKind::Magma.sample(7.0),
            ColorMapKind::Magma.sample(1.0)
        );
    }

    #[test]
    fn test_colorize_orientation_and_nan() {
        // u = rows, v = columns
        let slice = array![[0.0, 1.0], [f64::NAN, 0.5]];
        let img = colorize(&slice, (0.0, 1.0), ColorMapKind::Grayscale);
        assert_eq!(img.dimensions(), (2, 2));
        // (u=1, v=1) → bottom-left
        assert_eq!(img.get_pixel(0, 1).0, [0, 0, 0, 255]);
        // (u=1, v=2) → top-left
        assert_eq!(img.get_pixel(0, 0).0, [255, 255, 255, 255]);
        // NaN at (u=2, v=1) → bottom-right, transparent
        assert_eq!(img.get_pixel(1, 1).0, NAN_PIXEL);
    }

    #[test]
    fn test_normalize_clamps() {
        assert_eq!(normalize(5.0, (0.0, 10.0)), 0.5);
        assert_eq!(normalize(-5.0, (0.0, 10.0)), 0.0);
        assert_eq!(normalize(50.0, (0.0, 10.0)), 1.0);
    }
}
