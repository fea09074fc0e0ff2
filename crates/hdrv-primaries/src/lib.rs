//! # hdrv-primaries
//!
//! Color primaries and white points, and the RGB/XYZ matrices derived
//! from them.
//!
//! A gamut is described by [`Chromaticities`]: CIE 1931 xy coordinates of
//! the red, green and blue primaries plus the white point. From these we
//! derive the normalized primary matrix (RGB to XYZ, Y of white = 1) and
//! its inverse.
//!
//! ```rust
//! use hdrv_primaries::{conversion_matrix, ColorGamut};
//! use hdrv_math::AdaptationMethod;
//!
//! let p3 = ColorGamut::DisplayP3.chromaticities();
//! let rec709 = ColorGamut::Bt709.chromaticities();
//! let m = conversion_matrix(&p3, &rec709, AdaptationMethod::Bradford).unwrap();
//! // P3 white stays white
//! let w = m.apply([1.0, 1.0, 1.0]);
//! assert!((w[0] - 1.0).abs() < 1e-4);
//! ```
//!
//! # Used By
//!
//! - `hdrv-icc` - primaries recovered from ICC colorant tags
//! - `hdrv-color` - working-space matrix resolution

#![warn(missing_docs)]

mod gamut;

pub use gamut::*;

use hdrv_math::{adaptation_matrix, AdaptationMethod, Mat3, Vec3};
use serde::{Deserialize, Serialize};
use std::fmt;

/// CIE 1931 xy coordinates of three primaries and a white point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Chromaticities {
    /// Red primary.
    pub red: (f32, f32),
    /// Green primary.
    pub green: (f32, f32),
    /// Blue primary.
    pub blue: (f32, f32),
    /// White point.
    pub white: (f32, f32),
}

impl Chromaticities {
    /// Creates chromaticities from xy pairs.
    pub const fn new(red: (f32, f32), green: (f32, f32), blue: (f32, f32), white: (f32, f32)) -> Self {
        Self { red, green, blue, white }
    }

    /// Same primaries with a different white point.
    pub const fn with_white(self, white: (f32, f32)) -> Self {
        Self { white, ..self }
    }

    /// White point as XYZ with Y = 1.
    pub fn white_xyz(&self) -> Vec3 {
        xy_to_xyz(self.white)
    }

    /// Compares all coordinates within `eps`.
    pub fn approx_eq(&self, other: &Self, eps: f32) -> bool {
        let close = |a: (f32, f32), b: (f32, f32)| (a.0 - b.0).abs() <= eps && (a.1 - b.1).abs() <= eps;
        close(self.red, other.red)
            && close(self.green, other.green)
            && close(self.blue, other.blue)
            && close(self.white, other.white)
    }
}

impl Default for Chromaticities {
    fn default() -> Self {
        ColorGamut::Bt709.chromaticities()
    }
}

impl fmt::Display for Chromaticities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "R({:.4}, {:.4}) G({:.4}, {:.4}) B({:.4}, {:.4}) W({:.4}, {:.4})",
            self.red.0, self.red.1, self.green.0, self.green.1, self.blue.0, self.blue.1, self.white.0, self.white.1
        )
    }
}

/// xy chromaticity to XYZ with Y = 1.
pub fn xy_to_xyz((x, y): (f32, f32)) -> Vec3 {
    if y.abs() < 1e-10 {
        Vec3::ZERO
    } else {
        Vec3::new(x / y, 1.0, (1.0 - x - y) / y)
    }
}

/// XYZ to xy chromaticity. Returns `None` for black.
pub fn xyz_to_xy(xyz: Vec3) -> Option<(f32, f32)> {
    let sum = xyz.x + xyz.y + xyz.z;
    (sum.abs() > 1e-10).then(|| (xyz.x / sum, xyz.y / sum))
}

/// Normalized primary matrix: linear RGB to XYZ.
///
/// Returns `None` when the primaries are collinear (singular matrix).
pub fn rgb_to_xyz_matrix(c: &Chromaticities) -> Option<Mat3> {
    let r = xy_to_xyz(c.red);
    let g = xy_to_xyz(c.green);
    let b = xy_to_xyz(c.blue);
    let w = c.white_xyz();

    let s = Mat3::from_cols(r, g, b).try_inverse()? * w;
    let m = Mat3::from_cols(r * s.x, g * s.y, b * s.z);
    m.is_finite().then_some(m)
}

/// Inverse of [`rgb_to_xyz_matrix`].
pub fn xyz_to_rgb_matrix(c: &Chromaticities) -> Option<Mat3> {
    rgb_to_xyz_matrix(c)?.try_inverse()
}

/// Matrix converting linear RGB in `src` to linear RGB in `dst`.
///
/// When the white points differ, the XYZ step is adapted with `method`.
pub fn conversion_matrix(src: &Chromaticities, dst: &Chromaticities, method: AdaptationMethod) -> Option<Mat3> {
    let to_xyz = rgb_to_xyz_matrix(src)?;
    let from_xyz = xyz_to_rgb_matrix(dst)?;
    let adapt = if src.white == dst.white {
        Mat3::IDENTITY
    } else {
        adaptation_matrix(method, src.white_xyz(), dst.white_xyz())
    };
    let m = from_xyz * adapt * to_xyz;
    m.is_finite().then_some(m)
}
