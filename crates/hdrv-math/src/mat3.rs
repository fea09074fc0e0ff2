//! Row-major 3x3 matrix for color transforms.
//!
//! Storage is delegated to [`glam::Mat3`] (column-major); the public API
//! speaks rows so constants can be copied straight from colorimetry papers:
//!
//! ```text
//! | m00 m01 m02 |   | r |
//! | m10 m11 m12 | * | g |
//! | m20 m21 m22 |   | b |
//! ```

use glam::Vec3;
use std::fmt;
use std::ops::Mul;

/// Determinants below this magnitude are treated as singular.
pub const SINGULAR_EPSILON: f32 = 1e-10;

/// A 3x3 matrix acting on column vectors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat3(glam::Mat3);

impl Mat3 {
    /// Identity matrix.
    pub const IDENTITY: Self = Self(glam::Mat3::IDENTITY);

    /// Builds a matrix from its rows.
    #[inline]
    pub const fn from_rows(r: [[f32; 3]; 3]) -> Self {
        Self(glam::Mat3::from_cols(
            Vec3::new(r[0][0], r[1][0], r[2][0]),
            Vec3::new(r[0][1], r[1][1], r[2][1]),
            Vec3::new(r[0][2], r[1][2], r[2][2]),
        ))
    }

    /// Builds a matrix whose columns are the given vectors.
    #[inline]
    pub const fn from_cols(c0: Vec3, c1: Vec3, c2: Vec3) -> Self {
        Self(glam::Mat3::from_cols(c0, c1, c2))
    }

    /// Diagonal matrix with `d` on the diagonal.
    #[inline]
    pub fn diagonal(d: Vec3) -> Self {
        Self(glam::Mat3::from_diagonal(d))
    }

    /// Element at `row`, `col`.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.0.col(col)[row]
    }

    /// Rows as nested arrays.
    pub fn to_rows(&self) -> [[f32; 3]; 3] {
        self.0.transpose().to_cols_array_2d()
    }

    /// Column `i` as a vector.
    #[inline]
    pub fn col(&self, i: usize) -> Vec3 {
        self.0.col(i)
    }

    /// Determinant.
    #[inline]
    pub fn determinant(&self) -> f32 {
        self.0.determinant()
    }

    /// Inverse, or `None` when the matrix is singular or not finite.
    pub fn try_inverse(&self) -> Option<Self> {
        let det = self.0.determinant();
        if !det.is_finite() || det.abs() < SINGULAR_EPSILON {
            return None;
        }
        let inv = self.0.inverse();
        inv.is_finite().then_some(Self(inv))
    }

    /// Transposed copy.
    #[inline]
    pub fn transpose(&self) -> Self {
        Self(self.0.transpose())
    }

    /// Applies the matrix to an RGB/XYZ triplet.
    #[inline]
    pub fn apply(&self, v: [f32; 3]) -> [f32; 3] {
        (self.0 * Vec3::from_array(v)).to_array()
    }

    /// True if every element is finite.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.0.is_finite()
    }

    /// Element-wise comparison within `eps`.
    pub fn abs_diff_eq(&self, other: &Self, eps: f32) -> bool {
        self.0.abs_diff_eq(other.0, eps)
    }

    /// True if within `eps` of the identity.
    pub fn is_identity(&self, eps: f32) -> bool {
        self.abs_diff_eq(&Self::IDENTITY, eps)
    }
}

impl Default for Mat3 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Mat3 {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        Self(self.0 * rhs.0)
    }
}

impl Mul<Vec3> for Mat3 {
    type Output = Vec3;

    #[inline]
    fn mul(self, rhs: Vec3) -> Vec3 {
        self.0 * rhs
    }
}

impl fmt::Display for Mat3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.to_rows().iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "[{:>9.5} {:>9.5} {:>9.5}]", row[0], row[1], row[2])?;
        }
        Ok(())
    }
}
