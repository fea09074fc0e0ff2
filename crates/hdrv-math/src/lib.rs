//! # hdrv-math
//!
//! Small linear-algebra layer used by the color crates.
//!
//! - [`Mat3`] - row-major 3x3 matrix acting on column vectors, backed by [`glam`]
//! - [`AdaptationMethod`] - chromatic adaptation transforms (XYZ scaling,
//!   Bradford, Von Kries)
//!
//! ```rust
//! use hdrv_math::{Mat3, Vec3};
//!
//! let m = Mat3::from_rows([
//!     [0.4124, 0.3576, 0.1805],
//!     [0.2126, 0.7152, 0.0722],
//!     [0.0193, 0.1192, 0.9505],
//! ]);
//! let xyz = m * Vec3::new(1.0, 1.0, 1.0);
//! assert!((xyz.y - 1.0).abs() < 1e-3);
//! ```

#![warn(missing_docs)]

mod adapt;
mod mat3;

pub use adapt::*;
pub use mat3::*;

pub use glam::Vec3;
