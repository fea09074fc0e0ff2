//! Chromatic adaptation.
//!
//! An adaptation matrix maps XYZ under a source white to XYZ under a
//! destination white: `inv(M) * diag(M * dst / M * src) * M`, where `M`
//! converts XYZ into a cone-like response space.

use crate::Mat3;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Bradford cone response matrix.
pub const BRADFORD: Mat3 = Mat3::from_rows([
    [0.8951, 0.2664, -0.1614],
    [-0.7502, 1.7135, 0.0367],
    [0.0389, -0.0685, 1.0296],
]);

/// Von Kries (Hunt-Pointer-Estevez) cone response matrix.
pub const VON_KRIES: Mat3 = Mat3::from_rows([
    [0.40024, 0.70760, -0.08081],
    [-0.22630, 1.16532, 0.04570],
    [0.00000, 0.00000, 0.91822],
]);

/// How to compensate for differing white points between two gamuts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AdaptationMethod {
    /// Convert through XYZ without adapting the white point.
    None,
    /// Scale XYZ directly.
    XyzScaling,
    /// Bradford transform.
    #[default]
    Bradford,
    /// Von Kries transform.
    VonKries,
}

impl AdaptationMethod {
    /// All methods, in menu order.
    pub const ALL: [Self; 4] = [Self::None, Self::XyzScaling, Self::Bradford, Self::VonKries];

    /// Cone response matrix, or `None` for [`AdaptationMethod::None`].
    pub fn cone_matrix(self) -> Option<Mat3> {
        match self {
            Self::None => None,
            Self::XyzScaling => Some(Mat3::IDENTITY),
            Self::Bradford => Some(BRADFORD),
            Self::VonKries => Some(VON_KRIES),
        }
    }

    /// Parses a user-facing name (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().replace(['-', '_', ' '], "").as_str() {
            "none" => Some(Self::None),
            "xyz" | "xyzscaling" => Some(Self::XyzScaling),
            "bradford" => Some(Self::Bradford),
            "vonkries" => Some(Self::VonKries),
            _ => None,
        }
    }
}

impl fmt::Display for AdaptationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::None => "None",
            Self::XyzScaling => "XYZ scaling",
            Self::Bradford => "Bradford",
            Self::VonKries => "Von Kries",
        })
    }
}

/// Matrix adapting XYZ relative to `src_white` into XYZ relative to `dst_white`.
///
/// Returns identity for [`AdaptationMethod::None`] or when the cone matrix
/// cannot be inverted.
pub fn adaptation_matrix(method: AdaptationMethod, src_white: Vec3, dst_white: Vec3) -> Mat3 {
    let Some(cone) = method.cone_matrix() else {
        return Mat3::IDENTITY;
    };
    let Some(cone_inv) = cone.try_inverse() else {
        return Mat3::IDENTITY;
    };
    let src = cone * src_white;
    let dst = cone * dst_white;
    cone_inv * Mat3::diagonal(dst / src) * cone
}
