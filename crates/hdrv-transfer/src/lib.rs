//! # hdrv-transfer
//!
//! Transfer functions that map encoded pixel values to linear light and back.
//!
//! | Variant | Curve | Linear range |
//! |---------|-------|--------------|
//! | `Linear` | identity | any |
//! | `Gamma(g)` | `V^g` | any |
//! | `Srgb` | IEC 61966-2-1 | [0, 1] |
//! | `Bt709` | ITU-R BT.709/601/2020 | [0, 1] |
//! | `St240` | SMPTE ST 240 | [0, 1] |
//! | `Iec61966_2_4` | xvYCC (BT.709 mirrored) | [-1, 1] |
//! | `Pq` | SMPTE ST 2084 | [0, 100], 1.0 = 100 cd/m2 |
//! | `Hlg` | ARIB STD-B67 | [0, 1] |
//! | `DciP3` | gamma 2.6 | [0, 1] |
//! | `Table` | sampled ICC tone curve | table range |
//!
//! ```rust
//! use hdrv_transfer::TransferFunction;
//!
//! let tf = TransferFunction::Srgb;
//! let lin = tf.linearize(0.5);
//! assert!((tf.encode(lin) - 0.5).abs() < 1e-6);
//! ```

pub mod gamma;
pub mod hlg;
pub mod itu;
pub mod pq;
pub mod srgb;
mod table;

pub use table::SampledCurve;

use serde::{Deserialize, Serialize};
use std::fmt;

/// A transfer function between encoded values and linear light.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum TransferFunction {
    /// Already linear.
    Linear,
    /// Pure power law with the given decoding exponent.
    Gamma(f32),
    /// sRGB piecewise curve.
    #[default]
    Srgb,
    /// ITU-R BT.709 camera curve.
    Bt709,
    /// SMPTE ST 240.
    St240,
    /// IEC 61966-2-4 (xvYCC).
    Iec61966_2_4,
    /// SMPTE ST 2084 / BT.2100 PQ.
    Pq,
    /// BT.2100 hybrid log-gamma.
    Hlg,
    /// DCI-P3 gamma 2.6.
    DciP3,
    /// Tabulated curve from an ICC profile.
    Table(SampledCurve),
}

impl TransferFunction {
    /// Decodes one value to linear light.
    #[inline]
    pub fn linearize(&self, v: f32) -> f32 {
        match self {
            Self::Linear => v,
            Self::Gamma(g) => gamma::eotf(v, *g),
            Self::Srgb => srgb::eotf(v),
            Self::Bt709 => itu::bt709_eotf(v),
            Self::St240 => itu::st240_eotf(v),
            Self::Iec61966_2_4 => itu::iec61966_2_4_eotf(v),
            Self::Pq => pq::eotf(v),
            Self::Hlg => hlg::eotf(v),
            Self::DciP3 => gamma::eotf(v, gamma::DCI_GAMMA),
            Self::Table(curve) => curve.eval(v),
        }
    }

    /// Encodes one linear value.
    #[inline]
    pub fn encode(&self, l: f32) -> f32 {
        match self {
            Self::Linear => l,
            Self::Gamma(g) => gamma::oetf(l, *g),
            Self::Srgb => srgb::oetf(l),
            Self::Bt709 => itu::bt709_oetf(l),
            Self::St240 => itu::st240_oetf(l),
            Self::Iec61966_2_4 => itu::iec61966_2_4_oetf(l),
            Self::Pq => pq::oetf(l),
            Self::Hlg => hlg::oetf(l),
            Self::DciP3 => gamma::oetf(l, gamma::DCI_GAMMA),
            Self::Table(curve) => curve.invert(l),
        }
    }

    /// True if linearization is a no-op.
    pub fn is_linear(&self) -> bool {
        match self {
            Self::Linear => true,
            Self::Gamma(g) => (*g - 1.0).abs() < 1e-6,
            _ => false,
        }
    }

    /// Maps an ITU-T H.273 `TransferCharacteristics` code point.
    ///
    /// Returns `None` for codes without a supported curve; callers fall
    /// back to sRGB.
    pub fn from_cicp(code: u8) -> Option<Self> {
        Some(match code {
            1 | 6 | 12 | 14 | 15 => Self::Bt709,
            4 => Self::Gamma(2.2),
            5 => Self::Gamma(2.8),
            7 => Self::St240,
            8 => Self::Linear,
            11 => Self::Iec61966_2_4,
            13 => Self::Srgb,
            16 => Self::Pq,
            17 => Self::DciP3,
            18 => Self::Hlg,
            _ => return None,
        })
    }

    /// Parses a user-facing name. `gamma` is used by `"gamma"`.
    pub fn from_name(name: &str, gamma: f32) -> Option<Self> {
        let key = name.to_ascii_lowercase().replace(['.', '-', '_', ' '], "");
        Some(match key.as_str() {
            "linear" => Self::Linear,
            "gamma" => Self::Gamma(gamma),
            "srgb" => Self::Srgb,
            "bt709" | "rec709" | "itu" | "bt2020" | "bt601" => Self::Bt709,
            "st240" | "smpte240m" => Self::St240,
            "iec6196624" | "xvycc" => Self::Iec61966_2_4,
            "pq" | "st2084" => Self::Pq,
            "hlg" => Self::Hlg,
            "dcip3" | "dci" => Self::DciP3,
            _ => return None,
        })
    }
}

impl fmt::Display for TransferFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linear => f.write_str("Linear"),
            Self::Gamma(g) => write!(f, "Gamma {g}"),
            Self::Srgb => f.write_str("sRGB"),
            Self::Bt709 => f.write_str("BT.709"),
            Self::St240 => f.write_str("SMPTE ST 240"),
            Self::Iec61966_2_4 => f.write_str("IEC 61966-2-4"),
            Self::Pq => f.write_str("BT.2100 PQ"),
            Self::Hlg => f.write_str("BT.2100 HLG"),
            Self::DciP3 => f.write_str("DCI-P3"),
            Self::Table(c) => write!(f, "ICC curve ({} samples)", c.samples().len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn all() -> Vec<TransferFunction> {
        vec![
            TransferFunction::Linear,
            TransferFunction::Gamma(2.2),
            TransferFunction::Gamma(1.8),
            TransferFunction::Srgb,
            TransferFunction::Bt709,
            TransferFunction::St240,
            TransferFunction::Iec61966_2_4,
            TransferFunction::Pq,
            TransferFunction::Hlg,
            TransferFunction::DciP3,
            TransferFunction::Table(SampledCurve::from_fn(1024, |v| v.powf(2.4)).unwrap()),
        ]
    }

    #[test]
    fn encode_then_linearize_roundtrips() {
        for tf in all() {
            for i in 0..=200 {
                let x = i as f32 / 200.0;
                let back = tf.linearize(tf.encode(x));
                assert_abs_diff_eq!(back, x, epsilon = 2e-4);
            }
        }
    }

    #[test]
    fn cicp_mapping() {
        assert_eq!(TransferFunction::from_cicp(13), Some(TransferFunction::Srgb));
        assert_eq!(TransferFunction::from_cicp(16), Some(TransferFunction::Pq));
        assert_eq!(TransferFunction::from_cicp(18), Some(TransferFunction::Hlg));
        assert_eq!(TransferFunction::from_cicp(4), Some(TransferFunction::Gamma(2.2)));
        assert_eq!(TransferFunction::from_cicp(15), Some(TransferFunction::Bt709));
        assert_eq!(TransferFunction::from_cicp(2), None);
    }

    #[test]
    fn names() {
        assert_eq!(TransferFunction::from_name("sRGB", 1.0), Some(TransferFunction::Srgb));
        assert_eq!(TransferFunction::from_name("gamma", 2.4), Some(TransferFunction::Gamma(2.4)));
        assert_eq!(TransferFunction::from_name("log", 1.0), None);
        assert_eq!(TransferFunction::Gamma(2.2).to_string(), "Gamma 2.2");
    }

    #[test]
    fn linear_detection() {
        assert!(TransferFunction::Linear.is_linear());
        assert!(TransferFunction::Gamma(1.0).is_linear());
        assert!(!TransferFunction::Srgb.is_linear());
    }
}
