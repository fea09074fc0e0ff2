//! Raw color metadata as reported by a decoder.

use hdrv_primaries::{Chromaticities, ColorGamut};
use hdrv_transfer::TransferFunction;

/// ITU-T H.273 coding-independent code points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cicp {
    /// `ColourPrimaries`.
    pub primaries: u8,
    /// `TransferCharacteristics`.
    pub transfer: u8,
    /// `MatrixCoefficients`.
    pub matrix: u8,
    /// Full-range flag.
    pub full_range: bool,
}

impl Cicp {
    /// Gamut for the primaries code, if known.
    pub fn gamut(&self) -> Option<ColorGamut> {
        ColorGamut::from_cicp(self.primaries)
    }

    /// Transfer function for the transfer code, if known.
    pub fn transfer_function(&self) -> Option<TransferFunction> {
        TransferFunction::from_cicp(self.transfer)
    }
}

/// Everything a decoder could find about an image's color encoding.
#[derive(Debug, Clone, Default)]
pub struct ColorMetadata {
    /// Embedded ICC profile bytes.
    pub icc_profile: Option<Vec<u8>>,
    /// CICP code points (PNG `cICP`, AVIF/HEIF `nclx`, ...).
    pub cicp: Option<Cicp>,
    /// Format-native primaries (EXR `chromaticities`, PNG `cHRM`, ...).
    pub chromaticities: Option<Chromaticities>,
    /// Format-native curve (PNG `gAMA`/`sRGB`, or linear for float formats).
    pub transfer: Option<TransferFunction>,
}

impl ColorMetadata {
    /// Metadata for formats that always store linear samples.
    pub fn linear() -> Self {
        Self { transfer: Some(TransferFunction::Linear), ..Self::default() }
    }
}
