//! Named gamuts and white points.
//!
//! The set covers what the image decoders can report: the ITU-T H.273
//! (CICP) color-primaries code points plus a few common working spaces.

use crate::Chromaticities;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Named white points (CIE 1931 xy).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WhitePoint {
    /// Illuminant A (tungsten).
    A,
    /// Illuminant C.
    C,
    /// D50, the ICC profile connection space white.
    D50,
    /// D55.
    D55,
    /// D60, the ACES white.
    D60,
    /// D65, the sRGB/Rec.709 white.
    D65,
    /// D75.
    D75,
    /// DCI theatrical white.
    Dci,
    /// Equal-energy illuminant.
    E,
}

impl WhitePoint {
    /// All named white points.
    pub const ALL: [Self; 9] = [Self::A, Self::C, Self::D50, Self::D55, Self::D60, Self::D65, Self::D75, Self::Dci, Self::E];

    /// xy coordinates.
    pub const fn xy(self) -> (f32, f32) {
        match self {
            Self::A => (0.44757, 0.40745),
            Self::C => (0.31006, 0.31616),
            Self::D50 => (0.34567, 0.35850),
            Self::D55 => (0.33242, 0.34743),
            Self::D60 => (0.32168, 0.33767),
            Self::D65 => (0.31270, 0.32900),
            Self::D75 => (0.29902, 0.31485),
            Self::Dci => (0.31400, 0.35100),
            Self::E => (1.0 / 3.0, 1.0 / 3.0),
        }
    }

    /// Display name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::C => "C",
            Self::D50 => "D50",
            Self::D55 => "D55",
            Self::D60 => "D60",
            Self::D65 => "D65",
            Self::D75 => "D75",
            Self::Dci => "DCI",
            Self::E => "E",
        }
    }

    /// Finds the named white point within `eps` of `xy`.
    pub fn identify(xy: (f32, f32), eps: f32) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|w| (w.xy().0 - xy.0).abs() <= eps && (w.xy().1 - xy.1).abs() <= eps)
    }
}

/// Named color gamuts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColorGamut {
    /// ITU-R BT.709 / sRGB.
    Bt709,
    /// ITU-R BT.470 System M.
    Bt470M,
    /// ITU-R BT.470 System B/G (EBU PAL).
    Bt470Bg,
    /// SMPTE 170M / BT.601 525-line.
    Smpte170M,
    /// SMPTE 240M (same primaries as 170M).
    Smpte240M,
    /// Generic film, illuminant C.
    Film,
    /// ITU-R BT.2020 / BT.2100.
    Bt2020,
    /// SMPTE ST 428-1 (CIE XYZ).
    CieXyz,
    /// SMPTE RP 431-2, DCI white.
    DciP3,
    /// SMPTE EG 432-1, D65 white.
    DisplayP3,
    /// EBU Tech. 3213-E.
    Ebu3213,
    /// Adobe RGB (1998).
    AdobeRgb,
    /// ProPhoto / ROMM RGB.
    ProPhoto,
    /// ACES AP0.
    AcesAp0,
    /// ACES AP1.
    AcesAp1,
}

impl ColorGamut {
    /// All gamuts, in menu order.
    pub const ALL: [Self; 15] = [
        Self::Bt709,
        Self::Bt470M,
        Self::Bt470Bg,
        Self::Smpte170M,
        Self::Smpte240M,
        Self::Film,
        Self::Bt2020,
        Self::CieXyz,
        Self::DciP3,
        Self::DisplayP3,
        Self::Ebu3213,
        Self::AdobeRgb,
        Self::ProPhoto,
        Self::AcesAp0,
        Self::AcesAp1,
    ];

    /// Primaries and white point.
    pub const fn chromaticities(self) -> Chromaticities {
        use WhitePoint::*;
        match self {
            Self::Bt709 => Chromaticities::new((0.640, 0.330), (0.300, 0.600), (0.150, 0.060), D65.xy()),
            Self::Bt470M => Chromaticities::new((0.670, 0.330), (0.210, 0.710), (0.140, 0.080), C.xy()),
            Self::Bt470Bg => Chromaticities::new((0.640, 0.330), (0.290, 0.600), (0.150, 0.060), D65.xy()),
            Self::Smpte170M | Self::Smpte240M => {
                Chromaticities::new((0.630, 0.340), (0.310, 0.595), (0.155, 0.070), D65.xy())
            }
            Self::Film => Chromaticities::new((0.681, 0.319), (0.243, 0.692), (0.145, 0.049), C.xy()),
            Self::Bt2020 => Chromaticities::new((0.708, 0.292), (0.170, 0.797), (0.131, 0.046), D65.xy()),
            Self::CieXyz => Chromaticities::new((1.0, 0.0), (0.0, 1.0), (0.0, 0.0), E.xy()),
            Self::DciP3 => Chromaticities::new((0.680, 0.320), (0.265, 0.690), (0.150, 0.060), Dci.xy()),
            Self::DisplayP3 => Chromaticities::new((0.680, 0.320), (0.265, 0.690), (0.150, 0.060), D65.xy()),
            Self::Ebu3213 => Chromaticities::new((0.630, 0.340), (0.295, 0.605), (0.155, 0.077), D65.xy()),
            Self::AdobeRgb => Chromaticities::new((0.640, 0.330), (0.210, 0.710), (0.150, 0.060), D65.xy()),
            Self::ProPhoto => Chromaticities::new((0.7347, 0.2653), (0.1596, 0.8404), (0.0366, 0.0001), D50.xy()),
            Self::AcesAp0 => Chromaticities::new((0.7347, 0.2653), (0.0, 1.0), (0.0001, -0.0770), D60.xy()),
            Self::AcesAp1 => Chromaticities::new((0.713, 0.293), (0.165, 0.830), (0.128, 0.044), D60.xy()),
        }
    }

    /// Display name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bt709 => "BT.709/sRGB",
            Self::Bt470M => "BT.470 M",
            Self::Bt470Bg => "BT.470 BG",
            Self::Smpte170M => "SMPTE 170M",
            Self::Smpte240M => "SMPTE 240M",
            Self::Film => "Generic film",
            Self::Bt2020 => "BT.2020/2100",
            Self::CieXyz => "CIE XYZ",
            Self::DciP3 => "DCI-P3",
            Self::DisplayP3 => "Display P3",
            Self::Ebu3213 => "EBU 3213-E",
            Self::AdobeRgb => "Adobe RGB",
            Self::ProPhoto => "ProPhoto RGB",
            Self::AcesAp0 => "ACES AP0",
            Self::AcesAp1 => "ACES AP1",
        }
    }

    /// Maps an ITU-T H.273 `ColourPrimaries` code point.
    pub const fn from_cicp(code: u8) -> Option<Self> {
        Some(match code {
            1 => Self::Bt709,
            4 => Self::Bt470M,
            5 => Self::Bt470Bg,
            6 => Self::Smpte170M,
            7 => Self::Smpte240M,
            8 => Self::Film,
            9 => Self::Bt2020,
            10 => Self::CieXyz,
            11 => Self::DciP3,
            12 => Self::DisplayP3,
            22 => Self::Ebu3213,
            _ => return None,
        })
    }

    /// Parses a loose name such as `rec2020`, `p3`, `srgb` or `aces`.
    pub fn from_name(name: &str) -> Option<Self> {
        let key = name.to_ascii_lowercase().replace(['.', '-', '_', ' ', '/'], "");
        Some(match key.as_str() {
            "bt709" | "rec709" | "srgb" => Self::Bt709,
            "bt470m" => Self::Bt470M,
            "bt470bg" | "pal" => Self::Bt470Bg,
            "smpte170m" | "bt601" => Self::Smpte170M,
            "smpte240m" => Self::Smpte240M,
            "film" => Self::Film,
            "bt2020" | "rec2020" | "bt2100" => Self::Bt2020,
            "xyz" | "ciexyz" => Self::CieXyz,
            "dcip3" => Self::DciP3,
            "p3" | "displayp3" => Self::DisplayP3,
            "ebu3213" => Self::Ebu3213,
            "adobergb" | "adobe" => Self::AdobeRgb,
            "prophoto" | "romm" => Self::ProPhoto,
            "ap0" | "acesap0" | "aces" => Self::AcesAp0,
            "ap1" | "acesap1" | "acescg" => Self::AcesAp1,
            _ => return None,
        })
    }

    /// Finds the named gamut within `eps` of `c`.
    pub fn identify(c: &Chromaticities, eps: f32) -> Option<Self> {
        Self::ALL.into_iter().find(|g| g.chromaticities().approx_eq(c, eps))
    }
}

impl fmt::Display for ColorGamut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
