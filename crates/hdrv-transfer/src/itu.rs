//! ITU/SMPTE camera curves: BT.709 (also BT.601 and BT.2020),
//! SMPTE ST 240 and the extended-range IEC 61966-2-4 (xvYCC).

const BT709_ALPHA: f32 = 1.099_296_8;
const BT709_BETA: f32 = 0.018_053_97;

const ST240_ALPHA: f32 = 1.1115;
const ST240_BETA: f32 = 0.0228;

#[inline]
fn encode(l: f32, alpha: f32, beta: f32, slope: f32) -> f32 {
    if l < beta { slope * l } else { alpha * l.powf(0.45) - (alpha - 1.0) }
}

#[inline]
fn decode(v: f32, alpha: f32, beta: f32, slope: f32) -> f32 {
    if v < slope * beta { v / slope } else { ((v + (alpha - 1.0)) / alpha).powf(1.0 / 0.45) }
}

/// BT.709 inverse OETF.
#[inline]
pub fn bt709_eotf(v: f32) -> f32 {
    decode(v, BT709_ALPHA, BT709_BETA, 4.5)
}

/// BT.709 OETF.
#[inline]
pub fn bt709_oetf(l: f32) -> f32 {
    encode(l, BT709_ALPHA, BT709_BETA, 4.5)
}

/// SMPTE ST 240 inverse OETF.
#[inline]
pub fn st240_eotf(v: f32) -> f32 {
    decode(v, ST240_ALPHA, ST240_BETA, 4.0)
}

/// SMPTE ST 240 OETF.
#[inline]
pub fn st240_oetf(l: f32) -> f32 {
    encode(l, ST240_ALPHA, ST240_BETA, 4.0)
}

/// IEC 61966-2-4 inverse OETF: BT.709 mirrored around zero.
#[inline]
pub fn iec61966_2_4_eotf(v: f32) -> f32 {
    bt709_eotf(v.abs()).copysign(v)
}

/// IEC 61966-2-4 OETF.
#[inline]
pub fn iec61966_2_4_oetf(l: f32) -> f32 {
    bt709_oetf(l.abs()).copysign(l)
}
