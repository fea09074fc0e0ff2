//! SMPTE ST 2084 perceptual quantizer.
//!
//! Linear values are relative to 100 cd/m2: a linear 1.0 is SDR reference
//! white and the PQ peak (10000 cd/m2) decodes to 100.0.

const M1: f32 = 2610.0 / 16384.0;
const M2: f32 = 2523.0 / 4096.0 * 128.0;
const C1: f32 = 3424.0 / 4096.0;
const C2: f32 = 2413.0 / 4096.0 * 32.0;
const C3: f32 = 2392.0 / 4096.0 * 32.0;

/// Peak luminance divided by reference white.
pub const PEAK: f32 = 10000.0 / 100.0;

/// Decodes a PQ signal to linear.
#[inline]
pub fn eotf(v: f32) -> f32 {
    if v <= 0.0 {
        return 0.0;
    }
    let vp = v.powf(1.0 / M2);
    let num = (vp - C1).max(0.0);
    let den = C2 - C3 * vp;
    PEAK * (num / den).powf(1.0 / M1)
}

/// Encodes linear to a PQ signal.
#[inline]
pub fn oetf(l: f32) -> f32 {
    if l <= 0.0 {
        return 0.0;
    }
    let y = (l / PEAK).min(1.0).powf(M1);
    ((C1 + C2 * y) / (1.0 + C3 * y)).powf(M2)
}
