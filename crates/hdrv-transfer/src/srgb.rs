//! sRGB transfer function (IEC 61966-2-1).
//!
//! ```text
//! encode: V = 12.92 * L                   if L <= 0.0031308
//!         V = 1.055 * L^(1/2.4) - 0.055   otherwise
//! decode: L = V / 12.92                   if V <= 0.04045
//!         L = ((V + 0.055) / 1.055)^2.4   otherwise
//! ```
//!
//! Negative values are mirrored so wide-gamut data survives a round trip.

/// Decodes sRGB to linear.
#[inline]
pub fn eotf(v: f32) -> f32 {
    let a = v.abs();
    let l = if a <= 0.04045 { a / 12.92 } else { ((a + 0.055) / 1.055).powf(2.4) };
    l.copysign(v)
}

/// Encodes linear to sRGB.
#[inline]
pub fn oetf(l: f32) -> f32 {
    let a = l.abs();
    let v = if a <= 0.0031308 { a * 12.92 } else { 1.055 * a.powf(1.0 / 2.4) - 0.055 };
    v.copysign(l)
}
