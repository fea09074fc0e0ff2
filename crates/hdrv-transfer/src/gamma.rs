//! Pure power-law curves.
//!
//! `L = V^gamma`, `V = L^(1/gamma)`, sign-preserving. A gamma of zero or
//! less is treated as linear.

/// Decodes with exponent `gamma`.
#[inline]
pub fn eotf(v: f32, gamma: f32) -> f32 {
    if gamma <= 0.0 {
        return v;
    }
    v.abs().powf(gamma).copysign(v)
}

/// Encodes with exponent `1 / gamma`.
#[inline]
pub fn oetf(l: f32, gamma: f32) -> f32 {
    if gamma <= 0.0 {
        return l;
    }
    l.abs().powf(1.0 / gamma).copysign(l)
}

/// DCI-P3 projector curve, gamma 2.6.
pub const DCI_GAMMA: f32 = 2.6;
