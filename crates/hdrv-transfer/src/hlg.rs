//! ARIB STD-B67 hybrid log-gamma (BT.2100), scene-linear in [0, 1].

const A: f32 = 0.178_832_77;
const B: f32 = 0.284_668_92;
const C: f32 = 0.559_910_7;

/// Inverse OETF.
#[inline]
pub fn eotf(v: f32) -> f32 {
    if v <= 0.0 {
        0.0
    } else if v <= 0.5 {
        v * v / 3.0
    } else {
        (((v - C) / A).exp() + B) / 12.0
    }
}

/// OETF.
#[inline]
pub fn oetf(l: f32) -> f32 {
    if l <= 0.0 {
        0.0
    } else if l <= 1.0 / 12.0 {
        (3.0 * l).sqrt()
    } else {
        A * (12.0 * l - B).ln() + C
    }
}
