//! Synthesized RGB profiles.

use crate::{IccError, IccResult};
use hdrv_primaries::Chromaticities;
use lcms2::{CIExyY, CIExyYTRIPLE, Profile as LcmsProfile, ToneCurve};

fn xyy((x, y): (f32, f32)) -> CIExyY {
    CIExyY { x: x as f64, y: y as f64, Y: 1.0 }
}

/// Serialized sRGB profile as produced by lcms2.
pub fn srgb_profile() -> IccResult<Vec<u8>> {
    LcmsProfile::new_srgb().icc().map_err(|e| IccError::CreateFailed(e.to_string()))
}

/// Serialized matrix/TRC profile with the given primaries and a pure gamma curve.
pub fn rgb_profile(c: &Chromaticities, gamma: f64) -> IccResult<Vec<u8>> {
    let primaries = CIExyYTRIPLE {
        Red: xyy(c.red),
        Green: xyy(c.green),
        Blue: xyy(c.blue),
    };
    let curve = ToneCurve::new(gamma);
    let curves = [&curve, &curve, &curve];
    let profile = LcmsProfile::new_rgb(&xyy(c.white), &primaries, &curves)
        .map_err(|e| IccError::CreateFailed(e.to_string()))?;
    profile.icc().map_err(|e| IccError::CreateFailed(e.to_string()))
}
