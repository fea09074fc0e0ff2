//! Priority resolution of transfer function and primaries.

use crate::{ColorMetadata, ColorTransform};
use hdrv_icc::IccProfile;
use hdrv_math::AdaptationMethod;
use hdrv_primaries::{Chromaticities, ColorGamut};
use hdrv_transfer::TransferFunction;
use std::fmt;
use tracing::{debug, warn};

/// Where a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorSource {
    /// Explicitly requested by the caller.
    Override,
    /// Embedded ICC profile.
    Icc,
    /// CICP code points.
    Cicp,
    /// Format-native record.
    Native,
    /// Nothing usable; sRGB / Rec.709 assumed.
    Assumed,
}

impl fmt::Display for ColorSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Override => "override",
            Self::Icc => "ICC profile",
            Self::Cicp => "CICP",
            Self::Native => "file",
            Self::Assumed => "assumed",
        })
    }
}

/// Caller-supplied overrides.
#[derive(Debug, Clone, Default)]
pub struct ColorOverrides {
    /// Replaces any detected transfer function.
    pub transfer: Option<TransferFunction>,
    /// Replaces any detected primaries.
    pub gamut: Option<ColorGamut>,
    /// Linearize only; leave samples in their native primaries.
    pub keep_native_primaries: bool,
    /// Adaptation used when white points differ.
    pub adaptation: AdaptationMethod,
}

/// Outcome of [`resolve`].
#[derive(Debug, Clone)]
pub struct ResolvedColor {
    /// Linearizing curve.
    pub transfer: TransferFunction,
    /// Origin of `transfer`.
    pub transfer_source: ColorSource,
    /// Native primaries and white point.
    pub chromaticities: Chromaticities,
    /// Origin of `chromaticities`.
    pub primaries_source: ColorSource,
    /// Description of the ICC profile that contributed, if any.
    pub icc_description: Option<String>,
    /// Whether conversion into the working space is skipped.
    pub keep_native_primaries: bool,
    /// Adaptation for the working-space conversion.
    pub adaptation: AdaptationMethod,
}

impl ResolvedColor {
    /// Fresh working-space transform for these chromaticities.
    pub fn transform(&self) -> ColorTransform {
        let mut t = ColorTransform::new(self.chromaticities, self.adaptation);
        t.set_keep_native(self.keep_native_primaries);
        t
    }

    /// One-line human description, e.g. `sRGB (ICC profile)`.
    pub fn transfer_description(&self) -> String {
        format!("{} ({})", self.transfer, self.transfer_source)
    }

    /// Named gamut for the chromaticities, or their coordinates.
    pub fn gamut_description(&self) -> String {
        let name = ColorGamut::identify(&self.chromaticities, 1e-3)
            .map(|g| g.name().to_string())
            .unwrap_or_else(|| self.chromaticities.to_string());
        format!("{name} ({})", self.primaries_source)
    }
}

/// Resolves transfer function and primaries from `meta`.
///
/// Each component falls through independently: override, ICC, CICP,
/// native, assumed. A profile that cannot be parsed is logged and
/// skipped; it never fails the load.
pub fn resolve(meta: &ColorMetadata, overrides: &ColorOverrides) -> ResolvedColor {
    let icc = meta.icc_profile.as_deref().and_then(|bytes| match IccProfile::from_icc(bytes) {
        Ok(p) => Some(p),
        Err(e) => {
            warn!("Ignoring embedded ICC profile: {e}");
            None
        }
    });

    let (transfer, transfer_source) = resolve_transfer(meta, overrides, icc.as_ref());
    let (chromaticities, primaries_source) = resolve_primaries(meta, overrides, icc.as_ref());

    debug!(
        transfer = %transfer,
        %transfer_source,
        chromaticities = %chromaticities,
        %primaries_source,
        "Resolved color encoding"
    );

    ResolvedColor {
        transfer,
        transfer_source,
        chromaticities,
        primaries_source,
        icc_description: icc.map(|p| p.description()),
        keep_native_primaries: overrides.keep_native_primaries,
        adaptation: overrides.adaptation,
    }
}

fn resolve_transfer(
    meta: &ColorMetadata,
    overrides: &ColorOverrides,
    icc: Option<&IccProfile>,
) -> (TransferFunction, ColorSource) {
    if let Some(tf) = &overrides.transfer {
        return (tf.clone(), ColorSource::Override);
    }
    if let Some(icc) = icc {
        match icc.transfer_function() {
            Ok(tf) => return (tf, ColorSource::Icc),
            Err(e) => warn!("ICC profile has no usable tone curve: {e}"),
        }
    }
    if let Some(cicp) = &meta.cicp {
        match cicp.transfer_function() {
            Some(tf) => return (tf, ColorSource::Cicp),
            None => warn!("CICP transfer characteristics {} not supported", cicp.transfer),
        }
    }
    if let Some(tf) = &meta.transfer {
        return (tf.clone(), ColorSource::Native);
    }
    (TransferFunction::Srgb, ColorSource::Assumed)
}

fn resolve_primaries(
    meta: &ColorMetadata,
    overrides: &ColorOverrides,
    icc: Option<&IccProfile>,
) -> (Chromaticities, ColorSource) {
    if let Some(gamut) = overrides.gamut {
        return (gamut.chromaticities(), ColorSource::Override);
    }
    if let Some(icc) = icc {
        match icc.chromaticities() {
            Ok(c) => return (c, ColorSource::Icc),
            Err(e) => warn!("ICC profile has no usable primaries: {e}"),
        }
    }
    if let Some(cicp) = &meta.cicp {
        match cicp.gamut() {
            Some(g) => return (g.chromaticities(), ColorSource::Cicp),
            None => warn!("CICP color primaries {} not supported", cicp.primaries),
        }
    }
    if let Some(c) = meta.chromaticities {
        return (c, ColorSource::Native);
    }
    (ColorGamut::Bt709.chromaticities(), ColorSource::Assumed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Cicp;
    use hdrv_icc::{rgb_profile, srgb_profile};

    fn cicp(primaries: u8, transfer: u8) -> Cicp {
        Cicp { primaries, transfer, matrix: 0, full_range: true }
    }

    #[test]
    fn no_metadata_is_assumed_srgb() {
        let r = resolve(&ColorMetadata::default(), &ColorOverrides::default());
        assert_eq!(r.transfer, TransferFunction::Srgb);
        assert_eq!(r.transfer_source, ColorSource::Assumed);
        assert_eq!(r.primaries_source, ColorSource::Assumed);
        assert!(r.transform().matrix().is_identity(1e-5));
        assert_eq!(r.transfer_description(), "sRGB (assumed)");
    }

    #[test]
    fn srgb_icc_gives_identity() {
        let meta = ColorMetadata { icc_profile: Some(srgb_profile().unwrap()), ..Default::default() };
        let r = resolve(&meta, &ColorOverrides::default());
        assert_eq!(r.transfer_source, ColorSource::Icc);
        assert_eq!(r.primaries_source, ColorSource::Icc);
        assert!(r.transform().matrix().is_identity(2e-3));
    }

    #[test]
    fn override_beats_icc() {
        let meta = ColorMetadata { icc_profile: Some(srgb_profile().unwrap()), ..Default::default() };
        let overrides = ColorOverrides {
            transfer: Some(TransferFunction::Gamma(1.8)),
            gamut: Some(ColorGamut::Bt2020),
            ..Default::default()
        };
        let r = resolve(&meta, &overrides);
        assert_eq!(r.transfer, TransferFunction::Gamma(1.8));
        assert_eq!(r.transfer_source, ColorSource::Override);
        assert_eq!(r.chromaticities, ColorGamut::Bt2020.chromaticities());
    }

    #[test]
    fn icc_beats_cicp_and_cicp_beats_native() {
        let p3 = ColorGamut::DisplayP3.chromaticities();
        let meta = ColorMetadata {
            icc_profile: Some(rgb_profile(&p3, 1.0).unwrap()),
            cicp: Some(cicp(9, 16)),
            chromaticities: Some(ColorGamut::AcesAp0.chromaticities()),
            transfer: Some(TransferFunction::Gamma(2.2)),
        };
        let r = resolve(&meta, &ColorOverrides::default());
        assert_eq!(r.primaries_source, ColorSource::Icc);
        assert_eq!(r.transfer, TransferFunction::Linear);

        let meta = ColorMetadata { icc_profile: None, ..meta };
        let r = resolve(&meta, &ColorOverrides::default());
        assert_eq!(r.chromaticities, ColorGamut::Bt2020.chromaticities());
        assert_eq!(r.transfer, TransferFunction::Pq);
        assert_eq!(r.transfer_source, ColorSource::Cicp);

        let meta = ColorMetadata { cicp: None, ..meta };
        let r = resolve(&meta, &ColorOverrides::default());
        assert_eq!(r.primaries_source, ColorSource::Native);
        assert_eq!(r.transfer, TransferFunction::Gamma(2.2));
    }

    #[test]
    fn malformed_icc_falls_through() {
        let meta = ColorMetadata {
            icc_profile: Some(vec![0u8; 64]),
            cicp: Some(cicp(12, 13)),
            ..Default::default()
        };
        let r = resolve(&meta, &ColorOverrides::default());
        assert_eq!(r.icc_description, None);
        assert_eq!(r.transfer_source, ColorSource::Cicp);
        assert_eq!(r.chromaticities, ColorGamut::DisplayP3.chromaticities());
    }

    #[test]
    fn unknown_cicp_codes_fall_through() {
        let meta = ColorMetadata { cicp: Some(cicp(2, 2)), ..ColorMetadata::linear() };
        let r = resolve(&meta, &ColorOverrides::default());
        assert_eq!(r.transfer, TransferFunction::Linear);
        assert_eq!(r.transfer_source, ColorSource::Native);
        assert_eq!(r.primaries_source, ColorSource::Assumed);
    }
}
