//! ICC profile wrapper.

use crate::tags::chromatic_adaptation;
use crate::{IccError, IccResult};
use hdrv_math::{adaptation_matrix, AdaptationMethod, Vec3};
use hdrv_primaries::{xyz_to_xy, Chromaticities};
use hdrv_transfer::{srgb, SampledCurve, TransferFunction};
use lcms2::{ColorSpaceSignature, Profile as LcmsProfile, Tag, TagSignature, ToneCurveRef};
use tracing::trace;

/// D50 profile connection space white.
pub const PCS_WHITE: Vec3 = Vec3::new(0.9642, 1.0, 0.8249);

/// Samples used when a tone curve is neither sRGB nor a pure power law.
const CURVE_SAMPLES: usize = 1024;

/// Tolerance when matching a tone curve against an analytic one.
const CURVE_MATCH_EPS: f32 = 2e-3;

/// An embedded ICC color profile.
///
/// ```rust
/// use hdrv_icc::{srgb_profile, IccProfile};
/// use hdrv_transfer::TransferFunction;
///
/// let icc = IccProfile::from_icc(&srgb_profile().unwrap()).unwrap();
/// assert_eq!(icc.transfer_function().unwrap(), TransferFunction::Srgb);
/// ```
pub struct IccProfile {
    inner: LcmsProfile,
    chad: Option<hdrv_math::Mat3>,
}

impl IccProfile {
    /// Parses raw ICC bytes.
    pub fn from_icc(data: &[u8]) -> IccResult<Self> {
        let inner = LcmsProfile::new_icc(data).map_err(|e| IccError::InvalidProfile(e.to_string()))?;
        Ok(Self { inner, chad: chromatic_adaptation(data) })
    }

    /// Profile description, or an empty string.
    pub fn description(&self) -> String {
        self.inner
            .info(lcms2::InfoType::Description, lcms2::Locale::none())
            .unwrap_or_default()
    }

    /// True for RGB profiles.
    pub fn is_rgb(&self) -> bool {
        matches!(self.inner.color_space(), ColorSpaceSignature::RgbData)
    }

    /// True for grayscale profiles.
    pub fn is_gray(&self) -> bool {
        matches!(self.inner.color_space(), ColorSpaceSignature::GrayData)
    }

    fn xyz_tag(&self, sig: TagSignature) -> Option<Vec3> {
        match self.inner.read_tag(sig) {
            Tag::CIEXYZ(xyz) => Some(Vec3::new(xyz.X as f32, xyz.Y as f32, xyz.Z as f32)),
            _ => None,
        }
    }

    fn tone_curve(&self, sig: TagSignature) -> Option<&ToneCurveRef> {
        match self.inner.read_tag(sig) {
            Tag::ToneCurve(curve) => Some(curve),
            _ => None,
        }
    }

    /// White point before adaptation to the D50 connection space.
    ///
    /// With a `chad` tag the white is recovered through its inverse;
    /// otherwise the media white point tag is taken as-is.
    pub fn unadapted_white(&self) -> IccResult<Vec3> {
        let white = match self.chad {
            Some(chad) => chad.try_inverse().ok_or(IccError::Degenerate("chad"))? * PCS_WHITE,
            None => self.xyz_tag(TagSignature::MediaWhitePointTag).unwrap_or(PCS_WHITE),
        };
        if white.y <= 0.0 || !white.is_finite() {
            return Err(IccError::Degenerate("white point"));
        }
        Ok(white / white.y)
    }

    /// Primaries and white point of an RGB matrix/TRC profile.
    pub fn chromaticities(&self) -> IccResult<Chromaticities> {
        if !self.is_rgb() {
            return Err(IccError::UnsupportedColorSpace(format!("{:?}", self.inner.color_space())));
        }
        let r = self.xyz_tag(TagSignature::RedColorantTag).ok_or(IccError::MissingTag("rXYZ"))?;
        let g = self.xyz_tag(TagSignature::GreenColorantTag).ok_or(IccError::MissingTag("gXYZ"))?;
        let b = self.xyz_tag(TagSignature::BlueColorantTag).ok_or(IccError::MissingTag("bXYZ"))?;
        let white = self.unadapted_white()?;

        // Colorants are stored adapted to D50; move them back to the native white.
        let undo = adaptation_matrix(AdaptationMethod::Bradford, PCS_WHITE, white);
        let xy = |v: Vec3| xyz_to_xy(undo * v).ok_or(IccError::Degenerate("black colorant"));

        let c = Chromaticities::new(
            xy(r)?,
            xy(g)?,
            xy(b)?,
            xyz_to_xy(white).ok_or(IccError::Degenerate("white point"))?,
        );
        trace!(chromaticities = %c, "ICC colorants");
        Ok(c)
    }

    /// Linearizing curve taken from the red (or gray) TRC.
    pub fn transfer_function(&self) -> IccResult<TransferFunction> {
        let (sig, name) = if self.is_gray() {
            (TagSignature::GrayTRCTag, "kTRC")
        } else {
            (TagSignature::RedTRCTag, "rTRC")
        };
        let curve = self.tone_curve(sig).ok_or(IccError::MissingTag(name))?;
        classify_curve(curve).ok_or(IccError::Degenerate("tone curve"))
    }
}

impl std::fmt::Debug for IccProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IccProfile")
            .field("description", &self.description())
            .field("color_space", &self.inner.color_space())
            .field("chad", &self.chad.is_some())
            .finish()
    }
}

/// Reduces a tone curve to the simplest matching transfer function.
fn classify_curve(curve: &ToneCurveRef) -> Option<TransferFunction> {
    if curve.is_linear() {
        return Some(TransferFunction::Linear);
    }
    let eval = |v: f32| -> f32 { curve.eval(v) };
    let matches = |f: &dyn Fn(f32) -> f32| {
        (0..=64).all(|i| {
            let v = i as f32 / 64.0;
            (eval(v) - f(v)).abs() < CURVE_MATCH_EPS
        })
    };

    if matches(&srgb::eotf) {
        return Some(TransferFunction::Srgb);
    }
    if let Some(gamma) = curve.estimated_gamma(0.01) {
        let gamma = gamma as f32;
        if matches(&|v: f32| v.powf(gamma)) {
            return Some(TransferFunction::Gamma(gamma));
        }
    }
    SampledCurve::from_fn(CURVE_SAMPLES, eval).map(TransferFunction::Table)
}
