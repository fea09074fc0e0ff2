//! Cached native-to-working color matrix.

use hdrv_math::{AdaptationMethod, Mat3};
use hdrv_primaries::{conversion_matrix, Chromaticities, ColorGamut};
use std::sync::OnceLock;
use tracing::warn;

/// Native chromaticities plus the settings that derive the working-space
/// matrix from them.
///
/// The matrix is computed lazily and cached. Every setter drops the
/// cache, so a stale matrix is never observed.
#[derive(Debug, Clone)]
pub struct ColorTransform {
    chromaticities: Chromaticities,
    working: Chromaticities,
    adaptation: AdaptationMethod,
    keep_native: bool,
    matrix: OnceLock<Mat3>,
}

impl ColorTransform {
    /// Transform from `chromaticities` into linear Rec.709.
    pub fn new(chromaticities: Chromaticities, adaptation: AdaptationMethod) -> Self {
        Self {
            chromaticities,
            working: ColorGamut::Bt709.chromaticities(),
            adaptation,
            keep_native: false,
            matrix: OnceLock::new(),
        }
    }

    /// Native chromaticities.
    pub fn chromaticities(&self) -> &Chromaticities {
        &self.chromaticities
    }

    /// Working-space chromaticities.
    pub fn working(&self) -> &Chromaticities {
        &self.working
    }

    /// Adaptation method.
    pub fn adaptation(&self) -> AdaptationMethod {
        self.adaptation
    }

    /// Whether conversion is skipped.
    pub fn keep_native(&self) -> bool {
        self.keep_native
    }

    /// Replaces the native primaries and white point.
    pub fn set_chromaticities(&mut self, c: Chromaticities) {
        self.chromaticities = c;
        self.invalidate();
    }

    /// Replaces only the native white point.
    pub fn set_white_point(&mut self, white: (f32, f32)) {
        self.chromaticities = self.chromaticities.with_white(white);
        self.invalidate();
    }

    /// Changes the adaptation method.
    pub fn set_adaptation(&mut self, method: AdaptationMethod) {
        self.adaptation = method;
        self.invalidate();
    }

    /// Toggles skipping the working-space conversion.
    pub fn set_keep_native(&mut self, keep: bool) {
        self.keep_native = keep;
        self.invalidate();
    }

    /// True until [`ColorTransform::matrix`] has been called since the last edit.
    pub fn is_stale(&self) -> bool {
        self.matrix.get().is_none()
    }

    fn invalidate(&mut self) {
        self.matrix = OnceLock::new();
    }

    /// Matrix taking native linear RGB to working linear RGB.
    ///
    /// Falls back to identity, with a warning, when the chromaticities
    /// are degenerate.
    pub fn matrix(&self) -> Mat3 {
        *self.matrix.get_or_init(|| {
            if self.keep_native {
                return Mat3::IDENTITY;
            }
            conversion_matrix(&self.chromaticities, &self.working, self.adaptation).unwrap_or_else(|| {
                warn!(
                    chromaticities = %self.chromaticities,
                    "Singular color matrix, using identity"
                );
                Mat3::IDENTITY
            })
        })
    }
}

impl Default for ColorTransform {
    fn default() -> Self {
        Self::new(ColorGamut::Bt709.chromaticities(), AdaptationMethod::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use hdrv_primaries::WhitePoint;

    #[test]
    fn edits_invalidate_cached_matrix() {
        let mut t = ColorTransform::default();
        assert!(t.is_stale());
        assert!(t.matrix().is_identity(1e-5));
        assert!(!t.is_stale());

        t.set_chromaticities(ColorGamut::Bt2020.chromaticities());
        assert!(t.is_stale());
        let m = t.matrix();
        assert!(!m.is_identity(1e-2));
        // BT.2020 red is outside Rec.709
        assert!(m.apply([1.0, 0.0, 0.0])[0] > 1.0);

        t.set_white_point(WhitePoint::D50.xy());
        assert!(t.is_stale());
        t.matrix();
        t.set_adaptation(AdaptationMethod::VonKries);
        assert!(t.is_stale());
    }

    #[test]
    fn keep_native_is_identity() {
        let mut t = ColorTransform::new(ColorGamut::Bt2020.chromaticities(), AdaptationMethod::Bradford);
        t.set_keep_native(true);
        assert!(t.matrix().is_identity(0.0));
    }

    #[test]
    fn singular_falls_back_to_identity() {
        let c = Chromaticities::new((0.3, 0.3), (0.3, 0.3), (0.3, 0.3), WhitePoint::D65.xy());
        let t = ColorTransform::new(c, AdaptationMethod::Bradford);
        assert!(t.matrix().is_identity(0.0));
    }

    #[test]
    fn white_is_preserved_across_whites() {
        let t = ColorTransform::new(ColorGamut::DciP3.chromaticities(), AdaptationMethod::Bradford);
        let w = t.matrix().apply([1.0, 1.0, 1.0]);
        assert_abs_diff_eq!(w[0], 1.0, epsilon = 2e-3);
        assert_abs_diff_eq!(w[1], 1.0, epsilon = 2e-3);
        assert_abs_diff_eq!(w[2], 1.0, epsilon = 2e-3);
    }
}
