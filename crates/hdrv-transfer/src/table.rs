//! Tabulated tone curves, used for ICC `curv`/`para` tags that do not
//! reduce to a plain gamma.

use serde::{Deserialize, Serialize};

/// Linear-light samples taken at evenly spaced encoded values in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampledCurve {
    samples: Vec<f32>,
}

impl SampledCurve {
    /// Wraps a table. Returns `None` for fewer than two samples or non-finite entries.
    pub fn new(samples: Vec<f32>) -> Option<Self> {
        (samples.len() >= 2 && samples.iter().all(|s| s.is_finite())).then_some(Self { samples })
    }

    /// Tabulates `f` at `n` points.
    pub fn from_fn(n: usize, f: impl Fn(f32) -> f32) -> Option<Self> {
        let last = n.saturating_sub(1).max(1) as f32;
        Self::new((0..n).map(|i| f(i as f32 / last)).collect())
    }

    /// The samples.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Encoded to linear, clamped to the table's domain.
    pub fn eval(&self, v: f32) -> f32 {
        let last = self.samples.len() - 1;
        let x = v.clamp(0.0, 1.0) * last as f32;
        let i = (x.floor() as usize).min(last - 1);
        let t = x - i as f32;
        self.samples[i] + (self.samples[i + 1] - self.samples[i]) * t
    }

    /// Linear to encoded. Assumes a non-decreasing table.
    pub fn invert(&self, l: f32) -> f32 {
        let last = self.samples.len() - 1;
        let hi = self.samples.partition_point(|&s| s < l);
        if hi == 0 {
            return 0.0;
        }
        if hi > last {
            return 1.0;
        }
        let (a, b) = (self.samples[hi - 1], self.samples[hi]);
        let t = if b > a { (l - a) / (b - a) } else { 0.0 };
        ((hi - 1) as f32 + t) / last as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn interpolates_between_samples() {
        let c = SampledCurve::new(vec![0.0, 0.5, 2.0]).unwrap();
        assert_abs_diff_eq!(c.eval(0.25), 0.25);
        assert_abs_diff_eq!(c.eval(0.75), 1.25);
        assert_abs_diff_eq!(c.eval(2.0), 2.0);
        assert_abs_diff_eq!(c.invert(1.25), 0.75);
    }

    #[test]
    fn rejects_degenerate_tables() {
        assert!(SampledCurve::new(vec![1.0]).is_none());
        assert!(SampledCurve::new(vec![0.0, f32::NAN]).is_none());
    }
}
