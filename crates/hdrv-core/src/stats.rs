//! Per-channel pixel statistics.

use rayon::prelude::*;

/// Number of histogram bins.
pub const NUM_BINS: usize = 256;

const CHUNK: usize = 16 * 1024;

/// Summary statistics and a histogram of one channel.
///
/// NaN and infinite samples are counted but excluded from the minimum,
/// maximum, average and histogram.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelStats {
    /// Smallest finite sample (`+inf` if there are none).
    pub minimum: f32,
    /// Largest finite sample (`-inf` if there are none).
    pub maximum: f32,
    /// Mean of finite samples.
    pub average: f32,
    /// NaN samples.
    pub nan_pixels: usize,
    /// Infinite samples.
    pub inf_pixels: usize,
    /// Finite samples.
    pub valid_pixels: usize,
    /// Counts over `NUM_BINS` equal bins spanning `[minimum, maximum]`.
    pub histogram: Vec<u32>,
}

#[derive(Clone, Copy)]
struct Partial {
    min: f32,
    max: f32,
    sum: f64,
    nan: usize,
    inf: usize,
    valid: usize,
}

impl Partial {
    const EMPTY: Self = Self { min: f32::INFINITY, max: f32::NEG_INFINITY, sum: 0.0, nan: 0, inf: 0, valid: 0 };

    fn add(mut self, v: f32) -> Self {
        if v.is_nan() {
            self.nan += 1;
        } else if v.is_infinite() {
            self.inf += 1;
        } else {
            self.min = self.min.min(v);
            self.max = self.max.max(v);
            self.sum += v as f64;
            self.valid += 1;
        }
        self
    }

    fn merge(self, o: Self) -> Self {
        Self {
            min: self.min.min(o.min),
            max: self.max.max(o.max),
            sum: self.sum + o.sum,
            nan: self.nan + o.nan,
            inf: self.inf + o.inf,
            valid: self.valid + o.valid,
        }
    }
}

impl ChannelStats {
    /// Computes statistics over `data`.
    pub fn compute(data: &[f32]) -> Self {
        let p = data
            .par_chunks(CHUNK)
            .map(|c| c.iter().fold(Partial::EMPTY, |p, &v| p.add(v)))
            .reduce(|| Partial::EMPTY, Partial::merge);

        let average = if p.valid > 0 { (p.sum / p.valid as f64) as f32 } else { 0.0 };

        let histogram = if p.valid == 0 {
            vec![0; NUM_BINS]
        } else {
            let (lo, span) = (p.min, (p.max - p.min).max(f32::MIN_POSITIVE));
            data.par_chunks(CHUNK)
                .map(|c| {
                    let mut bins = vec![0u32; NUM_BINS];
                    for &v in c.iter().filter(|v| v.is_finite()) {
                        let bin = (((v - lo) / span) * NUM_BINS as f32) as usize;
                        bins[bin.min(NUM_BINS - 1)] += 1;
                    }
                    bins
                })
                .reduce(
                    || vec![0u32; NUM_BINS],
                    |mut a, b| {
                        a.iter_mut().zip(b).for_each(|(x, y)| *x += y);
                        a
                    },
                )
        };

        Self {
            minimum: p.min,
            maximum: p.max,
            average,
            nan_pixels: p.nan,
            inf_pixels: p.inf,
            valid_pixels: p.valid,
            histogram,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn summary_skips_non_finite() {
        let s = ChannelStats::compute(&[1.0, f32::NAN, 3.0, f32::INFINITY, -2.0]);
        assert_eq!(s.minimum, -2.0);
        assert_eq!(s.maximum, 3.0);
        assert_abs_diff_eq!(s.average, 2.0 / 3.0, epsilon = 1e-6);
        assert_eq!((s.nan_pixels, s.inf_pixels, s.valid_pixels), (1, 1, 3));
        assert_eq!(s.histogram.iter().sum::<u32>(), 3);
        assert_eq!(s.histogram[0], 1);
        assert_eq!(s.histogram[NUM_BINS - 1], 1);
    }

    #[test]
    fn constant_channel() {
        let s = ChannelStats::compute(&vec![0.5; 100_000]);
        assert_eq!(s.minimum, 0.5);
        assert_eq!(s.maximum, 0.5);
        assert_eq!(s.histogram[0], 100_000);
    }

    #[test]
    fn empty_channel() {
        let s = ChannelStats::compute(&[]);
        assert_eq!(s.valid_pixels, 0);
        assert_eq!(s.average, 0.0);
    }
}
