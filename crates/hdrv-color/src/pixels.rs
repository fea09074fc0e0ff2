//! Bulk operations on interleaved float buffers.

use hdrv_math::Mat3;
use hdrv_transfer::TransferFunction;
use rayon::prelude::*;

/// Number of leading color channels in a pixel of `channels` samples;
/// the trailing alpha, if any, is left alone.
#[inline]
fn color_channels(channels: usize) -> usize {
    match channels {
        2 => 1,
        4 => 3,
        n => n,
    }
}

/// Linearizes the color channels of an interleaved buffer in place.
pub fn linearize_interleaved(data: &mut [f32], channels: usize, tf: &TransferFunction) {
    if channels == 0 || tf.is_linear() {
        return;
    }
    let n = color_channels(channels);
    data.par_chunks_mut(channels).for_each(|px| {
        for v in &mut px[..n] {
            *v = tf.linearize(*v);
        }
    });
}

/// Applies `m` to the first three channels of each pixel.
///
/// Buffers with fewer than three channels are left unchanged.
pub fn apply_matrix_interleaved(data: &mut [f32], channels: usize, m: &Mat3) {
    if channels < 3 || m.is_identity(0.0) {
        return;
    }
    data.par_chunks_mut(channels).for_each(|px| {
        let out = m.apply([px[0], px[1], px[2]]);
        px[..3].copy_from_slice(&out);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn alpha_is_not_linearized() {
        let mut px = vec![0.5, 0.5, 0.5, 0.5];
        linearize_interleaved(&mut px, 4, &TransferFunction::Gamma(2.0));
        assert_abs_diff_eq!(px[0], 0.25);
        assert_abs_diff_eq!(px[2], 0.25);
        assert_eq!(px[3], 0.5);

        let mut ga = vec![0.5, 0.5];
        linearize_interleaved(&mut ga, 2, &TransferFunction::Gamma(2.0));
        assert_eq!(ga, vec![0.25, 0.5]);
    }

    #[test]
    fn matrix_touches_rgb_only() {
        let mut px = vec![1.0, 2.0, 3.0, 0.5];
        let swap = Mat3::from_rows([[0.0, 0.0, 1.0], [0.0, 1.0, 0.0], [1.0, 0.0, 0.0]]);
        apply_matrix_interleaved(&mut px, 4, &swap);
        assert_eq!(px, vec![3.0, 2.0, 1.0, 0.5]);
    }
}
