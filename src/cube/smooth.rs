use ndarray::{Array1, Array2, Axis};

use super::model::Spectrum;

// ---------------------------------------------------------------------------
// Gaussian smoothing
// ---------------------------------------------------------------------------

/// Normalised Gaussian kernel with radius `ceil(3σ)`, capped at `max_radius`.
///
/// Taps beyond the lane length only repeat edge samples, so callers pass the
/// lane length as the cap.
pub fn gaussian_kernel(sigma: f64, max_radius: usize) -> Vec<f64> {
    let radius = ((3.0 * sigma).ceil().max(0.0) as usize).min(max_radius);
    let weights: Vec<f64> = (0..=2 * radius)
        .map(|t| {
            let x = t as f64 - radius as f64;
            (-(x * x) / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let total: f64 = weights.iter().sum();
    weights.into_iter().map(|w| w / total).collect()
}

/// Widths that leave the data untouched: zero, negative and non-finite.
fn is_identity_width(sigma: f64) -> bool {
    !(sigma.is_finite() && sigma > 0.0)
}

/// Convolve with edge replication. NaN samples stay NaN and are skipped as
/// neighbours, with the remaining weights renormalised.
fn convolve(values: &[f64], kernel: &[f64]) -> Vec<f64> {
    let n = values.len();
    let radius = kernel.len() / 2;
    (0..n)
        .map(|centre| {
            if values[centre].is_nan() {
                return f64::NAN;
            }
            let mut acc = 0.0;
            let mut weight = 0.0;
            for (t, &w) in kernel.iter().enumerate() {
                let idx = (centre + t).saturating_sub(radius).min(n - 1);
                let x = values[idx];
                if x.is_nan() {
                    continue;
                }
                acc += w * x;
                weight += w;
            }
            if weight > 0.0 {
                acc / weight
            } else {
                f64::NAN
            }
        })
        .collect()
}

/// Smooth a 1D trace. A `sigma` that is not finite and positive returns the
/// input unchanged.
pub fn gaussian_smooth_1d(values: &[f64], sigma: f64) -> Vec<f64> {
    if is_identity_width(sigma) || values.is_empty() {
        return values.to_vec();
    }
    convolve(values, &gaussian_kernel(sigma, values.len()))
}

/// Separable 2D smoothing of a slice (rows, then columns).
pub fn gaussian_smooth(slice: &Array2<f64>, sigma: f64) -> Array2<f64> {
    let mut out = slice.to_owned();
    if is_identity_width(sigma) || out.is_empty() {
        return out;
    }
    for axis in [Axis(1), Axis(0)] {
        let kernel = gaussian_kernel(sigma, out.len_of(axis));
        for mut lane in out.lanes_mut(axis) {
            let smoothed = convolve(&lane.to_vec(), &kernel);
            lane.assign(&Array1::from(smoothed));
        }
    }
    out
}

impl Spectrum {
    /// Trace smoothed along its positions.
    pub fn smoothed(&self, sigma: f64) -> Spectrum {
        self.with_values(gaussian_smooth_1d(&self.values, sigma))
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use ndarray::array;

    use super::*;

    #[test]
    fn test_kernel_is_normalised_and_symmetric() {
        let k = gaussian_kernel(1.5, 100);
        assert_eq!(k.len(), 11);
        assert_relative_eq!(k.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(k[0], k[10]);
        assert!(k[5] > k[4]);
    }

    #[test]
    fn test_constant_signal_unchanged() {
        let out = gaussian_smooth_1d(&[3.0; 8], 2.0);
        for v in out {
            assert_relative_eq!(v, 3.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_impulse_spreads() {
        let mut x = vec![0.0; 9];
        x[4] = 1.0;
        let out = gaussian_smooth_1d(&x, 1.0);
        assert!(out[4] < 1.0);
        assert!(out[3] > 0.0);
        assert_relative_eq!(out[3], out[5], epsilon = 1e-12);
    }

    #[test]
    fn test_nan_samples_are_kept_and_skipped() {
        let out = gaussian_smooth_1d(&[1.0, f64::NAN, 1.0, 1.0], 1.0);
        assert!(out[1].is_nan());
        for i in [0, 2, 3] {
            assert_relative_eq!(out[i], 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_kernel_radius_capped_at_lane_length() {
        let k = gaussian_kernel(1e6, 4);
        assert_eq!(k.len(), 9);
        assert_relative_eq!(k.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_huge_sigma_flattens_without_blowing_up() {
        let out = gaussian_smooth_1d(&[0.0, 2.0, 4.0], 1e12);
        assert_eq!(out.len(), 3);
        assert!(out.iter().all(|v| v.is_finite()));
        assert_relative_eq!(out[1], 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_non_finite_sigma_is_identity() {
        let slice = array![[1.0, 5.0, 2.0], [2.0, -3.0, 0.5]];
        for sigma in [f64::INFINITY, f64::NEG_INFINITY, f64::NAN] {
            assert_eq!(gaussian_smooth(&slice, sigma), slice);
            assert_eq!(gaussian_smooth_1d(&[1.0, 2.0], sigma), vec![1.0, 2.0]);
        }
    }

    #[test]
    fn test_zero_sigma_is_identity() {
        let slice = array![[1.0, 5.0], [2.0, -3.0]];
        assert_eq!(gaussian_smooth(&slice, 0.0), slice);
    }

    #[test]
    fn test_2d_smoothing_keeps_shape_and_mean_of_constant() {
        let slice = Array2::from_elem((4, 6), 2.5);
        let out = gaussian_smooth(&slice, 1.0);
        assert_eq!(out.dim(), (4, 6));
        for &v in &out {
            assert_relative_eq!(v, 2.5, epsilon = 1e-12);
        }
    }
}
