// Small descriptive-statistics helpers shared by the validator, pillars, and
// calibration.

/// Mean and standard deviation for a set of values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoolStats {
    pub mean: f64,
    pub stdev: f64,
}

/// Threshold below which standard deviation is treated as zero.
pub(crate) const STDEV_EPSILON: f64 = 1e-9;

/// Compute mean and population standard deviation (N denominator).
///
/// Returns `PoolStats { mean: 0.0, stdev: 0.0 }` for an empty slice.
pub fn compute_pool_stats(values: &[f64]) -> PoolStats {
    if values.is_empty() {
        return PoolStats {
            mean: 0.0,
            stdev: 0.0,
        };
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    PoolStats {
        mean,
        stdev: variance.sqrt(),
    }
}

/// Z-score of `value` against `stats`; 0.0 when the spread is ~zero.
pub fn compute_zscore(value: f64, stats: &PoolStats) -> f64 {
    if stats.stdev < STDEV_EPSILON {
        return 0.0;
    }
    (value - stats.mean) / stats.stdev
}

/// Coefficient of variation, `None` when the mean is not positive.
pub fn coefficient_of_variation(values: &[f64]) -> Option<f64> {
    let stats = compute_pool_stats(values);
    if values.is_empty() || stats.mean <= STDEV_EPSILON {
        return None;
    }
    Some(stats.stdev / stats.mean)
}

/// Percentile of ascending-sorted values with linear interpolation between
/// closest ranks. `p` is a fraction in 0.0..=1.0.
///
/// Returns NaN for an empty slice.
pub fn percentile(sorted_values: &[f64], p: f64) -> f64 {
    if sorted_values.is_empty() {
        return f64::NAN;
    }
    let rank = p.clamp(0.0, 1.0) * (sorted_values.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    sorted_values[lo] + (sorted_values[hi] - sorted_values[lo]) * frac
}

/// Linearly map `value` from `[floor, ceiling]` onto `[0, 100]`, clamped at
/// both ends. An inverted range (`floor > ceiling`) rewards low values.
pub fn rescale(value: f64, floor: f64, ceiling: f64) -> f64 {
    let span = ceiling - floor;
    if !value.is_finite() || span.abs() < STDEV_EPSILON {
        return 0.0;
    }
    ((value - floor) / span * 100.0).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    #[test]
    fn pool_stats_known_values() {
        // Mean 5, population variance 32/8 = 4, stdev 2.
        let values = vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let stats = compute_pool_stats(&values);
        assert!(approx_eq(stats.mean, 5.0, 1e-10));
        assert!(approx_eq(stats.stdev, 2.0, 1e-10));
    }

    #[test]
    fn pool_stats_empty() {
        let stats = compute_pool_stats(&[]);
        assert_eq!(stats.mean, 0.0);
        assert_eq!(stats.stdev, 0.0);
    }

    #[test]
    fn zscore_known_inputs_and_zero_stdev() {
        let stats = PoolStats {
            mean: 5.0,
            stdev: 2.0,
        };
        assert!(approx_eq(compute_zscore(9.0, &stats), 2.0, 1e-10));
        assert!(approx_eq(compute_zscore(1.0, &stats), -2.0, 1e-10));

        let flat = PoolStats {
            mean: 42.0,
            stdev: 1e-12,
        };
        assert_eq!(compute_zscore(100.0, &flat), 0.0);
    }

    #[test]
    fn cv_requires_positive_mean() {
        assert!(coefficient_of_variation(&[0.0, 0.0]).is_none());
        assert!(coefficient_of_variation(&[]).is_none());
        let cv = coefficient_of_variation(&[10.0, 10.0, 10.0]).unwrap();
        assert!(approx_eq(cv, 0.0, 1e-12));
        let cv = coefficient_of_variation(&[8.0, 12.0]).unwrap();
        assert!(approx_eq(cv, 0.2, 1e-12));
    }

    #[test]
    fn percentile_interpolates() {
        let v: Vec<f64> = (0..=10).map(f64::from).collect();
        assert!(approx_eq(percentile(&v, 0.0), 0.0, 1e-12));
        assert!(approx_eq(percentile(&v, 0.5), 5.0, 1e-12));
        assert!(approx_eq(percentile(&v, 0.95), 9.5, 1e-12));
        assert!(approx_eq(percentile(&v, 1.0), 10.0, 1e-12));
        assert!(approx_eq(percentile(&[3.0], 0.9), 3.0, 1e-12));
        assert!(percentile(&[], 0.5).is_nan());
    }

    #[test]
    fn rescale_clamps_and_inverts() {
        assert!(approx_eq(rescale(5.0, 0.0, 10.0), 50.0, 1e-12));
        assert_eq!(rescale(-3.0, 0.0, 10.0), 0.0);
        assert_eq!(rescale(30.0, 0.0, 10.0), 100.0);
        // Inverted range: lower is better.
        assert!(approx_eq(rescale(0.3, 0.9, 0.15), 80.0, 1e-9));
        assert_eq!(rescale(0.05, 0.9, 0.15), 100.0);
        assert_eq!(rescale(f64::NAN, 0.0, 1.0), 0.0);
    }
}
