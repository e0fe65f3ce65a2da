// ---------------------------------------------------------------------------
// Robust extrema for automatic colour ranging
// ---------------------------------------------------------------------------

/// Range used when there is nothing finite to measure.
pub const FALLBACK_RANGE: (f64, f64) = (0.0, 1.0);

/// Min / max over the non-NaN entries.
///
/// * no entries left → [`FALLBACK_RANGE`]
/// * constant data → widened by one ulp on each side, so `low < high` always
pub fn robust_extrema<'a, I>(values: I) -> (f64, f64)
where
    I: IntoIterator<Item = &'a f64>,
{
    let extrema = values
        .into_iter()
        .copied()
        .filter(|x| !x.is_nan())
        .fold(None, |acc: Option<(f64, f64)>, x| match acc {
            None => Some((x, x)),
            Some((low, high)) => Some((low.min(x), high.max(x))),
        });

    match extrema {
        Some((low, high)) => widen_degenerate(low, high),
        None => FALLBACK_RANGE,
    }
}

/// Turn a zero-width range into the nearest strictly increasing one.
pub fn widen_degenerate(low: f64, high: f64) -> (f64, f64) {
    if low == high {
        (next_down(low), next_up(high))
    } else {
        (low, high)
    }
}

/// Smallest representable `f64` greater than `x`.
pub fn next_up(x: f64) -> f64 {
    if x.is_nan() || x == f64::INFINITY {
        return x;
    }
    if x == 0.0 {
        return f64::from_bits(1);
    }
    let bits = x.to_bits();
    if x > 0.0 {
        f64::from_bits(bits + 1)
    } else {
        f64::from_bits(bits - 1)
    }
}

/// Largest representable `f64` less than `x`.
pub fn next_down(x: f64) -> f64 {
    -next_up(-x)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_min_max() {
        assert_eq!(robust_extrema(&[3.0, -1.0, 7.5, 2.0]), (-1.0, 7.5));
    }

    #[test]
    fn test_nan_entries_ignored() {
        assert_eq!(robust_extrema(&[f64::NAN, 4.0, f64::NAN, 2.0]), (2.0, 4.0));
    }

    #[test]
    fn test_all_equal_is_widened() {
        let (low, high) = robust_extrema(&[5.0, 5.0, 5.0]);
        assert!(low < 5.0 && 5.0 < high);
        assert_eq!(next_up(low), 5.0);
        assert_eq!(next_down(high), 5.0);
    }

    #[test]
    fn test_all_nan_falls_back() {
        assert_eq!(robust_extrema(&[f64::NAN, f64::NAN]), (0.0, 1.0));
    }

    #[test]
    fn test_empty_falls_back() {
        let empty: [f64; 0] = [];
        assert_eq!(robust_extrema(&empty), (0.0, 1.0));
    }

    #[test]
    fn test_zero_and_negative_widening() {
        let (low, high) = widen_degenerate(0.0, 0.0);
        assert!(low < 0.0 && 0.0 < high);
        let (low, high) = widen_degenerate(-2.0, -2.0);
        assert!(low < -2.0 && -2.0 < high);
    }

    #[test]
    fn test_infinite_widening_stays_ordered() {
        let (low, high) = widen_degenerate(f64::INFINITY, f64::INFINITY);
        assert!(low < high);
        let (low, high) = widen_degenerate(f64::NEG_INFINITY, f64::NEG_INFINITY);
        assert!(low < high);
    }

    #[test]
    fn test_works_over_ndarray() {
        let a = ndarray::array![[1.0, f64::NAN], [-3.0, 8.0]];
        assert_eq!(robust_extrema(&a), (-3.0, 8.0));
    }
}
