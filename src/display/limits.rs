use super::extent::{robust_extrema, widen_degenerate};
use crate::error::ViewerError;

// ---------------------------------------------------------------------------
// Colour-limit policy
// ---------------------------------------------------------------------------

/// Active colour range policy shared by the image and the spectrum plot.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ColorLimits {
    /// Recomputed from the displayed slice on every change.
    #[default]
    Auto,
    /// User bounds, `low < high`.
    Manual { low: f64, high: f64 },
}

impl ColorLimits {
    /// Session start: `Manual` only when both finite bounds are supplied.
    pub fn initial(low: Option<f64>, high: Option<f64>) -> Self {
        match (low, high) {
            (Some(low), Some(high)) if low.is_finite() && high.is_finite() => {
                Self::manual(low, high)
            }
            _ => ColorLimits::Auto,
        }
    }

    /// Manual bounds, reordered if reversed and widened if equal.
    pub fn manual(low: f64, high: f64) -> Self {
        let (low, high) = if low > high { (high, low) } else { (low, high) };
        let (low, high) = widen_degenerate(low, high);
        ColorLimits::Manual { low, high }
    }

    /// Handle the "apply limits" action.
    ///
    /// Either field blank → `Auto`. Both finite numbers → `Manual`. Anything
    /// else is rejected and `self` is left as it was.
    pub fn apply(&mut self, low_text: &str, high_text: &str) -> Result<(), ViewerError> {
        if low_text.trim().is_empty() || high_text.trim().is_empty() {
            *self = ColorLimits::Auto;
            return Ok(());
        }
        match (parse_bound(low_text), parse_bound(high_text)) {
            (Some(low), Some(high)) => {
                *self = Self::manual(low, high);
                Ok(())
            }
            _ => {
                log::warn!("Rejected color limits '{low_text}' / '{high_text}'");
                Err(ViewerError::LimitsParseFailure {
                    low: low_text.to_string(),
                    high: high_text.to_string(),
                })
            }
        }
    }

    pub fn is_manual(&self) -> bool {
        matches!(self, ColorLimits::Manual { .. })
    }

    /// Stored bounds in `Manual`, `None` in `Auto`.
    pub fn bounds(&self) -> Option<(f64, f64)> {
        match *self {
            ColorLimits::Manual { low, high } => Some((low, high)),
            ColorLimits::Auto => None,
        }
    }

    /// Colour range for the currently scaled, displayed slice.
    pub fn effective_range<'a, I>(&self, scaled_slice: I) -> (f64, f64)
    where
        I: IntoIterator<Item = &'a f64>,
    {
        self.bounds()
            .unwrap_or_else(|| robust_extrema(scaled_slice))
    }

    /// Vertical range of the spectrum plot: pinned to the manual bounds,
    /// otherwise fitted to the trace itself.
    pub fn spectrum_range<'a, I>(&self, scaled_trace: I) -> (f64, f64)
    where
        I: IntoIterator<Item = &'a f64>,
    {
        self.bounds()
            .unwrap_or_else(|| robust_extrema(scaled_trace))
    }
}

fn parse_bound(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        assert_eq!(ColorLimits::initial(None, None), ColorLimits::Auto);
        assert_eq!(ColorLimits::initial(Some(1.0), None), ColorLimits::Auto);
        assert_eq!(
            ColorLimits::initial(Some(1.0), Some(4.0)),
            ColorLimits::Manual { low: 1.0, high: 4.0 }
        );
        let (low, high) = ColorLimits::initial(Some(3.0), Some(3.0)).bounds().unwrap();
        assert!(low < 3.0 && 3.0 < high);
    }

    #[test]
    fn test_apply_numbers() {
        let mut limits = ColorLimits::Auto;
        limits.apply(" 2 ", "8.5").unwrap();
        assert_eq!(limits, ColorLimits::Manual { low: 2.0, high: 8.5 });
    }

    #[test]
    fn test_apply_equal_bounds_widened() {
        let mut limits = ColorLimits::Auto;
        limits.apply("5", "5").unwrap();
        let (low, high) = limits.bounds().unwrap();
        assert!(low < high);
        assert!(low < 5.0 && 5.0 < high);
    }

    #[test]
    fn test_apply_reversed_bounds_swapped() {
        let mut limits = ColorLimits::Auto;
        limits.apply("9", "-1").unwrap();
        assert_eq!(limits, ColorLimits::Manual { low: -1.0, high: 9.0 });
    }

    #[test]
    fn test_malformed_input_leaves_state() {
        let mut limits = ColorLimits::Manual { low: 1.0, high: 2.0 };
        let err = limits.apply("abc", "10").unwrap_err();
        assert!(matches!(err, ViewerError::LimitsParseFailure { .. }));
        assert_eq!(limits, ColorLimits::Manual { low: 1.0, high: 2.0 });

        let mut auto = ColorLimits::Auto;
        assert!(auto.apply("1", "inf").is_err());
        assert!(auto.apply("NaN", "1").is_err());
        assert_eq!(auto, ColorLimits::Auto);
    }

    #[test]
    fn test_blank_resets_to_auto() {
        for (low, high) in [("", ""), ("", "3"), ("1", "  ")] {
            let mut limits = ColorLimits::Manual { low: 1.0, high: 2.0 };
            limits.apply(low, high).unwrap();
            assert_eq!(limits, ColorLimits::Auto);
        }
    }

    #[test]
    fn test_manual_pins_spectrum_range() {
        let limits = ColorLimits::Manual { low: 2.0, high: 8.0 };
        assert_eq!(limits.spectrum_range(&[100.0, 250.0]), (2.0, 8.0));
        assert_eq!(limits.effective_range(&[-5.0, 0.0]), (2.0, 8.0));
    }

    #[test]
    fn test_auto_ranges_are_independent() {
        let limits = ColorLimits::Auto;
        assert_eq!(limits.effective_range(&[0.0, 1.0, 4.0]), (0.0, 4.0));
        assert_eq!(limits.spectrum_range(&[10.0, 30.0]), (10.0, 30.0));
    }
}
