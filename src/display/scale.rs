use std::fmt;

use ndarray::{Array, ArrayBase, Data, Dimension};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ScaleMode – display transform
// ---------------------------------------------------------------------------

/// Elementwise transform applied before rendering.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ScaleMode {
    #[default]
    Linear,
    Log10,
    Ln,
}

impl ScaleMode {
    pub const ALL: [ScaleMode; 3] = [ScaleMode::Linear, ScaleMode::Log10, ScaleMode::Ln];

    /// Transform a single value. Log modes map `x <= 0` (and NaN) to NaN.
    pub fn apply_value(self, x: f64) -> f64 {
        match self {
            ScaleMode::Linear => x,
            ScaleMode::Log10 if x > 0.0 => x.log10(),
            ScaleMode::Ln if x > 0.0 => x.ln(),
            ScaleMode::Log10 | ScaleMode::Ln => f64::NAN,
        }
    }
}

impl fmt::Display for ScaleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScaleMode::Linear => write!(f, "linear"),
            ScaleMode::Log10 => write!(f, "log10"),
            ScaleMode::Ln => write!(f, "ln"),
        }
    }
}

// ---------------------------------------------------------------------------
// Array helpers
// ---------------------------------------------------------------------------

/// Apply `mode` to every element, widening to `f64`. Output has the input shape.
pub fn apply_scale<S, D>(values: &ArrayBase<S, D>, mode: ScaleMode) -> Array<f64, D>
where
    S: Data,
    S::Elem: Copy + Into<f64>,
    D: Dimension,
{
    values.mapv(|x| mode.apply_value(x.into()))
}

/// Slice version of [`apply_scale`] for spectrum traces.
pub fn apply_scale_values(values: &[f64], mode: ScaleMode) -> Vec<f64> {
    values.iter().map(|&x| mode.apply_value(x)).collect()
}
