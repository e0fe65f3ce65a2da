use thiserror::Error;

// ---------------------------------------------------------------------------
// Core error taxonomy
// ---------------------------------------------------------------------------

/// Conditions raised by the slice / spectrum / colour-limit core.
///
/// File loading and export sit on top of this and use `anyhow` instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ViewerError {
    /// Slice axis outside `{1, 2, 3}`.
    #[error("invalid slice axis {0}: expected 1, 2 or 3")]
    InvalidAxis(u8),

    /// A 1-based slice or voxel index outside the cube bounds.
    #[error("index {index} is outside 1..={extent}")]
    IndexOutOfRange { index: usize, extent: usize },

    /// Manual colour-limit text that is not two finite numbers.
    #[error("color limits must be two finite numbers, got '{low}' and '{high}'")]
    LimitsParseFailure { low: String, high: String },

    /// A cube with a zero-length dimension cannot be sliced.
    #[error("cube has an empty dimension: shape {0:?}")]
    EmptyCube([usize; 3]),
}
