/// Display layer: value → screen decisions shared by the image, the spectrum
/// plot and the exporter.
///
/// ```text
///   slice / trace
///        │
///        ▼
///   ┌──────────┐
///   │  scale    │  linear / log10 / ln, NaN for non-positive log input
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐      ┌──────────┐
///   │  extent   │ ◄─── │  limits   │  Auto → extent, Manual → stored bounds
///   └──────────┘      └──────────┘
///
///   frames: slice indices for animated export
/// ```

pub mod extent;
pub mod frames;
pub mod limits;
pub mod scale;
