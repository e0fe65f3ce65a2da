/// Cube layer: core types, coordinate mapping, extraction, loading and smoothing.
///
/// Architecture:
/// ```text
///  .parquet / .json / .csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Cube (Array3<f64>)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐      ┌──────────┐
///   │ extract   │ ◄──► │   axis    │  voxel (i,j,k) ⇄ slice (u,v)
///   └──────────┘      └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  smooth   │  optional Gaussian filter on slice / trace
///   └──────────┘
/// ```

pub mod axis;
pub mod extract;
pub mod loader;
pub mod model;
pub mod smooth;
