use std::fmt;
use std::sync::Arc;

use ndarray::{Array3, Axis};

use crate::error::ViewerError;

// ---------------------------------------------------------------------------
// SliceAxis – which cube dimension we slice along
// ---------------------------------------------------------------------------

/// Slicing axis, numbered 1..=3 like the UI shows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SliceAxis {
    One,
    Two,
    Three,
}

impl SliceAxis {
    pub const ALL: [SliceAxis; 3] = [SliceAxis::One, SliceAxis::Two, SliceAxis::Three];

    /// 1-based axis number.
    pub fn number(self) -> u8 {
        match self {
            SliceAxis::One => 1,
            SliceAxis::Two => 2,
            SliceAxis::Three => 3,
        }
    }

    pub(crate) fn ndarray_axis(self) -> Axis {
        Axis(usize::from(self.number()) - 1)
    }
}

impl TryFrom<u8> for SliceAxis {
    type Error = ViewerError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(SliceAxis::One),
            2 => Ok(SliceAxis::Two),
            3 => Ok(SliceAxis::Three),
            other => Err(ViewerError::InvalidAxis(other)),
        }
    }
}

impl fmt::Display for SliceAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

// ---------------------------------------------------------------------------
// Voxel / SliceCoord – 1-based positions
// ---------------------------------------------------------------------------

/// A selected sample `(i, j, k)`, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Voxel {
    pub i: usize,
    pub j: usize,
    pub k: usize,
}

impl Voxel {
    pub fn new(i: usize, j: usize, k: usize) -> Self {
        Self { i, j, k }
    }

    /// Component along `axis`.
    pub fn component(self, axis: SliceAxis) -> usize {
        match axis {
            SliceAxis::One => self.i,
            SliceAxis::Two => self.j,
            SliceAxis::Three => self.k,
        }
    }

    /// Copy with the component along `axis` replaced.
    pub fn with_component(self, axis: SliceAxis, value: usize) -> Self {
        match axis {
            SliceAxis::One => Self { i: value, ..self },
            SliceAxis::Two => Self { j: value, ..self },
            SliceAxis::Three => Self { k: value, ..self },
        }
    }
}

impl fmt::Display for Voxel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.i, self.j, self.k)
    }
}

/// Row / column position `(u, v)` inside the current slice, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SliceCoord {
    pub u: usize,
    pub v: usize,
}

impl SliceCoord {
    pub fn new(u: usize, v: usize) -> Self {
        Self { u, v }
    }
}

// ---------------------------------------------------------------------------
// Cube – the immutable volume
// ---------------------------------------------------------------------------

/// Read-only 3D volume of `f64` samples with shape `(nx, ny, nz)`.
///
/// Cloning is cheap: the samples sit behind an `Arc` so the export worker can
/// hold the same data as the interactive session.
#[derive(Debug, Clone)]
pub struct Cube {
    data: Arc<Array3<f64>>,
}

impl Cube {
    /// Wrap an array; every dimension must be non-empty.
    pub fn new(data: Array3<f64>) -> Result<Self, ViewerError> {
        let (nx, ny, nz) = data.dim();
        if nx == 0 || ny == 0 || nz == 0 {
            return Err(ViewerError::EmptyCube([nx, ny, nz]));
        }
        Ok(Self {
            data: Arc::new(data),
        })
    }

    /// `[nx, ny, nz]`.
    pub fn shape(&self) -> [usize; 3] {
        let (nx, ny, nz) = self.data.dim();
        [nx, ny, nz]
    }

    /// Number of samples along `axis`.
    pub fn extent(&self, axis: SliceAxis) -> usize {
        self.shape()[usize::from(axis.number()) - 1]
    }

    pub fn data(&self) -> &Array3<f64> {
        &self.data
    }

    /// Fail with `IndexOutOfRange` on the first component outside its dimension.
    pub fn check_voxel(&self, voxel: Voxel) -> Result<(), ViewerError> {
        for axis in SliceAxis::ALL {
            let index = voxel.component(axis);
            let extent = self.extent(axis);
            if index == 0 || index > extent {
                return Err(ViewerError::IndexOutOfRange { index, extent });
            }
        }
        Ok(())
    }

    /// Raw sample at a 1-based voxel.
    pub fn value_at(&self, voxel: Voxel) -> Result<f64, ViewerError> {
        self.check_voxel(voxel)?;
        Ok(self.data[[voxel.i - 1, voxel.j - 1, voxel.k - 1]])
    }

    /// Voxel at the middle of the cube (rounded up).
    pub fn center(&self) -> Voxel {
        let [nx, ny, nz] = self.shape();
        Voxel::new(nx.div_ceil(2), ny.div_ceil(2), nz.div_ceil(2))
    }
}

// ---------------------------------------------------------------------------
// Spectrum – 1D trace through a voxel
// ---------------------------------------------------------------------------

/// Ordered `(position, value)` trace along one cube axis; positions are 1-based.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Spectrum {
    pub positions: Vec<usize>,
    pub values: Vec<f64>,
}

impl Spectrum {
    /// Build from values, numbering positions `1..=len`.
    pub fn from_values(values: Vec<f64>) -> Self {
        Self {
            positions: (1..=values.len()).collect(),
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// `(position, value)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.positions.iter().copied().zip(self.values.iter().copied())
    }

    /// Same positions, values replaced by `values`.
    pub fn with_values(&self, values: Vec<f64>) -> Self {
        debug_assert_eq!(values.len(), self.positions.len());
        Self {
            positions: self.positions.clone(),
            values,
        }
    }
}
