use ndarray::{s, Array2};

use super::model::{Cube, SliceAxis, Spectrum, Voxel};
use crate::error::ViewerError;

// ---------------------------------------------------------------------------
// Slice extraction
// ---------------------------------------------------------------------------

/// Extract the 2D slice at 1-based `index` along `axis`.
///
/// Rows run along the `u` axis and columns along the `v` axis of
/// [`super::axis::plane_axes`], so `slice[[u - 1, v - 1]]` is the sample at
/// `to_voxel((u, v), axis, index)`.
pub fn extract_slice(cube: &Cube, axis: u8, index: usize) -> Result<Array2<f64>, ViewerError> {
    let axis = SliceAxis::try_from(axis)?;
    let extent = cube.extent(axis);
    if index == 0 || index > extent {
        return Err(ViewerError::IndexOutOfRange { index, extent });
    }
    Ok(cube
        .data()
        .index_axis(axis.ndarray_axis(), index - 1)
        .to_owned())
}

// ---------------------------------------------------------------------------
// Spectrum extraction
// ---------------------------------------------------------------------------

/// Trace through `voxel` along `axis`; one entry per sample on that axis.
pub fn extract_spectrum(cube: &Cube, voxel: Voxel, axis: u8) -> Result<Spectrum, ViewerError> {
    let axis = SliceAxis::try_from(axis)?;
    cube.check_voxel(voxel)?;

    let (i, j, k) = (voxel.i - 1, voxel.j - 1, voxel.k - 1);
    let data = cube.data();
    let lane = match axis {
        SliceAxis::One => data.slice(s![.., j, k]),
        SliceAxis::Two => data.slice(s![i, .., k]),
        SliceAxis::Three => data.slice(s![i, j, ..]),
    };
    Ok(Spectrum::from_values(lane.to_vec()))
}

#[cfg(test)]
mod tests {
    use ndarray::Array3;

    use super::*;
    use crate::cube::axis::to_voxel;
    use crate::cube::model::SliceCoord;

    fn coded_cube(nx: usize, ny: usize, nz: usize) -> Cube {
        // value encodes the 1-based voxel as i*100 + j*10 + k
        let data = Array3::from_shape_fn((nx, ny, nz), |(i, j, k)| {
            ((i + 1) * 100 + (j + 1) * 10 + (k + 1)) as f64
        });
        Cube::new(data).unwrap()
    }

    #[test]
    fn test_slice_shapes() {
        let cube = coded_cube(7, 5, 4);
        assert_eq!(extract_slice(&cube, 1, 3).unwrap().dim(), (5, 4));
        assert_eq!(extract_slice(&cube, 2, 3).unwrap().dim(), (7, 4));
        assert_eq!(extract_slice(&cube, 3, 3).unwrap().dim(), (7, 5));
    }

    #[test]
    fn test_slice_orientation_matches_axis_mapper() {
        let cube = coded_cube(4, 3, 5);
        for axis in SliceAxis::ALL {
            let index = 2;
            let slice = extract_slice(&cube, axis.number(), index).unwrap();
            for ((r, c), &value) in slice.indexed_iter() {
                let voxel = to_voxel(SliceCoord::new(r + 1, c + 1), axis, index);
                assert_eq!(value, cube.value_at(voxel).unwrap());
            }
        }
    }

    #[test]
    fn test_slice_errors() {
        let cube = coded_cube(2, 2, 2);
        assert_eq!(
            extract_slice(&cube, 4, 1),
            Err(ViewerError::InvalidAxis(4))
        );
        assert_eq!(
            extract_slice(&cube, 1, 0),
            Err(ViewerError::IndexOutOfRange { index: 0, extent: 2 })
        );
        assert_eq!(
            extract_slice(&cube, 2, 3),
            Err(ViewerError::IndexOutOfRange { index: 3, extent: 2 })
        );
    }

    #[test]
    fn test_spectrum_along_each_axis() {
        let cube = coded_cube(3, 4, 5);
        let voxel = Voxel::new(2, 3, 4);

        let sp = extract_spectrum(&cube, voxel, 1).unwrap();
        assert_eq!(sp.positions, vec![1, 2, 3]);
        assert_eq!(sp.values, vec![134.0, 234.0, 334.0]);

        let sp = extract_spectrum(&cube, voxel, 2).unwrap();
        assert_eq!(sp.len(), 4);
        assert_eq!(sp.values, vec![214.0, 224.0, 234.0, 244.0]);

        let sp = extract_spectrum(&cube, voxel, 3).unwrap();
        assert_eq!(sp.len(), 5);
        assert_eq!(sp.values[0], 231.0);
        assert_eq!(sp.values[4], 235.0);
    }

    #[test]
    fn test_spectrum_errors() {
        let cube = coded_cube(2, 2, 2);
        assert_eq!(
            extract_spectrum(&cube, Voxel::new(1, 1, 1), 0),
            Err(ViewerError::InvalidAxis(0))
        );
        assert!(matches!(
            extract_spectrum(&cube, Voxel::new(3, 1, 1), 3),
            Err(ViewerError::IndexOutOfRange { index: 3, extent: 2 })
        ));
    }
}
