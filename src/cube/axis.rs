use super::model::{SliceAxis, SliceCoord, Voxel};

// ---------------------------------------------------------------------------
// Voxel ⇄ slice coordinate mapping
// ---------------------------------------------------------------------------

/// Cube axes spanned by the slice plane, in `(u, v)` order.
///
/// * axis 1 → plane (dim 2, dim 3)
/// * axis 2 → plane (dim 1, dim 3)
/// * axis 3 → plane (dim 1, dim 2)
pub fn plane_axes(axis: SliceAxis) -> (SliceAxis, SliceAxis) {
    match axis {
        SliceAxis::One => (SliceAxis::Two, SliceAxis::Three),
        SliceAxis::Two => (SliceAxis::One, SliceAxis::Three),
        SliceAxis::Three => (SliceAxis::One, SliceAxis::Two),
    }
}

/// Project a voxel onto the slice plane of `axis`.
pub fn to_slice_coord(voxel: Voxel, axis: SliceAxis) -> SliceCoord {
    let (u_axis, v_axis) = plane_axes(axis);
    SliceCoord::new(voxel.component(u_axis), voxel.component(v_axis))
}

/// Lift a slice coordinate back into the cube at slice `index` along `axis`.
pub fn to_voxel(coord: SliceCoord, axis: SliceAxis, index: usize) -> Voxel {
    match axis {
        SliceAxis::One => Voxel::new(index, coord.u, coord.v),
        SliceAxis::Two => Voxel::new(coord.u, index, coord.v),
        SliceAxis::Three => Voxel::new(coord.u, coord.v, index),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_mapping() {
        let v = Voxel::new(2, 5, 7);
        assert_eq!(to_slice_coord(v, SliceAxis::One), SliceCoord::new(5, 7));
        assert_eq!(to_slice_coord(v, SliceAxis::Two), SliceCoord::new(2, 7));
        assert_eq!(to_slice_coord(v, SliceAxis::Three), SliceCoord::new(2, 5));
    }

    #[test]
    fn test_inverse_mapping() {
        let c = SliceCoord::new(3, 4);
        assert_eq!(to_voxel(c, SliceAxis::One, 9), Voxel::new(9, 3, 4));
        assert_eq!(to_voxel(c, SliceAxis::Two, 9), Voxel::new(3, 9, 4));
        assert_eq!(to_voxel(c, SliceAxis::Three, 9), Voxel::new(3, 4, 9));
    }

    #[test]
    fn test_round_trip_all_axes() {
        for axis in SliceAxis::ALL {
            for i in 1..=4 {
                for j in 1..=3 {
                    for k in 1..=5 {
                        let voxel = Voxel::new(i, j, k);
                        let coord = to_slice_coord(voxel, axis);
                        assert_eq!(to_voxel(coord, axis, voxel.component(axis)), voxel);
                    }
                }
            }
        }
    }

    #[test]
    fn test_plane_excludes_slice_axis() {
        for axis in SliceAxis::ALL {
            let (u, v) = plane_axes(axis);
            assert_ne!(u, axis);
            assert_ne!(v, axis);
            assert!(u.number() < v.number());
        }
    }
}
