//! Geometry of Analyze 7.5 volumes, from the discrete slice orientation.
use super::{checked_spacing, VoxelGeometry, Warnings};
use crate::error::{ConvertError, Result};
use crate::header::AnalyzeHeader;
use crate::typedef::{AnalyzeOrientation, Coded};
use crate::volume::FrameLayout;
use nalgebra::Vector3;

/// Row direction, column direction and slice stepping axis of an
/// orientation, in LPS+.
fn orientation_axes(orientation: AnalyzeOrientation) -> [[f64; 3]; 3] {
    use AnalyzeOrientation::*;
    match orientation {
        TransverseUnflipped => [[1., 0., 0.], [0., -1., 0.], [0., 0., 1.]],
        CoronalUnflipped => [[1., 0., 0.], [0., 0., 1.], [0., -1., 0.]],
        SagittalUnflipped => [[0., -1., 0.], [0., 0., 1.], [1., 0., 0.]],
        TransverseFlipped => [[1., 0., 0.], [0., 1., 0.], [0., 0., 1.]],
        CoronalFlipped => [[1., 0., 0.], [0., 0., -1.], [0., -1., 0.]],
        SagittalFlipped => [[0., -1., 0.], [0., 0., -1.], [1., 0., 0.]],
    }
}

/// Derive the geometry of an Analyze volume. The first voxel sits at the
/// origin and slices advance along the stepping axis of the orientation.
///
/// # Errors
///
/// - `ConvertError::UnsupportedGeometry` if the orientation code is not one
/// of the six defined ones.
pub fn derive(header: &AnalyzeHeader, warnings: &mut Warnings) -> Result<VoxelGeometry> {
    let shape = header.shape()?;
    let orientation = match header.orientation() {
        Coded::Known(o) => o,
        Coded::Unrecognized(code) => {
            return Err(ConvertError::geometry(
                "Analyze",
                format!("orient code {} (byte 252)", code),
            ))
        }
    };
    let [row, column, step] = orientation_axes(orientation);

    let column_spacing = checked_spacing("column", f64::from(header.pixdim[1]), warnings);
    let row_spacing = checked_spacing("row", f64::from(header.pixdim[2]), warnings);
    let slice_spacing = checked_spacing("slice", f64::from(header.pixdim[3]), warnings);

    VoxelGeometry::new(
        column_spacing,
        row_spacing,
        slice_spacing,
        Vector3::from(row),
        Vector3::from(column),
        Vector3::zeros(),
        Vector3::from(step) * slice_spacing,
        FrameLayout::simple(shape.slices, shape.volumes),
    )
}
