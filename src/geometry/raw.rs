//! Geometry of raw voxel files, from the optional keys of their description.
use super::{checked_spacing, unit, ConversionWarning, VoxelGeometry, Warnings};
use crate::error::Result;
use crate::header::RawDescription;
use crate::volume::FrameLayout;
use nalgebra::Vector3;

/// Derive the geometry of a raw volume. Frames are stacked along the
/// normal of the row and column directions. Without any geometry key the
/// volume is placed axially at the origin with unit spacings.
///
/// # Errors
///
/// - `ConvertError::UnsupportedGeometry` if a direction has zero length.
pub fn derive(desc: &RawDescription, warnings: &mut Warnings) -> Result<VoxelGeometry> {
    if !desc.has_geometry() {
        warnings.push(ConversionWarning::GeometryDegraded(
            "raw description has no geometry, assuming unit axial voxels".to_string(),
        ));
    }
    let spacing = |value: Option<f64>, axis: &'static str, warnings: &mut Warnings| match value {
        Some(s) => checked_spacing(axis, s, warnings),
        None => 1.,
    };
    let column_spacing = spacing(desc.column_spacing, "column", warnings);
    let row_spacing = spacing(desc.row_spacing, "row", warnings);
    let slice_spacing = spacing(desc.slice_spacing, "slice", warnings);

    let (row, _) = unit(
        "raw",
        "row direction",
        desc.row_direction.map_or_else(Vector3::x, Vector3::from),
    )?;
    let (column, _) = unit(
        "raw",
        "column direction",
        desc.column_direction.map_or_else(Vector3::y, Vector3::from),
    )?;
    let (normal, _) = unit("raw", "slice normal", row.cross(&column))?;
    let origin = desc.origin.map_or_else(Vector3::zeros, Vector3::from);

    VoxelGeometry::new(
        column_spacing,
        row_spacing,
        slice_spacing,
        row,
        column,
        origin,
        normal * slice_spacing,
        FrameLayout::simple(desc.frames, 1),
    )
}
