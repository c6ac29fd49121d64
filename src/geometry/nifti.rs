//! Geometry of NIfTI-1 volumes.
//!
//! A NIfTI-1 header may hold two voxel-to-world transforms: a general
//! affine (the "sform") and a rotation stored as a quaternion plus
//! offsets and spacings (the "qform"). Both map into RAS+ world space.
//! The affine takes precedence; without either one the volume is placed
//! axially with a translation only.
use super::{checked_spacing, unit, ConversionWarning, VoxelGeometry, Warnings};
use crate::affine::{
    affine_from_rows, flip, get_affine_and_translation, quaternion_to_rotation, Affine3,
    RAS_TO_LPS,
};
use crate::error::Result;
use crate::header::NiftiHeader;
use crate::volume::FrameLayout;
use nalgebra::Vector3;

/// The transform a NIfTI-1 header places its voxels with.
#[derive(Debug, Clone, PartialEq)]
pub enum Transform {
    /// `sform_code > 0`: the `srow_*` rows of the affine matrix
    Affine {
        /// Linear part
        matrix: Affine3,
        /// Translation column
        translation: Vector3<f64>,
    },
    /// `qform_code > 0`: a rotation with offsets and a slice reflection
    Quaternion {
        /// Rotation reconstructed from the quaternion
        rotation: Affine3,
        /// `qoffset_x`, `qoffset_y`, `qoffset_z`
        offset: Vector3<f64>,
        /// `pixdim[0]`, with 0 meaning 1
        qfac: f64,
    },
    /// Neither transform code is set
    Translation {
        /// `qoffset_x`, `qoffset_y`, `qoffset_z`
        offset: Vector3<f64>,
    },
}

impl Transform {
    /// Select the transform of a header by priority.
    pub fn from_header(header: &NiftiHeader) -> Result<Transform> {
        let offset = Vector3::new(
            f64::from(header.quatern_x),
            f64::from(header.quatern_y),
            f64::from(header.quatern_z),
        );
        if is_set(header.sform_code) {
            let affine = affine_from_rows(&header.srow_x, &header.srow_y, &header.srow_z);
            let (matrix, translation) = get_affine_and_translation(&affine);
            Ok(Transform::Affine {
                matrix,
                translation,
            })
        } else if is_set(header.qform_code) {
            let rotation = quaternion_to_rotation(
                f64::from(header.quatern_b),
                f64::from(header.quatern_c),
                f64::from(header.quatern_d),
            )?;
            let qfac = match header.pixdim[0] {
                q if q == 0. => 1.,
                q => f64::from(q),
            };
            Ok(Transform::Quaternion {
                rotation,
                offset,
                qfac,
            })
        } else {
            Ok(Transform::Translation { offset })
        }
    }
}

/// Transform codes count as present when positive, including codes that
/// are not part of the standard.
fn is_set(code: i16) -> bool {
    code > 0
}

/// Derive the geometry of a NIfTI-1 volume. Spacings and positions are
/// converted to millimetres according to the spatial unit.
///
/// # Errors
///
/// - `ConvertError::UnsupportedGeometry` if the quaternion is invalid or
/// the affine has a degenerate axis.
pub fn derive(header: &NiftiHeader, warnings: &mut Warnings) -> Result<VoxelGeometry> {
    let shape = header.shape()?;
    let frames = FrameLayout::simple(shape.slices, shape.volumes);
    let mm = header
        .xyzt_to_space()
        .known()
        .map(|u| u.millimetre_factor())
        .unwrap_or(1.);

    let spacing = [
        checked_spacing("column", f64::from(header.pixdim[1]), warnings),
        checked_spacing("row", f64::from(header.pixdim[2]), warnings),
        checked_spacing("slice", f64::from(header.pixdim[3]), warnings),
    ];
    let column_spacing = spacing[0] * mm;
    let row_spacing = spacing[1] * mm;
    let slice_spacing = spacing[2] * mm;

    let transform = Transform::from_header(header)?;
    log::debug!("NIfTI placement: {:?}", transform);
    let (row_direction, column_direction, origin, step) = match transform {
        Transform::Affine {
            matrix,
            translation,
        } => {
            // rows of the affine, divided by the voxel spacing
            let cosine = |i: usize, what: &str| {
                let r = matrix.row(i);
                let v = Vector3::new(r[0] / spacing[0], r[1] / spacing[1], r[2] / spacing[2]);
                unit("NIfTI", what, flip(&v, RAS_TO_LPS))
            };
            let (row, _) = cosine(0, "sform row 0")?;
            let (column, _) = cosine(1, "sform row 1")?;
            let step = flip(&matrix.column(2).into_owned(), RAS_TO_LPS) * mm;
            (row, column, flip(&translation, RAS_TO_LPS) * mm, step)
        }
        Transform::Quaternion {
            rotation,
            offset,
            qfac,
        } => {
            let row = flip(&rotation.row(0).transpose(), RAS_TO_LPS);
            let column = flip(&rotation.row(1).transpose(), RAS_TO_LPS);
            let normal = flip(&rotation.row(2).transpose(), RAS_TO_LPS);
            (
                row,
                column,
                flip(&offset, RAS_TO_LPS) * mm,
                normal * slice_spacing * qfac,
            )
        }
        Transform::Translation { offset } => {
            warnings.push(ConversionWarning::GeometryDegraded(
                "NIfTI header has neither sform nor qform, placing slices axially".to_string(),
            ));
            (
                Vector3::x(),
                Vector3::y(),
                flip(&offset, RAS_TO_LPS) * mm,
                Vector3::z() * slice_spacing,
            )
        }
    };

    VoxelGeometry::new(
        column_spacing,
        row_spacing,
        slice_spacing,
        row_direction,
        column_direction,
        origin,
        step,
        frames,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transform_priority() {
        let mut h = NiftiHeader {
            quatern_x: 1.,
            ..NiftiHeader::default()
        };
        assert_eq!(
            Transform::from_header(&h).unwrap(),
            Transform::Translation {
                offset: Vector3::new(1., 0., 0.)
            }
        );
        h.qform_code = 1;
        h.pixdim[0] = -1.;
        match Transform::from_header(&h).unwrap() {
            Transform::Quaternion { qfac, .. } => assert_eq!(qfac, -1.),
            t => panic!("unexpected transform {:?}", t),
        }
        h.sform_code = 7;
        assert!(matches!(
            Transform::from_header(&h).unwrap(),
            Transform::Affine { .. }
        ));
    }

    #[test]
    fn qfac_zero_means_one() {
        let h = NiftiHeader {
            qform_code: 2,
            pixdim: [0., 1., 1., 1., 0., 0., 0., 0.],
            ..NiftiHeader::default()
        };
        match Transform::from_header(&h).unwrap() {
            Transform::Quaternion { qfac, rotation, .. } => {
                assert_eq!(qfac, 1.);
                assert_eq!(rotation, Affine3::identity());
            }
            t => panic!("unexpected transform {:?}", t),
        }
    }
}
