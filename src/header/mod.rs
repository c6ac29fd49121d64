//! Header parsers for the supported source formats.
//!
//! Each parser produces an immutable header value from the raw bytes (or
//! text) of its format. Geometry and voxel loading work exclusively from
//! these values.

pub mod analyze;
pub mod nifti;
pub mod nrrd;
pub mod raw;

pub use self::analyze::AnalyzeHeader;
pub use self::nifti::NiftiHeader;
pub use self::nrrd::NrrdHeader;
pub use self::raw::RawDescription;

use crate::error::{ConvertError, Result};
use crate::util::checked_product;

/// The validated extents of a single-volume binary format (Analyze 7.5 and
/// NIfTI-1), taken from its `dim` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shape {
    /// `dim[1]`, the fastest varying axis
    pub columns: usize,
    /// `dim[2]`
    pub rows: usize,
    /// `dim[3]`
    pub slices: usize,
    /// Product of `dim[4]` onwards, up to `dim[0]`
    pub volumes: usize,
}

impl Shape {
    /// Validate a raw `dim` array, where `dim[0]` is the number of used
    /// dimensions. Unused dimensions count as 1, and the voxel count must
    /// fit in `usize`.
    pub fn from_dim(dim: &[i16; 8]) -> Result<Shape> {
        let rank = dim[0];
        if rank < 1 || rank > 7 {
            return Err(ConvertError::format(format!(
                "dim[0] (byte 40) must be between 1 and 7, found {}",
                rank
            )));
        }
        let mut extents = [1usize; 7];
        for (i, &d) in dim[1..=rank as usize].iter().enumerate() {
            if d < 1 {
                return Err(ConvertError::format(format!(
                    "dim[{}] (byte {}) must be positive, found {}",
                    i + 1,
                    42 + 2 * i,
                    d
                )));
            }
            extents[i] = d as usize;
        }
        // every product of the extents below stays within this one
        checked_product("dim", extents.iter().cloned())?;
        Ok(Shape {
            columns: extents[0],
            rows: extents[1],
            slices: extents[2],
            volumes: extents[3..].iter().product(),
        })
    }

    /// Number of frames in the destination: one per slice of each volume.
    pub fn frames(&self) -> usize {
        self.slices * self.volumes
    }

    /// Number of voxels.
    pub fn voxel_count(&self) -> usize {
        self.columns * self.rows * self.frames()
    }
}

#[cfg(test)]
mod tests {
    use super::Shape;

    #[test]
    fn shape_from_dim() {
        let s = Shape::from_dim(&[3, 256, 256, 10, 0, 0, 0, 0]).unwrap();
        assert_eq!(
            s,
            Shape {
                columns: 256,
                rows: 256,
                slices: 10,
                volumes: 1
            }
        );
        assert_eq!(s.frames(), 10);

        let s = Shape::from_dim(&[2, 64, 32, 0, 0, 0, 0, 0]).unwrap();
        assert_eq!(s.frames(), 1);

        let s = Shape::from_dim(&[5, 4, 4, 3, 2, 5, 9, 9]).unwrap();
        assert_eq!(s.volumes, 10);
        assert_eq!(s.voxel_count(), 4 * 4 * 3 * 10);
    }

    #[test]
    fn shape_invalid() {
        assert!(Shape::from_dim(&[0, 1, 1, 1, 0, 0, 0, 0]).is_err());
        assert!(Shape::from_dim(&[8, 1, 1, 1, 1, 1, 1, 1]).is_err());
        let e = Shape::from_dim(&[3, 4, -4, 1, 0, 0, 0, 0]).unwrap_err();
        assert!(e.is_format_error());
        assert!(e.to_string().contains("dim[2]"));
    }

    #[test]
    fn shape_overflow() {
        let e = Shape::from_dim(&[7, 32767, 32767, 32767, 32767, 32767, 32767, 32767])
            .unwrap_err();
        assert!(e.is_format_error());
        assert!(e.to_string().contains("dim"));
    }
}
