//! Derivation of the destination geometry of a volume.
//!
//! Every source format describes the placement of its voxels in its own
//! way. The derivers in the submodules collapse them onto one convention:
//! right-handed LPS+ patient coordinates (+X towards the patient's left,
//! +Y posterior, +Z superior), in millimetres.
//!
//! Results which are degraded but usable are reported as
//! [`ConversionWarning`]s. Anything else which cannot be resolved is an
//! `UnsupportedGeometry` error.
//!
//! [`ConversionWarning`]: ./enum.ConversionWarning.html

pub mod analyze;
pub mod nifti;
pub mod nrrd;
pub mod raw;

use crate::error::{ConvertError, Result};
use crate::volume::FrameLayout;
use nalgebra::Vector3;
use std::fmt;

/// Maximum deviation from unit length accepted for direction vectors.
const UNIT_TOLERANCE: f64 = 1e-6;

/// The spatial placement of a converted volume.
#[derive(Debug, Clone, PartialEq)]
pub struct VoxelGeometry {
    column_spacing: f64,
    row_spacing: f64,
    slice_spacing: f64,
    row_direction: Vector3<f64>,
    column_direction: Vector3<f64>,
    origin: Vector3<f64>,
    slice_step: Vector3<f64>,
    frames: FrameLayout,
}

impl VoxelGeometry {
    /// Assemble a geometry, checking its invariants: spacings are finite
    /// and positive, directions have unit length, and there is at least
    /// one frame.
    ///
    /// `slice_step` is the displacement from one slice to the next, and
    /// `origin` the position of the first voxel of the first frame.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        column_spacing: f64,
        row_spacing: f64,
        slice_spacing: f64,
        row_direction: Vector3<f64>,
        column_direction: Vector3<f64>,
        origin: Vector3<f64>,
        slice_step: Vector3<f64>,
        frames: FrameLayout,
    ) -> Result<Self> {
        for &(name, s) in &[
            ("column spacing", column_spacing),
            ("row spacing", row_spacing),
            ("slice spacing", slice_spacing),
        ] {
            if !(s.is_finite() && s > 0.) {
                return Err(ConvertError::geometry("voxel", format!("{} is {}", name, s)));
            }
        }
        for &(name, v) in &[
            ("row direction", &row_direction),
            ("column direction", &column_direction),
        ] {
            if (v.norm() - 1.).abs() > UNIT_TOLERANCE {
                return Err(ConvertError::geometry(
                    "voxel",
                    format!("{} {:?} is not a unit vector", name, v.as_slice()),
                ));
            }
        }
        if !origin.iter().chain(slice_step.iter()).all(|x| x.is_finite()) {
            return Err(ConvertError::geometry("voxel", "non-finite frame position"));
        }
        if frames.checked_frame_count()? == 0 {
            return Err(ConvertError::geometry("voxel", "volume has no frames"));
        }
        Ok(VoxelGeometry {
            column_spacing,
            row_spacing,
            slice_spacing,
            row_direction,
            column_direction,
            origin,
            slice_step,
            frames,
        })
    }

    /// Distance between the centers of adjacent columns.
    pub fn column_spacing(&self) -> f64 {
        self.column_spacing
    }

    /// Distance between the centers of adjacent rows.
    pub fn row_spacing(&self) -> f64 {
        self.row_spacing
    }

    /// Distance between adjacent slices.
    pub fn slice_spacing(&self) -> f64 {
        self.slice_spacing
    }

    /// Unit direction of increasing column index, along a row.
    pub fn row_direction(&self) -> Vector3<f64> {
        self.row_direction
    }

    /// Unit direction of increasing row index, down a column.
    pub fn column_direction(&self) -> Vector3<f64> {
        self.column_direction
    }

    /// Displacement from one slice to the next.
    pub fn slice_step(&self) -> Vector3<f64> {
        self.slice_step
    }

    /// The cross product of the row and column directions.
    pub fn slice_normal(&self) -> Vector3<f64> {
        self.row_direction.cross(&self.column_direction)
    }

    /// How the frames are folded from slices, scalars and volumes.
    pub fn frame_layout(&self) -> &FrameLayout {
        &self.frames
    }

    /// Number of destination frames.
    pub fn number_of_frames(&self) -> usize {
        self.frames.frame_count()
    }

    /// Number of distinct frame positions.
    pub fn slices_per_volume(&self) -> usize {
        self.frames.slices
    }

    /// Position of the first voxel of the given destination frame.
    pub fn frame_origin(&self, frame: usize) -> Vector3<f64> {
        self.origin + self.slice_step * self.frames.slice_of(frame) as f64
    }
}

/// A non-fatal condition met while converting a volume.
#[derive(Debug, Clone, PartialEq)]
pub enum ConversionWarning {
    /// The source lacks orientation information, and a fallback
    /// geometry was used instead.
    GeometryDegraded(String),
    /// The declared NRRD space is not one of the known families (or is
    /// absent), and was treated as LPS.
    UnrecognizedSpace(Option<String>),
    /// A spacing was zero or not a number, and 1 was used instead.
    SpacingDefaulted {
        /// Which spacing
        axis: &'static str,
        /// The value found in the header
        value: f64,
    },
}

impl fmt::Display for ConversionWarning {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConversionWarning::GeometryDegraded(reason) => {
                write!(f, "geometry degraded: {}", reason)
            }
            ConversionWarning::UnrecognizedSpace(Some(space)) => {
                write!(f, "unrecognized space {:?}, assuming LPS", space)
            }
            ConversionWarning::UnrecognizedSpace(None) => {
                write!(f, "no space declared, assuming LPS")
            }
            ConversionWarning::SpacingDefaulted { axis, value } => {
                write!(f, "{} spacing {} replaced with 1", axis, value)
            }
        }
    }
}

/// The warnings recorded during one conversion. Each is logged as it is
/// recorded.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Warnings(Vec<ConversionWarning>);

impl Warnings {
    /// Record a warning.
    pub fn push(&mut self, warning: ConversionWarning) {
        log::warn!("{}", warning);
        self.0.push(warning);
    }

    /// Take the recorded warnings.
    pub fn into_vec(self) -> Vec<ConversionWarning> {
        self.0
    }

    /// Look at the recorded warnings.
    pub fn as_slice(&self) -> &[ConversionWarning] {
        &self.0
    }
}

/// Take the magnitude of a header spacing, replacing unusable values with 1.
pub(crate) fn checked_spacing(axis: &'static str, value: f64, warnings: &mut Warnings) -> f64 {
    let s = value.abs();
    if s.is_finite() && s > 0. {
        s
    } else {
        warnings.push(ConversionWarning::SpacingDefaulted { axis, value });
        1.
    }
}

/// Normalize a direction, failing on zero or non-finite vectors.
pub(crate) fn unit(
    format: &'static str,
    what: &str,
    v: Vector3<f64>,
) -> Result<(Vector3<f64>, f64)> {
    let norm = v.norm();
    if norm.is_finite() && norm > 0. {
        Ok((v / norm, norm))
    } else {
        Err(ConvertError::geometry(
            format,
            format!("degenerate {} {:?}", what, v.as_slice()),
        ))
    }
}
