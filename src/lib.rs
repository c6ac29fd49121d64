//! Conversion of volumetric medical images into multi-frame image
//! geometry.
//!
//! This crate reads Analyze 7.5, NIfTI-1, NRRD and raw voxel volumes and
//! turns each of them into a [`ConversionResult`]: the samples in
//! destination frame order, an encoding descriptor, and a
//! [`VoxelGeometry`] expressed in LPS+ patient coordinates.
//!
//! # Example
//!
//! ```no_run
//! use voxconv::convert_file;
//! # use voxconv::Result;
//!
//! # fn run() -> Result<()> {
//! let result = convert_file("brain.nii.gz")?;
//! let geometry = &result.geometry;
//! println!("row direction: {:?}", geometry.row_direction());
//! for frame in 0..geometry.number_of_frames() {
//!     println!("frame {} at {:?}", frame, geometry.frame_origin(frame));
//! }
//! for warning in &result.warnings {
//!     println!("warning: {}", warning);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! [`ConversionResult`]: ./convert/struct.ConversionResult.html
//! [`VoxelGeometry`]: ./geometry/struct.VoxelGeometry.html
#![deny(missing_debug_implementations)]
#![warn(missing_docs, unused_extern_crates, trivial_casts, unused_results)]

#[macro_use]
extern crate quick_error;
#[macro_use]
extern crate num_derive;

pub mod affine;
pub mod convert;
pub mod error;
pub mod geometry;
pub mod header;
pub mod reader;
pub mod typedef;
mod util;
pub mod volume;

pub use crate::convert::{convert_file, ConversionResult, ConvertOptions};
pub use crate::error::{ConvertError, Result};
pub use crate::geometry::{ConversionWarning, VoxelGeometry};
pub use crate::header::{AnalyzeHeader, NiftiHeader, NrrdHeader, RawDescription};
pub use crate::volume::{FrameOrder, PixelEncoding, Photometric, SampleFormat, VoxelBuffer};
#[cfg(feature = "ndarray_volumes")]
pub use crate::volume::ndarray::IntoNdArray;
pub use byteordered::Endianness;
