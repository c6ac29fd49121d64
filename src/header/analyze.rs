//! The Analyze 7.5 header, as written by the Mayo Clinic's Analyze
//! software and SPM.
//!
//! The header is a fixed 348 byte structure split into three parts: the
//! header key, the image dimension and the data history. Unlike NIfTI-1,
//! there is no magic code, so the `sizeof_hdr` field is the only
//! structural check available.

use super::Shape;
use crate::error::Result;
use crate::reader::{resolve_byte_order, HeaderReader};
use crate::typedef::{AnalyzeOrientation, AnalyzeType, Coded};
use crate::util::text_field;
use byteordered::Endianness;

/// Size of the Analyze 7.5 header, as recorded in `sizeof_hdr`.
pub const ANALYZE_HEADER_LEN: u32 = 348;

/// The Analyze 7.5 header data type. Fields are named after the
/// `dbh.h` structure definition.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzeHeader {
    /// Header size, must be 348
    pub sizeof_hdr: i32,
    /// Free text data type name
    pub data_type: [u8; 10],
    /// Database name
    pub db_name: [u8; 18],
    /// Should be 16384
    pub extents: i32,
    /// Session error
    pub session_error: i16,
    /// Must be `b'r'` for regular volumes
    pub regular: u8,
    /// Unused
    pub hkey_un0: u8,
    /// Data array dimensions, `dim[0]` is the number of dimensions
    pub dim: [i16; 8],
    /// Spatial units
    pub vox_units: [u8; 4],
    /// Calibration units
    pub cal_units: [u8; 8],
    /// Unused
    pub unused1: i16,
    /// Data type code
    pub datatype: i16,
    /// Number of bits per voxel
    pub bitpix: i16,
    /// Unused
    pub dim_un0: i16,
    /// Voxel dimensions
    pub pixdim: [f32; 8],
    /// Byte offset of the voxels in the ".img" file
    pub vox_offset: f32,
    /// Scale factor in SPM
    pub funused1: f32,
    /// Unused
    pub funused2: f32,
    /// Unused
    pub funused3: f32,
    /// Max display intensity
    pub cal_max: f32,
    /// Min display intensity
    pub cal_min: f32,
    /// Compression flag
    pub compressed: f32,
    /// Verification flag
    pub verified: f32,
    /// Maximum voxel value
    pub glmax: i32,
    /// Minimum voxel value
    pub glmin: i32,
    /// Free text description
    pub descrip: [u8; 80],
    /// Auxiliary file name
    pub aux_file: [u8; 24],
    /// Slice orientation code
    pub orient: u8,
    /// Originator, SPM keeps the origin voxel here
    pub originator: [u8; 10],
    /// Generator
    pub generated: [u8; 10],
    /// Scan number
    pub scannum: [u8; 10],
    /// Patient identifier
    pub patient_id: [u8; 10],
    /// Experiment date
    pub exp_date: [u8; 10],
    /// Experiment time
    pub exp_time: [u8; 10],
    /// Unused
    pub hist_un0: [u8; 3],
    /// Number of views
    pub views: i32,
    /// Volumes added
    pub vols_added: i32,
    /// Start field
    pub start_field: i32,
    /// Field skip
    pub field_skip: i32,
    /// Maximum original value
    pub omax: i32,
    /// Minimum original value
    pub omin: i32,
    /// Maximum scaled value
    pub smax: i32,
    /// Minimum scaled value
    pub smin: i32,

    /// Byte order in which the header was found
    pub endianness: Endianness,
}

impl AnalyzeHeader {
    /// Parse an Analyze 7.5 header from the start of the given bytes. The
    /// byte order is derived from the `sizeof_hdr` field.
    pub fn from_bytes(bytes: &[u8]) -> Result<AnalyzeHeader> {
        let endianness = resolve_byte_order(bytes, ANALYZE_HEADER_LEN)?;
        let mut input = HeaderReader::new(bytes, endianness);

        // header_key
        let sizeof_hdr = input.read_i32()?;
        let data_type = input.read_array()?;
        let db_name = input.read_array()?;
        let extents = input.read_i32()?;
        let session_error = input.read_i16()?;
        let regular = input.read_u8()?;
        let hkey_un0 = input.read_u8()?;

        // image_dimension
        let mut dim = [0; 8];
        input.read_i16_into(&mut dim)?;
        let vox_units = input.read_array()?;
        let cal_units = input.read_array()?;
        let unused1 = input.read_i16()?;
        let datatype = input.read_i16()?;
        let bitpix = input.read_i16()?;
        let dim_un0 = input.read_i16()?;
        let mut pixdim = [0.; 8];
        input.read_f32_into(&mut pixdim)?;
        let vox_offset = input.read_f32()?;
        let funused1 = input.read_f32()?;
        let funused2 = input.read_f32()?;
        let funused3 = input.read_f32()?;
        let cal_max = input.read_f32()?;
        let cal_min = input.read_f32()?;
        let compressed = input.read_f32()?;
        let verified = input.read_f32()?;
        let glmax = input.read_i32()?;
        let glmin = input.read_i32()?;

        // data_history
        let descrip = input.read_array()?;
        let aux_file = input.read_array()?;
        let orient = input.read_u8()?;
        let originator = input.read_array()?;
        let generated = input.read_array()?;
        let scannum = input.read_array()?;
        let patient_id = input.read_array()?;
        let exp_date = input.read_array()?;
        let exp_time = input.read_array()?;
        let hist_un0 = input.read_array()?;
        let views = input.read_i32()?;
        let vols_added = input.read_i32()?;
        let start_field = input.read_i32()?;
        let field_skip = input.read_i32()?;
        let omax = input.read_i32()?;
        let omin = input.read_i32()?;
        let smax = input.read_i32()?;
        let smin = input.read_i32()?;
        debug_assert_eq!(input.position(), ANALYZE_HEADER_LEN as usize);

        Ok(AnalyzeHeader {
            sizeof_hdr,
            data_type,
            db_name,
            extents,
            session_error,
            regular,
            hkey_un0,
            dim,
            vox_units,
            cal_units,
            unused1,
            datatype,
            bitpix,
            dim_un0,
            pixdim,
            vox_offset,
            funused1,
            funused2,
            funused3,
            cal_max,
            cal_min,
            compressed,
            verified,
            glmax,
            glmin,
            descrip,
            aux_file,
            orient,
            originator,
            generated,
            scannum,
            patient_id,
            exp_date,
            exp_time,
            hist_un0,
            views,
            vols_added,
            start_field,
            field_skip,
            omax,
            omin,
            smax,
            smin,
            endianness,
        })
    }

    /// Validate the `dim` field into a volume shape.
    pub fn shape(&self) -> Result<Shape> {
        Shape::from_dim(&self.dim)
    }

    /// Get the data type as a mapped code.
    pub fn data_type(&self) -> Coded<AnalyzeType> {
        Coded::from_code(self.datatype)
    }

    /// Get the slice orientation as a mapped code.
    pub fn orientation(&self) -> Coded<AnalyzeOrientation> {
        Coded::from_code(self.orient)
    }

    /// Byte offset of the voxels in the image file. Negative or
    /// non-finite offsets are read as 0.
    pub fn data_offset(&self) -> usize {
        if self.vox_offset.is_finite() && self.vox_offset > 0. {
            self.vox_offset as usize
        } else {
            0
        }
    }

    /// The SPM scale factor, when it holds something other than the
    /// identity.
    pub fn spm_scale(&self) -> Option<f32> {
        let scale = self.funused1;
        if scale.is_finite() && scale != 0. && scale != 1. {
            Some(scale)
        } else {
            None
        }
    }

    /// The `descrip` field as text.
    pub fn description(&self) -> String {
        text_field(&self.descrip)
    }

    /// The `patient_id` field as text.
    pub fn patient_id(&self) -> String {
        text_field(&self.patient_id)
    }

    /// The `vox_units` field as text.
    pub fn voxel_units(&self) -> String {
        text_field(&self.vox_units)
    }
}
