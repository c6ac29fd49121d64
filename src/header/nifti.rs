//! This module defines the `NiftiHeader` struct, which is used
//! to provide important information about NIFTI-1 volumes.

use super::Shape;
use crate::error::{ConvertError, Result};
use crate::reader::{resolve_byte_order, HeaderReader};
use crate::typedef::*;
use crate::util::text_field;
use byteordered::Endianness;

/// Magic code for NIFTI-1 header files (extention ".hdr[.gz]").
pub const MAGIC_CODE_NI1: &[u8; 4] = b"ni1\0";
/// Magic code for full NIFTI-1 files (extention ".nii[.gz]").
pub const MAGIC_CODE_NIP1: &[u8; 4] = b"n+1\0";
/// Size of the NIfTI-1 header, as recorded in `sizeof_hdr`.
pub const NIFTI1_HEADER_LEN: u32 = 348;
/// Byte offset of the magic code.
pub const MAGIC_OFFSET: usize = 344;

/// The NIFTI-1 header data type.
/// All fields are public and named after those of `nifti1.h`.
/// Coded fields keep their raw value; typed accessors map them into the
/// enumerations of the [`typedef`](../../typedef/index.html) module.
#[derive(Debug, Clone, PartialEq)]
pub struct NiftiHeader {
    /// Header size, must be 348
    pub sizeof_hdr: i32,
    /// Unused in NIFTI-1
    pub data_type: [u8; 10],
    /// Unused in NIFTI-1
    pub db_name: [u8; 18],
    /// Unused in NIFTI-1
    pub extents: i32,
    /// Unused in NIFTI-1
    pub session_error: i16,
    /// Unused in NIFTI-1
    pub regular: u8,
    /// MRI slice ordering
    pub dim_info: u8,
    /// Data array dimensions
    pub dim: [i16; 8],
    /// 1st intent parameter
    pub intent_p1: f32,
    /// 2nd intent parameter
    pub intent_p2: f32,
    /// 3rd intent parameter
    pub intent_p3: f32,
    /// NIFTI_INTENT_* code
    pub intent_code: i16,
    /// Defines the data type!
    pub datatype: i16,
    /// Number of bits per voxel
    pub bitpix: i16,
    /// First slice index
    pub slice_start: i16,
    /// Grid spacings, `pixdim[0]` holds the qform reflection factor
    pub pixdim: [f32; 8],
    /// Offset into .nii file to reach the volume
    pub vox_offset: f32,
    /// Data scaling: slope
    pub scl_slope: f32,
    /// Data scaling: offset
    pub scl_inter: f32,
    /// Last slice index
    pub slice_end: i16,
    /// Slice timing order
    pub slice_code: u8,
    /// Units of pixdim[1..4]
    pub xyzt_units: u8,
    /// Max display intensity
    pub cal_max: f32,
    /// Min display intensity
    pub cal_min: f32,
    /// Time for 1 slice
    pub slice_duration: f32,
    /// Time axis shift
    pub toffset: f32,
    /// Unused in NIFTI-1
    pub glmax: i32,
    /// Unused in NIFTI-1
    pub glmin: i32,

    /// Any text you like
    pub descrip: [u8; 80],
    /// Auxiliary filename
    pub aux_file: [u8; 24],
    /// NIFTI_XFORM_* code
    pub qform_code: i16,
    /// NIFTI_XFORM_* code
    pub sform_code: i16,
    /// Quaternion b param
    pub quatern_b: f32,
    /// Quaternion c param
    pub quatern_c: f32,
    /// Quaternion d param
    pub quatern_d: f32,
    /// Quaternion x shift
    pub quatern_x: f32,
    /// Quaternion y shift
    pub quatern_y: f32,
    /// Quaternion z shift
    pub quatern_z: f32,

    /// 1st row affine transform
    pub srow_x: [f32; 4],
    /// 2nd row affine transform
    pub srow_y: [f32; 4],
    /// 3rd row affine transform
    pub srow_z: [f32; 4],

    /// 'name' or meaning of data
    pub intent_name: [u8; 16],

    /// Magic code. Must be `b"ni1\0"` or `b"n+1\0"`
    pub magic: [u8; 4],

    /// Byte order in which the header was found
    pub endianness: Endianness,
}

impl Default for NiftiHeader {
    fn default() -> NiftiHeader {
        NiftiHeader {
            sizeof_hdr: 348,
            data_type: [0; 10],
            db_name: [0; 18],
            extents: 0,
            session_error: 0,
            regular: 0,
            dim_info: 0,
            dim: [1, 1, 0, 0, 0, 0, 0, 0],
            intent_p1: 0.,
            intent_p2: 0.,
            intent_p3: 0.,
            intent_code: 0,
            datatype: 0,
            bitpix: 0,
            slice_start: 0,
            pixdim: [1.; 8],
            vox_offset: 352.,
            scl_slope: 0.,
            scl_inter: 0.,
            slice_end: 0,
            slice_code: 0,
            xyzt_units: 0,
            cal_max: 0.,
            cal_min: 0.,
            slice_duration: 0.,
            toffset: 0.,
            glmax: 0,
            glmin: 0,

            descrip: [0; 80],
            aux_file: [0; 24],
            qform_code: 0,
            sform_code: 0,
            quatern_b: 0.,
            quatern_c: 0.,
            quatern_d: 0.,
            quatern_x: 0.,
            quatern_y: 0.,
            quatern_z: 0.,

            srow_x: [0.; 4],
            srow_y: [0.; 4],
            srow_z: [0.; 4],

            intent_name: [0; 16],

            magic: *MAGIC_CODE_NIP1,

            endianness: Endianness::Little,
        }
    }
}

impl NiftiHeader {
    /// Parse a NIfTI-1 header from the start of the given bytes. The byte
    /// order is derived from the `sizeof_hdr` field.
    ///
    /// # Errors
    ///
    /// - `ConvertError::ShortRead` if fewer than 348 bytes are available
    /// - `ConvertError::IndeterminateByteOrder` if `sizeof_hdr` is not 348
    ///   in either byte order
    /// - `ConvertError::BadMagic` if the magic code is neither `"n+1\0"`
    ///   nor `"ni1\0"`
    pub fn from_bytes(bytes: &[u8]) -> Result<NiftiHeader> {
        let endianness = resolve_byte_order(bytes, NIFTI1_HEADER_LEN)?;
        let mut input = HeaderReader::new(bytes, endianness);
        let mut h = NiftiHeader {
            endianness,
            ..NiftiHeader::default()
        };

        h.sizeof_hdr = input.read_i32()?;
        h.data_type = input.read_array()?;
        h.db_name = input.read_array()?;
        h.extents = input.read_i32()?;
        h.session_error = input.read_i16()?;
        h.regular = input.read_u8()?;
        h.dim_info = input.read_u8()?;
        input.read_i16_into(&mut h.dim)?;
        h.intent_p1 = input.read_f32()?;
        h.intent_p2 = input.read_f32()?;
        h.intent_p3 = input.read_f32()?;
        h.intent_code = input.read_i16()?;
        h.datatype = input.read_i16()?;
        h.bitpix = input.read_i16()?;
        h.slice_start = input.read_i16()?;
        input.read_f32_into(&mut h.pixdim)?;
        h.vox_offset = input.read_f32()?;
        h.scl_slope = input.read_f32()?;
        h.scl_inter = input.read_f32()?;
        h.slice_end = input.read_i16()?;
        h.slice_code = input.read_u8()?;
        h.xyzt_units = input.read_u8()?;
        h.cal_max = input.read_f32()?;
        h.cal_min = input.read_f32()?;
        h.slice_duration = input.read_f32()?;
        h.toffset = input.read_f32()?;
        h.glmax = input.read_i32()?;
        h.glmin = input.read_i32()?;

        h.descrip = input.read_array()?;
        h.aux_file = input.read_array()?;
        h.qform_code = input.read_i16()?;
        h.sform_code = input.read_i16()?;
        h.quatern_b = input.read_f32()?;
        h.quatern_c = input.read_f32()?;
        h.quatern_d = input.read_f32()?;
        h.quatern_x = input.read_f32()?;
        h.quatern_y = input.read_f32()?;
        h.quatern_z = input.read_f32()?;
        input.read_f32_into(&mut h.srow_x)?;
        input.read_f32_into(&mut h.srow_y)?;
        input.read_f32_into(&mut h.srow_z)?;
        h.intent_name = input.read_array()?;

        debug_assert_eq!(input.position(), MAGIC_OFFSET);
        h.magic = input.read_array()?;

        if &h.magic != MAGIC_CODE_NI1 && &h.magic != MAGIC_CODE_NIP1 {
            return Err(ConvertError::BadMagic {
                offset: MAGIC_OFFSET,
                found: h.magic.to_vec(),
            });
        }
        Ok(h)
    }

    /// Whether the voxel data follows the header in the same file
    /// (magic code `"n+1\0"`), rather than in a separate ".img" file.
    pub fn is_single_file(&self) -> bool {
        &self.magic == MAGIC_CODE_NIP1
    }

    /// Validate the `dim` field into a volume shape.
    pub fn shape(&self) -> Result<Shape> {
        Shape::from_dim(&self.dim)
    }

    /// Byte offset of the voxel data in a single-file NIfTI.
    pub fn data_offset(&self) -> Result<usize> {
        if !self.is_single_file() {
            return Ok(0);
        }
        let offset = self.vox_offset;
        if !offset.is_finite() || offset < NIFTI1_HEADER_LEN as f32 {
            return Err(ConvertError::format(format!(
                "vox_offset (byte 108) is {}, which points inside the 348 byte header",
                offset
            )));
        }
        Ok(offset as usize)
    }

    /// Get the data type as a mapped code.
    pub fn data_type(&self) -> Coded<NiftiType> {
        Coded::from_code(self.datatype)
    }

    /// Get the spatial units type as a mapped code.
    pub fn xyzt_to_space(&self) -> Coded<Unit> {
        Coded::from_code(self.xyzt_units & 0o0007)
    }

    /// Get the time units type as a mapped code.
    pub fn xyzt_to_time(&self) -> Coded<Unit> {
        Coded::from_code(self.xyzt_units & 0o0070)
    }

    /// Get the slice order as a mapped code.
    pub fn slice_order(&self) -> Coded<SliceOrder> {
        Coded::from_code(self.slice_code)
    }

    /// Get the intent as a mapped code.
    pub fn intent(&self) -> Coded<Intent> {
        Coded::from_code(self.intent_code)
    }

    /// Get the qform coordinate mapping method as a mapped code.
    pub fn qform(&self) -> Coded<XForm> {
        Coded::from_code(self.qform_code)
    }

    /// Get the sform coordinate mapping method as a mapped code.
    pub fn sform(&self) -> Coded<XForm> {
        Coded::from_code(self.sform_code)
    }

    /// The `descrip` field as text.
    pub fn description(&self) -> String {
        text_field(&self.descrip)
    }

    /// The `intent_name` field as text.
    pub fn intent_name(&self) -> String {
        text_field(&self.intent_name)
    }

    /// The `aux_file` field as text.
    pub fn aux_file(&self) -> String {
        text_field(&self.aux_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn le_header() -> Vec<u8> {
        let mut bytes = vec![0u8; 352];
        bytes[0..4].copy_from_slice(&348i32.to_le_bytes());
        bytes[40..42].copy_from_slice(&3i16.to_le_bytes());
        bytes[42..44].copy_from_slice(&4i16.to_le_bytes());
        bytes[44..46].copy_from_slice(&5i16.to_le_bytes());
        bytes[46..48].copy_from_slice(&6i16.to_le_bytes());
        bytes[70..72].copy_from_slice(&4i16.to_le_bytes());
        bytes[80..84].copy_from_slice(&1.5f32.to_le_bytes());
        bytes[108..112].copy_from_slice(&352f32.to_le_bytes());
        bytes[148..151].copy_from_slice(b"abc");
        bytes[252..254].copy_from_slice(&1i16.to_le_bytes());
        bytes[268..272].copy_from_slice(&10f32.to_le_bytes());
        bytes[344..348].copy_from_slice(MAGIC_CODE_NIP1);
        bytes
    }

    #[test]
    fn parse_fields_at_offsets() {
        let h = NiftiHeader::from_bytes(&le_header()).unwrap();
        assert_eq!(h.endianness, Endianness::Little);
        assert_eq!(h.dim, [3, 4, 5, 6, 0, 0, 0, 0]);
        assert_eq!(h.data_type(), Coded::Known(NiftiType::Int16));
        assert_eq!(h.pixdim[1], 1.5);
        assert_eq!(h.qform(), Coded::Known(XForm::ScannerAnat));
        assert_eq!(h.quatern_x, 10.);
        assert_eq!(h.description(), "abc");
        assert!(h.is_single_file());
        assert_eq!(h.data_offset().unwrap(), 352);
    }

    #[test]
    fn bad_magic() {
        let mut bytes = le_header();
        bytes[344..348].copy_from_slice(b"n+2\0");
        match NiftiHeader::from_bytes(&bytes) {
            Err(ConvertError::BadMagic { offset: 344, found }) => {
                assert_eq!(found, b"n+2\0".to_vec())
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn truncated() {
        let bytes = le_header();
        match NiftiHeader::from_bytes(&bytes[..200]) {
            Err(ConvertError::ShortRead { offset, .. }) => assert!(offset <= 200),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn unrecognized_codes_are_kept() {
        let mut bytes = le_header();
        bytes[70..72].copy_from_slice(&3i16.to_le_bytes());
        bytes[254..256].copy_from_slice(&9i16.to_le_bytes());
        let h = NiftiHeader::from_bytes(&bytes).unwrap();
        assert_eq!(h.data_type(), Coded::Unrecognized(3));
        assert_eq!(h.sform(), Coded::Unrecognized(9));
    }

    #[test]
    fn vox_offset_inside_header() {
        let mut bytes = le_header();
        bytes[108..112].copy_from_slice(&100f32.to_le_bytes());
        let h = NiftiHeader::from_bytes(&bytes).unwrap();
        assert!(h.data_offset().unwrap_err().is_format_error());
    }
}
