//! Conversion of whole volumes, from source bytes or files to a
//! [`ConversionResult`].
//!
//! Every conversion runs the same sequence: parse the header, derive the
//! geometry, load the samples (reordering them when the source axis order
//! differs from the destination), and assemble the result. The entry
//! points are methods of [`ConvertOptions`], which carries the few choices
//! a caller can make.
//!
//! # Example
//!
//! ```no_run
//! use voxconv::{ConvertOptions, FrameOrder};
//! # use voxconv::Result;
//!
//! # fn run() -> Result<()> {
//! let result = ConvertOptions::new()
//!     .frame_order(FrameOrder::SliceMajor)
//!     .convert_file("dwi.nhdr")?;
//! println!(
//!     "{} frames of {}x{}",
//!     result.geometry.number_of_frames(),
//!     result.columns,
//!     result.rows
//! );
//! # Ok(())
//! # }
//! ```
//!
//! [`ConversionResult`]: ./struct.ConversionResult.html
//! [`ConvertOptions`]: ./struct.ConvertOptions.html
use crate::error::{ConvertError, Result};
use crate::geometry::{self, ConversionWarning, VoxelGeometry, Warnings};
use crate::header::nifti::{MAGIC_CODE_NI1, MAGIC_CODE_NIP1, MAGIC_OFFSET};
use crate::header::nrrd::{NrrdEncoding, NrrdType};
use crate::header::{AnalyzeHeader, NiftiHeader, NrrdHeader, RawDescription};
use crate::typedef::{AnalyzeType, Coded, NiftiType};
use crate::util::{checked_product, gunzip, plain_file_name, read_companion, read_file};
use crate::volume::{
    FrameOrder, PixelEncoding, Rescale, SampleFormat, ValueRange, VoxelBuffer,
};
use byteordered::Endianness;
use std::borrow::Cow;
use std::fs;
use std::path::Path;

/// Extension of the description file accompanying a raw voxel file.
pub const RAW_DESCRIPTION_EXTENSION: &str = "desc";

/// The outcome of converting a volume: its geometry, its samples in
/// destination order, and how the samples are encoded.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionResult {
    /// Spatial placement of the frames
    pub geometry: VoxelGeometry,
    /// Samples, column fastest, then row, then frame
    pub pixels: VoxelBuffer,
    /// Encoding descriptor of the samples
    pub encoding: PixelEncoding,
    /// Number of rows per frame
    pub rows: usize,
    /// Number of columns per frame
    pub columns: usize,
    /// Minimum and maximum sample, for floating point samples
    pub value_range: Option<ValueRange>,
    /// Non-fatal conditions met during the conversion
    pub warnings: Vec<ConversionWarning>,
}

impl ConversionResult {
    /// Number of samples in one frame.
    pub fn frame_len(&self) -> usize {
        self.rows * self.columns * usize::from(self.encoding.samples_per_pixel)
    }
}

/// Options and entry points for volume conversion.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct ConvertOptions {
    frame_order: FrameOrder,
}

/// Convert the file at the given path with the default options.
pub fn convert_file<P: AsRef<Path>>(path: P) -> Result<ConversionResult> {
    ConvertOptions::new().convert_file(path)
}

impl ConvertOptions {
    /// Create options with the defaults: scalar-major frame order.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set how per-voxel scalar components and slices are folded into
    /// frames.
    pub fn frame_order(mut self, order: FrameOrder) -> Self {
        self.frame_order = order;
        self
    }

    /// Convert a file, telling its format from its name:
    ///
    /// - `.nii` single-file NIfTI-1
    /// - `.hdr` Analyze 7.5 or NIfTI-1 pair, decided by the magic code, with
    ///   the samples in the ".img" file next to it
    /// - `.nrrd` and `.nhdr` NRRD, with a detached data file resolved
    ///   relative to the header
    /// - `.raw` raw samples, described by the ".desc" file next to it
    ///
    /// Any of these may be gzip compressed, with a trailing ".gz".
    pub fn convert_file<P: AsRef<Path>>(&self, path: P) -> Result<ConversionResult> {
        let path = path.as_ref();
        let name = plain_file_name(path);
        log::debug!("converting {}", path.display());
        if name.ends_with(".nii") {
            let bytes = read_file(path)?;
            let header = NiftiHeader::from_bytes(&bytes)?;
            if header.is_single_file() {
                self.nifti_with_header(&header, &bytes)
            } else {
                let image = read_companion(path, "img")?;
                self.nifti_with_header(&header, &image)
            }
        } else if name.ends_with(".hdr") {
            let bytes = read_file(path)?;
            let image = read_companion(path, "img")?;
            if has_nifti_magic(&bytes) {
                self.convert_nifti_pair(&bytes, &image)
            } else {
                self.convert_analyze(&bytes, &image)
            }
        } else if name.ends_with(".nrrd") || name.ends_with(".nhdr") {
            let bytes = read_file(path)?;
            let header = NrrdHeader::from_bytes(&bytes)?;
            match &header.data_file {
                Some(file) => {
                    let data_path = match path.parent() {
                        Some(dir) => dir.join(file),
                        None => Path::new(file).to_path_buf(),
                    };
                    log::debug!("reading NRRD data file {}", data_path.display());
                    // decompression is up to the declared encoding
                    let data = fs::read(&data_path)?;
                    self.nrrd_with_header(&header, &data)
                }
                None => self.nrrd_with_header(&header, &bytes),
            }
        } else if name.ends_with(".raw") {
            let data = read_file(path)?;
            let description = read_companion(path, RAW_DESCRIPTION_EXTENSION)?;
            let description = String::from_utf8(description).map_err(|e| {
                ConvertError::format(format!("raw description is not UTF-8 text: {}", e))
            })?;
            self.convert_raw(&description, &data)
        } else {
            Err(ConvertError::format(format!(
                "cannot tell the format of {}",
                path.display()
            )))
        }
    }

    /// Convert an Analyze 7.5 volume from its header and image bytes.
    pub fn convert_analyze(&self, header: &[u8], image: &[u8]) -> Result<ConversionResult> {
        let header = AnalyzeHeader::from_bytes(header)?;
        let mut warnings = Warnings::default();
        let geometry = geometry::analyze::derive(&header, &mut warnings)?;
        let (format, spp) = match header.data_type() {
            Coded::Known(AnalyzeType::Uint8) => (SampleFormat::U8, 1),
            Coded::Known(AnalyzeType::Int16) => (SampleFormat::I16, 1),
            Coded::Known(AnalyzeType::Float32) => (SampleFormat::F32, 1),
            Coded::Known(AnalyzeType::Float64) => (SampleFormat::F64, 1),
            Coded::Known(AnalyzeType::Rgb24) => (SampleFormat::U8, 3),
            other => {
                return Err(ConvertError::UnsupportedDataType(format!(
                    "Analyze datatype {:?} (byte 70)",
                    other
                )))
            }
        };
        let rescale = header.spm_scale().map(|s| Rescale {
            slope: f64::from(s),
            intercept: 0.,
        });
        let shape = header.shape()?;
        assemble(
            geometry,
            Contiguous {
                bytes: image,
                offset: header.data_offset(),
                columns: shape.columns,
                rows: shape.rows,
                spp,
                format,
                endianness: header.endianness,
            },
            rescale,
            warnings,
        )
    }

    /// Convert a single-file NIfTI-1 volume.
    pub fn convert_nifti(&self, bytes: &[u8]) -> Result<ConversionResult> {
        let header = NiftiHeader::from_bytes(bytes)?;
        if !header.is_single_file() {
            return Err(ConvertError::format(
                "NIfTI magic \"ni1\" announces a separate image file",
            ));
        }
        self.nifti_with_header(&header, bytes)
    }

    /// Convert a NIfTI-1 volume stored as a header and image file pair.
    pub fn convert_nifti_pair(&self, header: &[u8], image: &[u8]) -> Result<ConversionResult> {
        let header = NiftiHeader::from_bytes(header)?;
        if header.is_single_file() {
            return Err(ConvertError::format(
                "NIfTI magic \"n+1\" announces the image in the header file",
            ));
        }
        self.nifti_with_header(&header, image)
    }

    fn nifti_with_header(&self, header: &NiftiHeader, bytes: &[u8]) -> Result<ConversionResult> {
        let mut warnings = Warnings::default();
        let geometry = geometry::nifti::derive(header, &mut warnings)?;
        let (format, spp) = match header.data_type() {
            Coded::Known(NiftiType::Uint8) => (SampleFormat::U8, 1),
            Coded::Known(NiftiType::Int8) => (SampleFormat::I8, 1),
            Coded::Known(NiftiType::Uint16) => (SampleFormat::U16, 1),
            Coded::Known(NiftiType::Int16) => (SampleFormat::I16, 1),
            Coded::Known(NiftiType::Float32) => (SampleFormat::F32, 1),
            Coded::Known(NiftiType::Float64) => (SampleFormat::F64, 1),
            Coded::Known(NiftiType::Rgb24) => (SampleFormat::U8, 3),
            other => {
                return Err(ConvertError::UnsupportedDataType(format!(
                    "NIfTI datatype {:?} (byte 70)",
                    other
                )))
            }
        };
        let (slope, intercept) = (f64::from(header.scl_slope), f64::from(header.scl_inter));
        let rescale = if slope.is_finite() && slope != 0. {
            let intercept = if intercept.is_finite() { intercept } else { 0. };
            if slope == 1. && intercept == 0. {
                None
            } else {
                Some(Rescale { slope, intercept })
            }
        } else {
            None
        };
        let shape = header.shape()?;
        assemble(
            geometry,
            Contiguous {
                bytes,
                offset: header.data_offset()?,
                columns: shape.columns,
                rows: shape.rows,
                spp,
                format,
                endianness: header.endianness,
            },
            rescale,
            warnings,
        )
    }

    /// Convert a NRRD volume. `data` holds the detached data file, and is
    /// only consulted when the header names one.
    pub fn convert_nrrd(&self, header: &[u8], data: Option<&[u8]>) -> Result<ConversionResult> {
        let bytes = header;
        let header = NrrdHeader::from_bytes(bytes)?;
        match (&header.data_file, data) {
            (None, _) => self.nrrd_with_header(&header, bytes),
            (Some(_), Some(data)) => self.nrrd_with_header(&header, data),
            (Some(file), None) => Err(ConvertError::format(format!(
                "NRRD data file {:?} was not provided",
                file
            ))),
        }
    }

    /// `source` is either the header file itself or the detached data file.
    fn nrrd_with_header(&self, header: &NrrdHeader, source: &[u8]) -> Result<ConversionResult> {
        let format = match header.sample_type {
            NrrdType::Int8 => SampleFormat::I8,
            NrrdType::Uint8 => SampleFormat::U8,
            NrrdType::Int16 => SampleFormat::I16,
            NrrdType::Uint16 => SampleFormat::U16,
            NrrdType::Float => SampleFormat::F32,
            NrrdType::Double => SampleFormat::F64,
            other => {
                return Err(ConvertError::UnsupportedDataType(format!(
                    "NRRD type {:?}",
                    other
                )))
            }
        };
        let layout = geometry::nrrd::layout(header)?;
        let mut warnings = Warnings::default();
        let geometry =
            geometry::nrrd::derive(header, &layout, self.frame_order, &mut warnings)?;

        let payload = if header.data_file.is_some() {
            source
        } else {
            let offset = header.data_offset.ok_or_else(|| {
                ConvertError::format("NRRD header is not terminated by an empty line")
            })?;
            &source[offset..]
        };
        let count = layout.element_count();
        let needed = checked_product("sizes", [count, format.size_of()].iter().cloned())?;
        let (data, offset) = nrrd_payload(header, payload, needed)?;
        log::debug!("NRRD samples at byte {} of the payload", offset);

        let (pixels, range) = VoxelBuffer::load(&data, offset, count, format, header.endianness)?;
        let frames = *geometry.frame_layout();
        let (pixels, value_range) = if layout.is_destination_order(&frames) {
            (pixels, range)
        } else {
            log::debug!("reordering NRRD axes {:?}", layout.axes());
            pixels.reorder(&layout, &frames)?
        };
        Ok(ConversionResult {
            encoding: PixelEncoding::new(format, layout.samples_per_pixel() as u16),
            rows: layout.rows(),
            columns: layout.columns(),
            geometry,
            pixels,
            value_range,
            warnings: warnings.into_vec(),
        })
    }

    /// Convert a raw voxel file from its description text and samples.
    pub fn convert_raw(&self, description: &str, data: &[u8]) -> Result<ConversionResult> {
        let desc = RawDescription::from_text(description)?;
        let mut warnings = Warnings::default();
        let geometry = geometry::raw::derive(&desc, &mut warnings)?;
        assemble(
            geometry,
            Contiguous {
                bytes: data,
                offset: desc.offset,
                columns: desc.columns,
                rows: desc.rows,
                spp: 1,
                format: desc.format,
                endianness: desc.endianness,
            },
            None,
            warnings,
        )
    }
}

/// Whether a header carries one of the NIfTI-1 magic codes.
fn has_nifti_magic(bytes: &[u8]) -> bool {
    match bytes.get(MAGIC_OFFSET..MAGIC_OFFSET + 4) {
        Some(magic) => magic == MAGIC_CODE_NI1 || magic == MAGIC_CODE_NIP1,
        None => false,
    }
}

/// Samples already in destination order.
struct Contiguous<'a> {
    bytes: &'a [u8],
    offset: usize,
    columns: usize,
    rows: usize,
    spp: usize,
    format: SampleFormat,
    endianness: Endianness,
}

fn assemble(
    geometry: VoxelGeometry,
    source: Contiguous,
    rescale: Option<Rescale>,
    warnings: Warnings,
) -> Result<ConversionResult> {
    let extents = [
        source.columns,
        source.rows,
        geometry.number_of_frames(),
        source.spp,
    ];
    let count = checked_product("dim", extents.iter().cloned())?;
    log::debug!(
        "loading {} {:?} samples at byte {}",
        count,
        source.format,
        source.offset
    );
    let (pixels, value_range) = VoxelBuffer::load(
        source.bytes,
        source.offset,
        count,
        source.format,
        source.endianness,
    )?;
    Ok(ConversionResult {
        geometry,
        pixels,
        encoding: PixelEncoding::new(source.format, source.spp as u16).with_rescale(rescale),
        rows: source.rows,
        columns: source.columns,
        value_range,
        warnings: warnings.into_vec(),
    })
}

/// Decode the payload of a NRRD, returning the decoded bytes and the
/// offset of the first sample in them.
fn nrrd_payload<'a>(
    header: &NrrdHeader,
    payload: &'a [u8],
    needed: usize,
) -> Result<(Cow<'a, [u8]>, usize)> {
    let mut payload = payload;
    for _ in 0..header.line_skip {
        match payload.iter().position(|&b| b == b'\n') {
            Some(i) => payload = &payload[i + 1..],
            None => {
                return Err(ConvertError::format(format!(
                    "NRRD line skip of {} runs past the payload",
                    header.line_skip
                )))
            }
        }
    }
    let data = match &header.encoding {
        NrrdEncoding::Raw => Cow::Borrowed(payload),
        NrrdEncoding::Gzip => Cow::Owned(gunzip(payload)?),
        NrrdEncoding::Other(e) => {
            return Err(ConvertError::format(format!(
                "NRRD encoding {:?} is not supported",
                e
            )))
        }
    };
    let offset = if header.byte_skip == -1 {
        data.len().checked_sub(needed).ok_or(ConvertError::ShortRead {
            offset: 0,
            needed,
            available: data.len(),
        })?
    } else {
        header.byte_skip as usize
    };
    Ok((data, offset))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nifti_magic_detection() {
        let mut bytes = vec![0u8; 348];
        assert!(!has_nifti_magic(&bytes));
        bytes[344..348].copy_from_slice(b"ni1\0");
        assert!(has_nifti_magic(&bytes));
        assert!(!has_nifti_magic(&bytes[..346]));
    }

    #[test]
    fn nrrd_byte_skip_from_end() {
        let header = NrrdHeader::from_bytes(
            b"NRRD0004\ntype: uchar\ndimension: 2\nsizes: 2 2\nencoding: raw\nbyte skip: -1\n\n",
        )
        .unwrap();
        let (data, offset) = nrrd_payload(&header, &[9, 9, 9, 1, 2, 3, 4], 4).unwrap();
        assert_eq!(&data[offset..], &[1, 2, 3, 4]);
        assert!(nrrd_payload(&header, &[1, 2], 4).is_err());
    }

    #[test]
    fn nrrd_line_skip() {
        let header = NrrdHeader::from_bytes(
            b"NRRD0004\ntype: uchar\ndimension: 2\nsizes: 2 1\nencoding: raw\nline skip: 2\n\n",
        )
        .unwrap();
        let (data, offset) = nrrd_payload(&header, b"a\nbb\n\x05\x06", 2).unwrap();
        assert_eq!(&data[offset..], &[5, 6]);
    }

    #[test]
    fn unknown_file_type() {
        let e = ConvertOptions::new().convert_file("volume.dcm").unwrap_err();
        assert!(e.is_format_error());
    }
}
