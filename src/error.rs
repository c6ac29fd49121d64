//! Types for error handling go here.
use std::io::Error as IOError;

quick_error! {
    /// Error type for all errors that may occur while converting a volume.
    #[derive(Debug)]
    pub enum ConvertError {
        /// The byte source ended before a value could be read in full.
        ShortRead { offset: usize, needed: usize, available: usize } {
            display("short read at byte {}: needed {} bytes, only {} available",
                    offset, needed, available)
        }
        /// The header violates the structure of its format.
        Format(reason: String) {
            display("format error: {}", reason)
        }
        /// The header size field matched neither byte order.
        IndeterminateByteOrder { little: u32, big: u32 } {
            display("format error: indeterminate byte order (header size reads {} as little \
                     endian, {} as big endian)", little, big)
        }
        /// The magic code of a file did not match any known value.
        BadMagic { offset: usize, found: Vec<u8> } {
            display("format error: invalid magic code {:?} at byte {}", found, offset)
        }
        /// The orientation or transform is recognized but cannot be converted.
        UnsupportedGeometry { format: &'static str, code: String } {
            display("unsupported {} geometry: {}", format, code)
        }
        /// The voxel data type cannot be represented in the destination buffer.
        UnsupportedDataType(t: String) {
            display("unsupported data type: {}", t)
        }
        /// I/O Error
        Io(err: IOError) {
            from()
            source(err)
            display("{}", err)
        }
    }
}

impl ConvertError {
    /// Whether this error reports a structural violation of the input format
    /// (including an unresolvable byte order or a bad magic code).
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            ConvertError::Format(_)
                | ConvertError::IndeterminateByteOrder { .. }
                | ConvertError::BadMagic { .. }
        )
    }

    pub(crate) fn format<S: Into<String>>(reason: S) -> Self {
        ConvertError::Format(reason.into())
    }

    pub(crate) fn geometry<S: ToString>(format: &'static str, code: S) -> Self {
        ConvertError::UnsupportedGeometry {
            format,
            code: code.to_string(),
        }
    }
}

/// Alias type for results originating from this crate.
pub type Result<T> = ::std::result::Result<T, ConvertError>;
