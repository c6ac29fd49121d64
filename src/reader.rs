//! Endian-aware scalar reads over an in-memory header.
//!
//! The binary formats (Analyze 7.5 and NIfTI-1) store their headers with a
//! byte order which is never declared explicitly. [`resolve_byte_order`]
//! derives it from the `sizeof_hdr` field, and [`HeaderReader`] then walks
//! the header with that byte order.
//!
//! [`resolve_byte_order`]: ./fn.resolve_byte_order.html
//! [`HeaderReader`]: ./struct.HeaderReader.html
use crate::error::{ConvertError, Result};
use byteordered::{Endian, Endianness};

/// A cursor over a byte slice which reads primitive values in a
/// run-time byte order.
#[derive(Debug, Clone)]
pub struct HeaderReader<'a> {
    bytes: &'a [u8],
    pos: usize,
    mark: usize,
    endianness: Endianness,
}

impl<'a> HeaderReader<'a> {
    /// Create a reader at the start of `bytes`.
    pub fn new(bytes: &'a [u8], endianness: Endianness) -> Self {
        HeaderReader {
            bytes,
            pos: 0,
            mark: 0,
            endianness,
        }
    }

    /// The byte order used for multi-byte reads.
    pub fn endianness(&self) -> Endianness {
        self.endianness
    }

    /// Change the byte order of subsequent reads.
    pub fn set_endianness(&mut self, endianness: Endianness) {
        self.endianness = endianness;
    }

    /// Current offset from the start of the source.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Number of bytes left to read.
    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    /// Remember the current position.
    pub fn mark(&mut self) {
        self.mark = self.pos;
    }

    /// Go back to the last marked position (the start if never marked).
    pub fn rewind(&mut self) {
        self.pos = self.mark;
    }

    /// Read exactly `n` bytes.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.remaining() < n {
            return Err(ConvertError::ShortRead {
                offset: self.pos,
                needed: n,
                available: self.remaining(),
            });
        }
        let out = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    /// Read a fixed-size byte array, such as a text field.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    /// Skip `n` bytes.
    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.read_bytes(n).map(|_| ())
    }

    /// Read a single byte.
    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    /// Read a 16-bit unsigned integer.
    pub fn read_u16(&mut self) -> Result<u16> {
        let e = self.endianness;
        e.read_u16(self.read_bytes(2)?).map_err(From::from)
    }

    /// Read a 16-bit signed integer.
    pub fn read_i16(&mut self) -> Result<i16> {
        let e = self.endianness;
        e.read_i16(self.read_bytes(2)?).map_err(From::from)
    }

    /// Read a 32-bit unsigned integer.
    pub fn read_u32(&mut self) -> Result<u32> {
        let e = self.endianness;
        e.read_u32(self.read_bytes(4)?).map_err(From::from)
    }

    /// Read a 32-bit signed integer.
    pub fn read_i32(&mut self) -> Result<i32> {
        let e = self.endianness;
        e.read_i32(self.read_bytes(4)?).map_err(From::from)
    }

    /// Read a single precision float.
    pub fn read_f32(&mut self) -> Result<f32> {
        let e = self.endianness;
        e.read_f32(self.read_bytes(4)?).map_err(From::from)
    }

    /// Read a double precision float.
    pub fn read_f64(&mut self) -> Result<f64> {
        let e = self.endianness;
        e.read_f64(self.read_bytes(8)?).map_err(From::from)
    }

    /// Fill a slice of 16-bit signed integers.
    pub fn read_i16_into(&mut self, out: &mut [i16]) -> Result<()> {
        for v in out {
            *v = self.read_i16()?;
        }
        Ok(())
    }

    /// Fill a slice of single precision floats.
    pub fn read_f32_into(&mut self, out: &mut [f32]) -> Result<()> {
        for v in out {
            *v = self.read_f32()?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Probe {
    Unresolved,
    TryLittle,
    TryBig { little: u32 },
    Confirmed(Endianness),
    Failed { little: u32, big: u32 },
}

/// Derive the byte order of a binary header from its leading 32-bit
/// header size field, which must read as `header_len`.
///
/// Little endian is tried first. Should neither byte order yield the
/// expected length, the header is rejected as having an indeterminate
/// byte order.
pub fn resolve_byte_order(bytes: &[u8], header_len: u32) -> Result<Endianness> {
    let mut reader = HeaderReader::new(bytes, Endianness::Little);
    let mut state = Probe::Unresolved;
    loop {
        state = match state {
            Probe::Unresolved => {
                reader.mark();
                Probe::TryLittle
            }
            Probe::TryLittle => {
                let little = reader.read_u32()?;
                if little == header_len {
                    Probe::Confirmed(Endianness::Little)
                } else {
                    Probe::TryBig { little }
                }
            }
            Probe::TryBig { little } => {
                reader.rewind();
                reader.set_endianness(Endianness::Big);
                let big = reader.read_u32()?;
                if big == header_len {
                    Probe::Confirmed(Endianness::Big)
                } else {
                    Probe::Failed { little, big }
                }
            }
            Probe::Confirmed(e) => {
                log::debug!("header byte order resolved as {:?}", e);
                return Ok(e);
            }
            Probe::Failed { little, big } => {
                return Err(ConvertError::IndeterminateByteOrder { little, big })
            }
        };
    }
}
