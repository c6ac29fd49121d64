//! This module defines the sample element API, which lets the loader,
//! the reorganizer and the value range computation work over all the
//! primitive sample types with a single generic implementation.
use super::VoxelBuffer;
use crate::error::{ConvertError, Result};
use byteordered::{ByteOrdered, Endian};
use num_traits::AsPrimitive;
use std::fmt::Debug;
use std::io::Read;

/// The primitive representation of a single sample in a voxel buffer.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum SampleFormat {
    /// unsigned 8 bit integer
    U8,
    /// signed 8 bit integer
    I8,
    /// unsigned 16 bit integer
    U16,
    /// signed 16 bit integer
    I16,
    /// 32 bit float
    F32,
    /// 64 bit float
    F64,
}

impl SampleFormat {
    /// Size of a sample in bytes.
    pub fn size_of(self) -> usize {
        match self {
            SampleFormat::U8 | SampleFormat::I8 => 1,
            SampleFormat::U16 | SampleFormat::I16 => 2,
            SampleFormat::F32 => 4,
            SampleFormat::F64 => 8,
        }
    }

    /// Number of bits allocated per sample.
    pub fn bits(self) -> u16 {
        self.size_of() as u16 * 8
    }

    /// Whether samples are signed.
    pub fn is_signed(self) -> bool {
        !matches!(self, SampleFormat::U8 | SampleFormat::U16)
    }

    /// Whether samples are floating point numbers.
    pub fn is_float(self) -> bool {
        matches!(self, SampleFormat::F32 | SampleFormat::F64)
    }
}

/// Minimum and maximum of the samples of a floating point buffer,
/// ignoring NaN.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct ValueRange {
    /// Smallest sample
    pub min: f64,
    /// Largest sample
    pub max: f64,
}

/// Incremental computation of a `ValueRange`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RangeAccumulator {
    range: Option<ValueRange>,
}

impl RangeAccumulator {
    /// Account for one more value.
    #[inline]
    pub fn push(&mut self, v: f64) {
        if v.is_nan() {
            return;
        }
        self.range = Some(match self.range {
            None => ValueRange { min: v, max: v },
            Some(r) => ValueRange {
                min: r.min.min(v),
                max: r.max.max(v),
            },
        });
    }

    /// The range of all values seen, `None` if there were none.
    pub fn finish(self) -> Option<ValueRange> {
        self.range
    }
}

/// Trait type for characterizing a sample element, implemented for the
/// primitive numeric types which a `VoxelBuffer` can hold.
pub trait Sample: 'static + Sized + Copy + Default + Debug + PartialOrd + AsPrimitive<f64> {
    /// The sample format mapped to the type
    const FORMAT: SampleFormat;

    /// Read a single element from the given byte source.
    fn from_raw<R, E>(src: R, endianness: E) -> Result<Self>
    where
        R: Read,
        E: Endian;

    /// Decode a byte slice holding exactly `n` elements.
    fn from_raw_slice<E>(bytes: &[u8], n: usize, endianness: E) -> Result<Vec<Self>>
    where
        E: Endian + Copy,
    {
        let mut cursor = bytes;
        (0..n)
            .map(|_| Self::from_raw(&mut cursor, endianness))
            .collect()
    }

    /// Wrap a vector of elements into a buffer.
    fn into_buffer(samples: Vec<Self>) -> VoxelBuffer;

    /// View the elements of a buffer, if it holds this type.
    fn view(buffer: &VoxelBuffer) -> Option<&[Self]>;
}

macro_rules! impl_sample {
    ($t:ty, $format:ident, $read:ident) => {
        impl Sample for $t {
            const FORMAT: SampleFormat = SampleFormat::$format;
            fn from_raw<R, E>(src: R, e: E) -> Result<Self>
            where
                R: Read,
                E: Endian,
            {
                e.$read(src).map_err(From::from)
            }
            fn into_buffer(samples: Vec<Self>) -> VoxelBuffer {
                VoxelBuffer::$format(samples)
            }
            fn view(buffer: &VoxelBuffer) -> Option<&[Self]> {
                match buffer {
                    VoxelBuffer::$format(v) => Some(v.as_slice()),
                    _ => None,
                }
            }
        }
    };
}

impl Sample for u8 {
    const FORMAT: SampleFormat = SampleFormat::U8;
    fn from_raw<R, E>(src: R, _: E) -> Result<Self>
    where
        R: Read,
        E: Endian,
    {
        ByteOrdered::native(src).read_u8().map_err(From::from)
    }
    fn from_raw_slice<E>(bytes: &[u8], n: usize, _: E) -> Result<Vec<Self>>
    where
        E: Endian + Copy,
    {
        Ok(bytes[..n].to_vec())
    }
    fn into_buffer(samples: Vec<Self>) -> VoxelBuffer {
        VoxelBuffer::U8(samples)
    }
    fn view(buffer: &VoxelBuffer) -> Option<&[Self]> {
        match buffer {
            VoxelBuffer::U8(v) => Some(v.as_slice()),
            _ => None,
        }
    }
}

impl Sample for i8 {
    const FORMAT: SampleFormat = SampleFormat::I8;
    fn from_raw<R, E>(src: R, _: E) -> Result<Self>
    where
        R: Read,
        E: Endian,
    {
        ByteOrdered::native(src).read_i8().map_err(From::from)
    }
    fn into_buffer(samples: Vec<Self>) -> VoxelBuffer {
        VoxelBuffer::I8(samples)
    }
    fn view(buffer: &VoxelBuffer) -> Option<&[Self]> {
        match buffer {
            VoxelBuffer::I8(v) => Some(v.as_slice()),
            _ => None,
        }
    }
}

impl_sample!(u16, U16, read_u16);
impl_sample!(i16, I16, read_i16);
impl_sample!(f32, F32, read_f32);
impl_sample!(f64, F64, read_f64);

/// Decode `count` samples of type `T` starting at `offset`, computing the
/// value range of floating point samples on the way.
///
/// # Errors
///
/// - `ConvertError::ShortRead` if fewer than `count` samples are available.
/// - `ConvertError::Format` if `count` samples cannot be addressed.
pub fn read_samples<T, E>(
    bytes: &[u8],
    offset: usize,
    count: usize,
    endianness: E,
) -> Result<(Vec<T>, Option<ValueRange>)>
where
    T: Sample,
    E: Endian + Copy,
{
    let needed = count.checked_mul(T::FORMAT.size_of()).ok_or_else(|| {
        ConvertError::format(format!(
            "{} samples of {:?} exceed the addressable size",
            count,
            T::FORMAT
        ))
    })?;
    let available = bytes.len().saturating_sub(offset);
    if available < needed {
        return Err(ConvertError::ShortRead {
            offset,
            needed,
            available,
        });
    }
    let samples = T::from_raw_slice(&bytes[offset..offset + needed], count, endianness)?;
    let range = if T::FORMAT.is_float() {
        let mut acc = RangeAccumulator::default();
        for v in &samples {
            acc.push(v.as_());
        }
        acc.finish()
    } else {
        None
    };
    Ok((samples, range))
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteordered::Endianness;

    #[test]
    fn formats() {
        assert_eq!(SampleFormat::I16.bits(), 16);
        assert!(SampleFormat::I8.is_signed());
        assert!(!SampleFormat::U16.is_signed());
        assert!(SampleFormat::F64.is_float());
        assert_eq!(<f32 as Sample>::FORMAT, SampleFormat::F32);
    }

    #[test]
    fn read_big_endian_shorts() {
        let bytes = [0xff, 0x00, 0x01, 0x00, 0xff, 0xfe, 0x99];
        let (v, range) = read_samples::<i16, _>(&bytes, 1, 3, Endianness::Big).unwrap();
        assert_eq!(v, vec![1, 255, -2]);
        assert_eq!(range, None);
    }

    #[test]
    fn read_floats_with_range() {
        let mut bytes = Vec::new();
        for v in &[2.5f32, -1., f32::NAN, 7.] {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
        let (v, range) = read_samples::<f32, _>(&bytes, 0, 4, Endianness::Little).unwrap();
        assert_eq!(v.len(), 4);
        assert_eq!(range, Some(ValueRange { min: -1., max: 7. }));
    }

    #[test]
    fn short_read() {
        let bytes = [0u8; 7];
        match read_samples::<u16, _>(&bytes, 2, 3, Endianness::Little) {
            Err(ConvertError::ShortRead {
                offset: 2,
                needed: 6,
                available: 5,
            }) => {}
            other => panic!("unexpected result {:?}", other),
        }
        let (v, _) = read_samples::<u8, _>(&bytes, 2, 5, Endianness::Little).unwrap();
        assert_eq!(v.len(), 5);

        let e = read_samples::<f64, _>(&bytes, 0, usize::MAX / 4, Endianness::Little).unwrap_err();
        assert!(e.is_format_error());
    }
}
