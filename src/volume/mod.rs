//! This module defines the voxel buffer API: the decoded samples of a
//! converted volume, their encoding descriptor, and the routines which
//! load them from raw bytes and bring them into destination frame order.
//!
//! An integration with `ndarray` allows for more convenient
//! post-processing. In order to use it, the `ndarray_volumes` feature
//! must be enabled (it is by default).

pub mod element;
pub mod layout;
pub mod reorder;
#[cfg(feature = "ndarray_volumes")]
pub mod ndarray;

pub use self::element::{RangeAccumulator, Sample, SampleFormat, ValueRange};
pub use self::layout::{AxisRole, DimensionLayout, FrameLayout, FrameOrder, LayoutAxis};

use crate::error::Result;
use byteordered::Endianness;
use num_traits::AsPrimitive;

/// The decoded samples of a volume, in destination order: column fastest,
/// then row, then frame. Multi-sample pixels keep their samples adjacent.
#[derive(Debug, Clone, PartialEq)]
pub enum VoxelBuffer {
    /// unsigned 8 bit samples
    U8(Vec<u8>),
    /// signed 8 bit samples
    I8(Vec<i8>),
    /// unsigned 16 bit samples
    U16(Vec<u16>),
    /// signed 16 bit samples
    I16(Vec<i16>),
    /// 32 bit float samples
    F32(Vec<f32>),
    /// 64 bit float samples
    F64(Vec<f64>),
}

macro_rules! with_samples {
    ($buffer:expr, $v:ident => $body:expr) => {
        match $buffer {
            VoxelBuffer::U8($v) => $body,
            VoxelBuffer::I8($v) => $body,
            VoxelBuffer::U16($v) => $body,
            VoxelBuffer::I16($v) => $body,
            VoxelBuffer::F32($v) => $body,
            VoxelBuffer::F64($v) => $body,
        }
    };
}

impl VoxelBuffer {
    /// Load `count` samples of the given format from `bytes`, starting at
    /// `offset`. Returns the buffer together with the value range of
    /// floating point samples.
    ///
    /// # Errors
    ///
    /// - `ConvertError::ShortRead` if the bytes end before `count` samples.
    pub fn load(
        bytes: &[u8],
        offset: usize,
        count: usize,
        format: SampleFormat,
        endianness: Endianness,
    ) -> Result<(VoxelBuffer, Option<ValueRange>)> {
        fn load_as<T: Sample>(
            bytes: &[u8],
            offset: usize,
            count: usize,
            e: Endianness,
        ) -> Result<(VoxelBuffer, Option<ValueRange>)> {
            let (samples, range) = element::read_samples::<T, _>(bytes, offset, count, e)?;
            Ok((T::into_buffer(samples), range))
        }

        match format {
            SampleFormat::U8 => load_as::<u8>(bytes, offset, count, endianness),
            SampleFormat::I8 => load_as::<i8>(bytes, offset, count, endianness),
            SampleFormat::U16 => load_as::<u16>(bytes, offset, count, endianness),
            SampleFormat::I16 => load_as::<i16>(bytes, offset, count, endianness),
            SampleFormat::F32 => load_as::<f32>(bytes, offset, count, endianness),
            SampleFormat::F64 => load_as::<f64>(bytes, offset, count, endianness),
        }
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        with_samples!(self, v => v.len())
    }

    /// Whether the buffer holds no samples.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The primitive format of the samples.
    pub fn sample_format(&self) -> SampleFormat {
        match self {
            VoxelBuffer::U8(_) => SampleFormat::U8,
            VoxelBuffer::I8(_) => SampleFormat::I8,
            VoxelBuffer::U16(_) => SampleFormat::U16,
            VoxelBuffer::I16(_) => SampleFormat::I16,
            VoxelBuffer::F32(_) => SampleFormat::F32,
            VoxelBuffer::F64(_) => SampleFormat::F64,
        }
    }

    /// View the samples as a slice of `T`, if that is the type held.
    pub fn as_slice<T: Sample>(&self) -> Option<&[T]> {
        T::view(self)
    }

    /// Fetch a single sample as a double precision value.
    pub fn get_f64(&self, index: usize) -> Option<f64> {
        with_samples!(self, v => v.get(index).map(|x| AsPrimitive::<f64>::as_(*x)))
    }

    /// Permute the samples from the source order described by `layout`
    /// into destination frame order under the given frame policy. Also
    /// returns the value range of floating point samples, computed in the
    /// same pass.
    pub fn reorder(
        &self,
        layout: &DimensionLayout,
        frames: &FrameLayout,
    ) -> Result<(VoxelBuffer, Option<ValueRange>)> {
        fn reorder_as<T: Sample>(
            samples: &[T],
            layout: &DimensionLayout,
            frames: &FrameLayout,
        ) -> Result<(VoxelBuffer, Option<ValueRange>)> {
            let mut acc = RangeAccumulator::default();
            let track = T::FORMAT.is_float();
            let out = reorder::reorder(samples, layout, frames, |v: T| {
                if track {
                    acc.push(v.as_())
                }
            })?;
            Ok((T::into_buffer(out), acc.finish()))
        }

        with_samples!(self, v => reorder_as(v, layout, frames))
    }
}

/// Photometric interpretation of the destination pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Photometric {
    /// Grayscale, minimum value is black
    Monochrome2,
    /// Three samples per pixel, red green blue
    Rgb,
}

impl Photometric {
    /// The conventional name of the interpretation.
    pub fn name(self) -> &'static str {
        match self {
            Photometric::Monochrome2 => "MONOCHROME2",
            Photometric::Rgb => "RGB",
        }
    }
}

/// A linear transformation from stored sample values to real world values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rescale {
    /// Multiplier
    pub slope: f64,
    /// Added after multiplication
    pub intercept: f64,
}

/// The encoding descriptor of a converted volume.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelEncoding {
    /// Bits allocated per sample
    pub bits_allocated: u16,
    /// Whether samples are signed
    pub signed: bool,
    /// Whether samples are floating point
    pub is_float: bool,
    /// Samples per pixel, 1 or 3
    pub samples_per_pixel: u16,
    /// Photometric interpretation
    pub photometric: Photometric,
    /// Stored value transformation, if any
    pub rescale: Option<Rescale>,
}

impl PixelEncoding {
    /// Describe samples of the given format.
    pub fn new(format: SampleFormat, samples_per_pixel: u16) -> Self {
        PixelEncoding {
            bits_allocated: format.bits(),
            signed: format.is_signed(),
            is_float: format.is_float(),
            samples_per_pixel,
            photometric: if samples_per_pixel == 3 {
                Photometric::Rgb
            } else {
                Photometric::Monochrome2
            },
            rescale: None,
        }
    }

    /// Attach a rescale transformation.
    pub fn with_rescale(mut self, rescale: Option<Rescale>) -> Self {
        self.rescale = rescale;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_and_inspect() {
        let bytes = [0u8, 1, 0, 2, 0, 3];
        let (buf, range) = VoxelBuffer::load(&bytes, 0, 3, SampleFormat::U16, Endianness::Big)
            .unwrap();
        assert_eq!(buf, VoxelBuffer::U16(vec![1, 2, 3]));
        assert_eq!(buf.len(), 3);
        assert_eq!(buf.sample_format(), SampleFormat::U16);
        assert_eq!(buf.as_slice::<u16>(), Some(&[1u16, 2, 3][..]));
        assert_eq!(buf.as_slice::<i16>(), None);
        assert_eq!(buf.get_f64(2), Some(3.));
        assert_eq!(buf.get_f64(3), None);
        assert_eq!(range, None);
    }

    #[test]
    fn encoding_descriptor() {
        let e = PixelEncoding::new(SampleFormat::I16, 1);
        assert_eq!(e.bits_allocated, 16);
        assert!(e.signed);
        assert_eq!(e.photometric, Photometric::Monochrome2);
        let e = PixelEncoding::new(SampleFormat::U8, 3).with_rescale(Some(Rescale {
            slope: 2.,
            intercept: 0.,
        }));
        assert_eq!(e.photometric.name(), "RGB");
        assert!(!e.signed);
        assert_eq!(e.rescale.map(|r| r.slope), Some(2.));
    }
}
