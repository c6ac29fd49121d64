//! Interfaces and implementations specific to integration with `ndarray`.
//!
//! This module introduces the trait [`IntoNdArray`], which maps a converted
//! volume into a four dimensional [`Array`] of shape
//! `[frames, rows, columns, samples per pixel]` with an arbitrary numeric
//! element type. Each sample is cast with `as` semantics; the rescale
//! transformation of the encoding descriptor is not applied.
//!
//! The array is in standard (row major) memory order, which matches the
//! destination order of the voxel buffer, so no samples are moved.
//!
//! [`IntoNdArray`]: ./trait.IntoNdArray.html
//! [`Array`]: ../../../ndarray/type.Array.html
use super::VoxelBuffer;
use crate::convert::ConversionResult;
use crate::error::{ConvertError, Result};
use ::ndarray::{Array, Array4};
use num_traits::AsPrimitive;

/// Trait for converted volumes which can be mapped to an ndarray.
pub trait IntoNdArray {
    /// Consume the volume into an array with the target element type `T`.
    fn into_ndarray<T>(self) -> Result<Array4<T>>
    where
        T: 'static + Copy,
        u8: AsPrimitive<T>,
        i8: AsPrimitive<T>,
        u16: AsPrimitive<T>,
        i16: AsPrimitive<T>,
        f32: AsPrimitive<T>,
        f64: AsPrimitive<T>;
}

impl IntoNdArray for ConversionResult {
    fn into_ndarray<T>(self) -> Result<Array4<T>>
    where
        T: 'static + Copy,
        u8: AsPrimitive<T>,
        i8: AsPrimitive<T>,
        u16: AsPrimitive<T>,
        i16: AsPrimitive<T>,
        f32: AsPrimitive<T>,
        f64: AsPrimitive<T>,
    {
        let shape = [
            self.geometry.number_of_frames(),
            self.rows,
            self.columns,
            usize::from(self.encoding.samples_per_pixel),
        ];
        self.pixels.into_array(shape)
    }
}

impl ConversionResult {
    /// Copy the samples into an array of `[frames, rows, columns, spp]`.
    pub fn to_ndarray<T>(&self) -> Result<Array4<T>>
    where
        T: 'static + Copy,
        u8: AsPrimitive<T>,
        i8: AsPrimitive<T>,
        u16: AsPrimitive<T>,
        i16: AsPrimitive<T>,
        f32: AsPrimitive<T>,
        f64: AsPrimitive<T>,
    {
        self.clone().into_ndarray()
    }
}

impl VoxelBuffer {
    /// Shape the samples into an array of `[frames, rows, columns, spp]`.
    pub fn into_array<T>(self, shape: [usize; 4]) -> Result<Array4<T>>
    where
        T: 'static + Copy,
        u8: AsPrimitive<T>,
        i8: AsPrimitive<T>,
        u16: AsPrimitive<T>,
        i16: AsPrimitive<T>,
        f32: AsPrimitive<T>,
        f64: AsPrimitive<T>,
    {
        let expected: usize = shape.iter().product();
        if self.len() != expected {
            return Err(ConvertError::ShortRead {
                offset: 0,
                needed: expected,
                available: self.len(),
            });
        }
        let data: Vec<T> = match self {
            VoxelBuffer::U8(v) => cast(v),
            VoxelBuffer::I8(v) => cast(v),
            VoxelBuffer::U16(v) => cast(v),
            VoxelBuffer::I16(v) => cast(v),
            VoxelBuffer::F32(v) => cast(v),
            VoxelBuffer::F64(v) => cast(v),
        };
        Array::from_shape_vec(shape, data).map_err(|e| ConvertError::format(e.to_string()))
    }
}

fn cast<S, T>(v: Vec<S>) -> Vec<T>
where
    S: AsPrimitive<T>,
    T: 'static + Copy,
{
    v.into_iter().map(|x| x.as_()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shaped_array() {
        let buf = VoxelBuffer::I16((0..24).collect());
        let a = buf.into_array::<f32>([2, 3, 4, 1]).unwrap();
        assert_eq!(a.shape(), &[2, 3, 4, 1]);
        assert_eq!(a[[1, 2, 3, 0]], 23.);
        assert_eq!(a[[1, 0, 0, 0]], 12.);
    }

    #[test]
    fn shape_mismatch() {
        let buf = VoxelBuffer::U8(vec![0; 5]);
        assert!(buf.into_array::<u8>([1, 2, 3, 1]).is_err());
    }
}
