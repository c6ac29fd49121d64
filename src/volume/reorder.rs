//! Permutation of voxel samples from source axis order to destination
//! frame order.
use super::layout::{DimensionLayout, FrameLayout};
use crate::error::{ConvertError, Result};

/// Copy `source`, laid out as described by `layout`, into a new vector in
/// destination order. Every sample is passed to `inspect` exactly once, in
/// source order.
///
/// The source is walked sequentially with an odometer over the layout's
/// axes while the destination offset is updated incrementally from the
/// per-axis destination strides, so the whole permutation takes a single
/// pass regardless of how the axes are arranged.
///
/// # Errors
///
/// - `ConvertError::ShortRead` if `source` does not hold exactly as many
/// samples as the layout describes.
pub fn reorder<T, F>(
    source: &[T],
    layout: &DimensionLayout,
    frames: &FrameLayout,
    mut inspect: F,
) -> Result<Vec<T>>
where
    T: Copy + Default,
    F: FnMut(T),
{
    let n = layout.element_count();
    if source.len() != n {
        return Err(ConvertError::ShortRead {
            offset: 0,
            needed: n,
            available: source.len(),
        });
    }

    let extents: Vec<usize> = layout.axes().iter().map(|a| a.extent).collect();
    let strides = layout.destination_strides(frames);
    let mut coords = vec![0usize; extents.len()];
    let mut out = vec![T::default(); n];
    let mut dest = 0;

    for &v in source {
        out[dest] = v;
        inspect(v);

        // advance the odometer
        for k in 0..extents.len() {
            coords[k] += 1;
            dest += strides[k];
            if coords[k] < extents[k] {
                break;
            }
            dest -= strides[k] * extents[k];
            coords[k] = 0;
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::volume::layout::{AxisRole, FrameOrder, LayoutAxis};
    use pretty_assertions::assert_eq;

    fn layout(axes: &[(AxisRole, usize)]) -> DimensionLayout {
        DimensionLayout::new(
            axes.iter()
                .map(|&(role, extent)| LayoutAxis::new(role, extent))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn identity_when_contiguous() {
        let l = DimensionLayout::contiguous(1, 3, 2, 2, 1);
        let f = l.frame_layout(FrameOrder::ScalarMajor);
        let src: Vec<u16> = (0..12).collect();
        let out = reorder(&src, &l, &f, |_| {}).unwrap();
        assert_eq!(out, src);
    }

    #[test]
    fn scalars_deinterleaved() {
        // two scalars per voxel, 2 columns, 1 row, 2 slices
        let l = layout(&[
            (AxisRole::Scalar, 2),
            (AxisRole::Column, 2),
            (AxisRole::Row, 1),
            (AxisRole::Slice, 2),
        ]);
        // value = slice * 100 + column * 10 + scalar
        let src = vec![0, 1, 10, 11, 100, 101, 110, 111];

        let f = l.frame_layout(FrameOrder::ScalarMajor);
        let out = reorder(&src, &l, &f, |_| {}).unwrap();
        assert_eq!(out, vec![0, 10, 100, 110, 1, 11, 101, 111]);

        let f = l.frame_layout(FrameOrder::SliceMajor);
        let out = reorder(&src, &l, &f, |_| {}).unwrap();
        assert_eq!(out, vec![0, 10, 1, 11, 100, 110, 101, 111]);
    }

    #[test]
    fn permutation_is_bijective() {
        let l = layout(&[
            (AxisRole::Scalar, 3),
            (AxisRole::Column, 4),
            (AxisRole::Row, 5),
            (AxisRole::Slice, 2),
            (AxisRole::Volume, 3),
        ]);
        for &order in &[FrameOrder::ScalarMajor, FrameOrder::SliceMajor] {
            let f = l.frame_layout(order);
            let src: Vec<usize> = (0..l.element_count()).collect();
            let mut seen = 0;
            let out = reorder(&src, &l, &f, |_| seen += 1).unwrap();
            assert_eq!(seen, src.len());
            assert_eq!(out.len(), src.len());
            let mut sorted = out.clone();
            sorted.sort_unstable();
            assert_eq!(sorted, src);
        }
    }

    #[test]
    fn wrong_length() {
        let l = DimensionLayout::contiguous(1, 3, 2, 2, 1);
        let f = l.frame_layout(FrameOrder::ScalarMajor);
        assert!(reorder(&[0u8; 11], &l, &f, |_| {}).is_err());
    }
}
