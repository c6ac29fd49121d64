//! Axis layouts of source voxel data and the destination frame policy.
//!
//! A [`DimensionLayout`] lists the axes of a source volume from the fastest
//! to the slowest varying one, each with a role. The destination always has
//! color samples innermost, then columns, then rows, then frames. How the
//! slice, scalar and volume axes are folded into a single frame index is
//! decided by a [`FrameOrder`], captured together with the extents in a
//! [`FrameLayout`]. Geometry and pixel permutation both consult the same
//! `FrameLayout`, so the position of a frame always matches its pixels.
//!
//! [`DimensionLayout`]: ./struct.DimensionLayout.html
//! [`FrameOrder`]: ./enum.FrameOrder.html
//! [`FrameLayout`]: ./struct.FrameLayout.html
use crate::error::{ConvertError, Result};
use crate::util::checked_product;

/// The role of a source axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AxisRole {
    /// Moves along a row, one column at a time
    Column,
    /// Moves along a column, one row at a time
    Row,
    /// Moves from one slice to the next
    Slice,
    /// Per-voxel scalar components, each becoming a separate frame
    Scalar,
    /// Repetitions of the whole volume
    Volume,
    /// Color samples of a pixel, kept interleaved
    Color,
}

/// One axis of a source layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutAxis {
    /// What the axis means
    pub role: AxisRole,
    /// Number of positions along the axis
    pub extent: usize,
}

impl LayoutAxis {
    /// Shorthand constructor.
    pub fn new(role: AxisRole, extent: usize) -> Self {
        LayoutAxis { role, extent }
    }
}

/// The ordered axes of a source volume, fastest varying first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimensionLayout {
    axes: Vec<LayoutAxis>,
}

impl DimensionLayout {
    /// Validate and build a layout. Columns and rows must appear exactly
    /// once, slices and color at most once, and a color axis must be the
    /// fastest varying one. Extents must be positive and their product
    /// must fit in `usize`.
    pub fn new(axes: Vec<LayoutAxis>) -> Result<Self> {
        let count = |role: AxisRole| axes.iter().filter(|a| a.role == role).count();
        for &(role, min) in &[
            (AxisRole::Column, 1),
            (AxisRole::Row, 1),
            (AxisRole::Slice, 0),
            (AxisRole::Color, 0),
        ] {
            let n = count(role);
            if n < min || n > 1 {
                return Err(ConvertError::format(format!(
                    "dimension layout needs {} {:?} axis, found {}",
                    if min == 1 { "exactly one" } else { "at most one" },
                    role,
                    n
                )));
            }
        }
        if let Some(i) = axes.iter().position(|a| a.role == AxisRole::Color) {
            if i != 0 {
                return Err(ConvertError::format(format!(
                    "color axis must vary fastest, found at axis {}",
                    i
                )));
            }
        }
        if let Some(i) = axes.iter().position(|a| a.extent == 0) {
            return Err(ConvertError::format(format!("axis {} has zero extent", i)));
        }
        checked_product("layout", axes.iter().map(|a| a.extent))?;
        Ok(DimensionLayout { axes })
    }

    /// The layout of a single-volume source, already in destination order:
    /// samples, columns, rows, slices, then volumes.
    pub fn contiguous(
        samples_per_pixel: usize,
        columns: usize,
        rows: usize,
        slices: usize,
        volumes: usize,
    ) -> Self {
        let mut axes = Vec::with_capacity(5);
        if samples_per_pixel > 1 {
            axes.push(LayoutAxis::new(AxisRole::Color, samples_per_pixel));
        }
        axes.push(LayoutAxis::new(AxisRole::Column, columns));
        axes.push(LayoutAxis::new(AxisRole::Row, rows));
        axes.push(LayoutAxis::new(AxisRole::Slice, slices));
        axes.push(LayoutAxis::new(AxisRole::Volume, volumes));
        DimensionLayout { axes }
    }

    /// The axes, fastest varying first.
    pub fn axes(&self) -> &[LayoutAxis] {
        &self.axes
    }

    /// Combined extent of all axes with the given role, 1 if there is none.
    pub fn extent(&self, role: AxisRole) -> usize {
        self.axes
            .iter()
            .filter(|a| a.role == role)
            .map(|a| a.extent)
            .product()
    }

    /// Number of columns per frame.
    pub fn columns(&self) -> usize {
        self.extent(AxisRole::Column)
    }

    /// Number of rows per frame.
    pub fn rows(&self) -> usize {
        self.extent(AxisRole::Row)
    }

    /// Number of samples per pixel.
    pub fn samples_per_pixel(&self) -> usize {
        self.extent(AxisRole::Color)
    }

    /// Total number of samples.
    pub fn element_count(&self) -> usize {
        self.axes.iter().map(|a| a.extent).product()
    }

    /// Fold the frame axes under the given policy.
    pub fn frame_layout(&self, order: FrameOrder) -> FrameLayout {
        FrameLayout {
            slices: self.extent(AxisRole::Slice),
            scalars: self.extent(AxisRole::Scalar),
            volumes: self.extent(AxisRole::Volume),
            order,
        }
    }

    /// Strides of each axis in the source, in samples.
    pub fn source_strides(&self) -> Vec<usize> {
        let mut stride = 1;
        self.axes
            .iter()
            .map(|a| {
                let s = stride;
                stride *= a.extent;
                s
            })
            .collect()
    }

    /// Strides of each axis in the destination, in samples. Several axes
    /// of the same role nest in source order.
    pub fn destination_strides(&self, frames: &FrameLayout) -> Vec<usize> {
        let spp = self.samples_per_pixel();
        let frame_size = spp * self.columns() * self.rows();
        let mut nested = [1usize; 6];
        self.axes
            .iter()
            .map(|a| {
                let (base, slot) = match a.role {
                    AxisRole::Color => (1, 0),
                    AxisRole::Column => (spp, 1),
                    AxisRole::Row => (spp * self.columns(), 2),
                    AxisRole::Slice => (frame_size * frames.slice_stride(), 3),
                    AxisRole::Scalar => (frame_size * frames.scalar_stride(), 4),
                    AxisRole::Volume => (frame_size * frames.volume_stride(), 5),
                };
                let s = base * nested[slot];
                nested[slot] *= a.extent;
                s
            })
            .collect()
    }

    /// Whether the source order already is the destination order.
    pub fn is_destination_order(&self, frames: &FrameLayout) -> bool {
        self.source_strides() == self.destination_strides(frames)
    }
}

/// How slices, per-voxel scalars and volume repetitions are folded into
/// destination frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameOrder {
    /// All slices of a scalar component before the next component:
    /// `frame = (volume * scalars + scalar) * slices + slice`
    ScalarMajor,
    /// All scalar components of a slice before the next slice:
    /// `frame = (volume * slices + slice) * scalars + scalar`
    SliceMajor,
}

impl Default for FrameOrder {
    fn default() -> Self {
        FrameOrder::ScalarMajor
    }
}

/// The extents of the frame axes together with the folding policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameLayout {
    /// Slices per volume
    pub slices: usize,
    /// Scalar components per voxel
    pub scalars: usize,
    /// Volume repetitions
    pub volumes: usize,
    /// Folding policy
    pub order: FrameOrder,
}

impl FrameLayout {
    /// Frames of a source without scalar components.
    pub fn simple(slices: usize, volumes: usize) -> Self {
        FrameLayout {
            slices,
            scalars: 1,
            volumes,
            order: FrameOrder::default(),
        }
    }

    /// Total number of destination frames.
    pub fn frame_count(&self) -> usize {
        self.slices * self.scalars * self.volumes
    }

    /// Total number of destination frames, failing if it overflows.
    pub fn checked_frame_count(&self) -> Result<usize> {
        let extents = [self.slices, self.scalars, self.volumes];
        checked_product("frame", extents.iter().cloned())
    }

    /// Destination frame of the given volume, scalar and slice indices.
    pub fn frame_index(&self, volume: usize, scalar: usize, slice: usize) -> usize {
        volume * self.volume_stride() + scalar * self.scalar_stride() + slice * self.slice_stride()
    }

    /// The slice index within its volume of a destination frame.
    pub fn slice_of(&self, frame: usize) -> usize {
        (frame / self.slice_stride()) % self.slices
    }

    /// The scalar component of a destination frame.
    pub fn scalar_of(&self, frame: usize) -> usize {
        (frame / self.scalar_stride()) % self.scalars
    }

    /// The volume of a destination frame.
    pub fn volume_of(&self, frame: usize) -> usize {
        frame / self.volume_stride()
    }

    fn slice_stride(&self) -> usize {
        match self.order {
            FrameOrder::ScalarMajor => 1,
            FrameOrder::SliceMajor => self.scalars,
        }
    }

    fn scalar_stride(&self) -> usize {
        match self.order {
            FrameOrder::ScalarMajor => self.slices,
            FrameOrder::SliceMajor => 1,
        }
    }

    fn volume_stride(&self) -> usize {
        self.slices * self.scalars
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nrrd_like() -> DimensionLayout {
        DimensionLayout::new(vec![
            LayoutAxis::new(AxisRole::Scalar, 2),
            LayoutAxis::new(AxisRole::Column, 4),
            LayoutAxis::new(AxisRole::Row, 3),
            LayoutAxis::new(AxisRole::Slice, 5),
        ])
        .unwrap()
    }

    #[test]
    fn frame_indices() {
        let f = nrrd_like().frame_layout(FrameOrder::ScalarMajor);
        assert_eq!(f.frame_count(), 10);
        assert_eq!(f.frame_index(0, 1, 3), 8);
        assert_eq!(f.slice_of(8), 3);
        assert_eq!(f.scalar_of(8), 1);

        let f = nrrd_like().frame_layout(FrameOrder::SliceMajor);
        assert_eq!(f.frame_index(0, 1, 3), 7);
        assert_eq!(f.slice_of(7), 3);
        assert_eq!(f.scalar_of(7), 1);
        assert_eq!(f.volume_of(7), 0);
    }

    #[test]
    fn frame_indices_with_volumes() {
        let f = FrameLayout {
            slices: 3,
            scalars: 2,
            volumes: 2,
            order: FrameOrder::SliceMajor,
        };
        for frame in 0..f.frame_count() {
            let (v, c, s) = (f.volume_of(frame), f.scalar_of(frame), f.slice_of(frame));
            assert_eq!(f.frame_index(v, c, s), frame);
        }
    }

    #[test]
    fn frame_count_overflow() {
        let f = FrameLayout {
            slices: usize::MAX / 2,
            scalars: 3,
            volumes: 1,
            order: FrameOrder::ScalarMajor,
        };
        assert!(f.checked_frame_count().unwrap_err().is_format_error());
        assert_eq!(FrameLayout::simple(4, 2).checked_frame_count().unwrap(), 8);
    }

    #[test]
    fn strides() {
        let layout = nrrd_like();
        assert_eq!(layout.source_strides(), vec![1, 2, 8, 24]);
        let f = layout.frame_layout(FrameOrder::ScalarMajor);
        assert_eq!(layout.destination_strides(&f), vec![60, 1, 4, 12]);
        assert!(!layout.is_destination_order(&f));

        let contiguous = DimensionLayout::contiguous(3, 4, 2, 2, 1);
        let f = contiguous.frame_layout(FrameOrder::SliceMajor);
        assert!(contiguous.is_destination_order(&f));
        assert_eq!(contiguous.samples_per_pixel(), 3);
        assert_eq!(contiguous.element_count(), 48);
    }

    #[test]
    fn invalid_layouts() {
        assert!(DimensionLayout::new(vec![LayoutAxis::new(AxisRole::Column, 2)]).is_err());
        assert!(DimensionLayout::new(vec![
            LayoutAxis::new(AxisRole::Column, usize::MAX),
            LayoutAxis::new(AxisRole::Row, 2),
        ])
        .unwrap_err()
        .is_format_error());
        assert!(DimensionLayout::new(vec![
            LayoutAxis::new(AxisRole::Column, 2),
            LayoutAxis::new(AxisRole::Row, 2),
            LayoutAxis::new(AxisRole::Slice, 2),
            LayoutAxis::new(AxisRole::Slice, 2),
        ])
        .is_err());
        assert!(DimensionLayout::new(vec![
            LayoutAxis::new(AxisRole::Column, 2),
            LayoutAxis::new(AxisRole::Color, 3),
            LayoutAxis::new(AxisRole::Row, 2),
        ])
        .is_err());
        assert!(DimensionLayout::new(vec![
            LayoutAxis::new(AxisRole::Column, 2),
            LayoutAxis::new(AxisRole::Row, 0),
        ])
        .is_err());
    }
}
