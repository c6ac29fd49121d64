//! Geometry and axis layout of NRRD volumes.
//!
//! NRRD describes each axis independently: a direction vector for spatial
//! axes (its length being the sample spacing), or `none` for the others.
//! Non-spatial axes before the spatial ones hold per-voxel scalar
//! components, those after them repeat the whole volume. World
//! coordinates are expressed in the declared space, which is mapped onto
//! LPS+ with a sign vector.
use super::{checked_spacing, unit, ConversionWarning, VoxelGeometry, Warnings};
use crate::affine::flip;
use crate::error::{ConvertError, Result};
use crate::header::NrrdHeader;
use crate::volume::{AxisRole, DimensionLayout, FrameOrder, LayoutAxis};
use nalgebra::Vector3;

/// Families of NRRD world spaces, by the sign change into LPS+.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpaceFamily {
    /// right-anterior-superior, with or without time
    Ras,
    /// left-anterior-superior, with or without time
    Las,
    /// left-posterior-superior and scanner-xyz, with or without time
    Lps,
}

impl SpaceFamily {
    /// Classify a `space` field value.
    pub fn from_name(name: &str) -> Option<SpaceFamily> {
        match name.trim().to_lowercase().as_str() {
            "right-anterior-superior" | "ras" | "right-anterior-superior-time" | "rast" => {
                Some(SpaceFamily::Ras)
            }
            "left-anterior-superior" | "las" | "left-anterior-superior-time" | "last" => {
                Some(SpaceFamily::Las)
            }
            "left-posterior-superior" | "lps" | "left-posterior-superior-time" | "lpst"
            | "scanner-xyz" | "scanner-xyz-time" => Some(SpaceFamily::Lps),
            _ => None,
        }
    }

    /// Component-wise sign change into LPS+.
    pub fn signs(self) -> [f64; 3] {
        match self {
            SpaceFamily::Ras => [-1., -1., 1.],
            SpaceFamily::Las => [1., -1., 1.],
            SpaceFamily::Lps => [1., 1., 1.],
        }
    }
}

fn is_color_kind(kind: &str) -> bool {
    let kind = kind.to_lowercase();
    kind == "rgb-color" || kind == "3-color"
}

fn is_spatial_kind(kind: &str) -> bool {
    let kind = kind.to_lowercase();
    kind == "domain" || kind == "space"
}

/// Assign a role to every axis of a NRRD.
///
/// Axes are spatial when they have a direction vector. Without space
/// directions, the `kinds` field decides, and without that, the first
/// three axes are taken as spatial. Color axes are recognized by kind.
///
/// # Errors
///
/// - `ConvertError::UnsupportedGeometry` if there are fewer than two or
/// more than three spatial axes, or a non-spatial axis lies between
/// spatial ones.
pub fn layout(header: &NrrdHeader) -> Result<DimensionLayout> {
    let n = header.dimension;
    let kind = |i: usize| {
        header
            .kinds
            .as_ref()
            .and_then(|k| k.get(i))
            .map(String::as_str)
    };
    let spatial: Vec<bool> = match (&header.space_directions, &header.kinds) {
        (Some(directions), _) => directions.iter().map(Option::is_some).collect(),
        (None, Some(_)) => (0..n).map(|i| kind(i).map_or(false, is_spatial_kind)).collect(),
        (None, None) => (0..n).map(|i| i < 3).collect(),
    };

    let first = spatial.iter().position(|&s| s);
    let last = spatial.iter().rposition(|&s| s);
    let (first, last) = match (first, last) {
        (Some(f), Some(l)) => (f, l),
        _ => return Err(ConvertError::geometry("NRRD", "no spatial axes")),
    };
    let spatial_count = spatial.iter().filter(|&&s| s).count();
    if spatial_count != last - first + 1 {
        return Err(ConvertError::geometry(
            "NRRD",
            format!("non-spatial axis between spatial axes {} and {}", first, last),
        ));
    }
    if !(2..=3).contains(&spatial_count) {
        return Err(ConvertError::geometry(
            "NRRD",
            format!("{} spatial axes", spatial_count),
        ));
    }

    let spatial_roles = [AxisRole::Column, AxisRole::Row, AxisRole::Slice];
    let axes = header
        .sizes
        .iter()
        .enumerate()
        .map(|(i, &extent)| {
            let role = if spatial[i] {
                spatial_roles[i - first]
            } else if kind(i).map_or(false, is_color_kind) && extent == 3 {
                AxisRole::Color
            } else if i < first {
                AxisRole::Scalar
            } else {
                AxisRole::Volume
            };
            LayoutAxis::new(role, extent)
        })
        .collect();
    DimensionLayout::new(axes)
}

/// Index of the axis with the given role.
fn axis_of(layout: &DimensionLayout, role: AxisRole) -> Option<usize> {
    layout.axes().iter().position(|a| a.role == role)
}

/// Derive the geometry of a NRRD volume with the given layout, folding
/// scalar and volume axes into frames under `order`.
///
/// # Errors
///
/// - `ConvertError::UnsupportedGeometry` if a direction vector is not three
/// dimensional or has zero length.
/// - `ConvertError::Format` if the space origin is not three dimensional.
pub fn derive(
    header: &NrrdHeader,
    layout: &DimensionLayout,
    order: FrameOrder,
    warnings: &mut Warnings,
) -> Result<VoxelGeometry> {
    let signs = match header.space.as_deref().and_then(SpaceFamily::from_name) {
        Some(family) => family.signs(),
        None => {
            warnings.push(ConversionWarning::UnrecognizedSpace(header.space.clone()));
            [1., 1., 1.]
        }
    };

    let origin = match &header.space_origin {
        Some(o) if o.len() == 3 => flip(&Vector3::new(o[0], o[1], o[2]), signs),
        Some(o) => {
            return Err(ConvertError::format(format!(
                "NRRD space origin has {} components, expected 3",
                o.len()
            )))
        }
        None => Vector3::zeros(),
    };

    let column_axis = axis_of(layout, AxisRole::Column);
    let row_axis = axis_of(layout, AxisRole::Row);
    let slice_axis = axis_of(layout, AxisRole::Slice);

    let (row_direction, column_direction, spacings, step) = match &header.space_directions {
        Some(directions) => {
            let direction = |axis: Option<usize>, what: &str| -> Result<Option<Vector3<f64>>> {
                match axis.and_then(|i| directions[i].as_ref()) {
                    None => Ok(None),
                    Some(v) if v.len() == 3 => Ok(Some(flip(&Vector3::new(v[0], v[1], v[2]), signs))),
                    Some(v) => Err(ConvertError::geometry(
                        "NRRD",
                        format!("{} direction with {} components", what, v.len()),
                    )),
                }
            };
            let (row, column_spacing) = match direction(column_axis, "column")? {
                Some(v) => unit("NRRD", "column axis", v)?,
                None => return Err(ConvertError::geometry("NRRD", "missing column axis")),
            };
            let (column, row_spacing) = match direction(row_axis, "row")? {
                Some(v) => unit("NRRD", "row axis", v)?,
                None => return Err(ConvertError::geometry("NRRD", "missing row axis")),
            };
            let (step, slice_spacing) = match direction(slice_axis, "slice")? {
                Some(v) => {
                    let (_, s) = unit("NRRD", "slice axis", v)?;
                    (v, s)
                }
                None => (row.cross(&column), 1.),
            };
            (row, column, [column_spacing, row_spacing, slice_spacing], step)
        }
        None => {
            warnings.push(ConversionWarning::GeometryDegraded(
                "NRRD header has no space directions, assuming identity axes".to_string(),
            ));
            let spacing = |axis: Option<usize>, name: &'static str, warnings: &mut Warnings| {
                match axis.and_then(|i| header.spacings.as_ref().and_then(|s| s.get(i))) {
                    Some(&s) => checked_spacing(name, s, warnings),
                    None => 1.,
                }
            };
            let column_spacing = spacing(column_axis, "column", warnings);
            let row_spacing = spacing(row_axis, "row", warnings);
            let slice_spacing = spacing(slice_axis, "slice", warnings);
            (
                flip(&Vector3::x(), signs),
                flip(&Vector3::y(), signs),
                [column_spacing, row_spacing, slice_spacing],
                flip(&Vector3::z(), signs) * slice_spacing,
            )
        }
    };

    VoxelGeometry::new(
        spacings[0],
        spacings[1],
        spacings[2],
        row_direction,
        column_direction,
        origin,
        step,
        layout.frame_layout(order),
    )
}
