//! Description of a headerless raw voxel file.
//!
//! Raw volumes carry no header of their own, so a small companion text
//! describes them, one `key = value` (or `key: value`) pair per line:
//!
//! ```text
//! type = short
//! rows = 256
//! columns = 256
//! frames = 40
//! endian = big
//! ```
//!
//! Besides these, the optional keys `offset`, `columnSpacing`,
//! `rowSpacing`, `sliceSpacing`, `rowDirection`, `columnDirection` and
//! `origin` are understood. Vectors are written as three numbers separated
//! by commas or whitespace. Unknown keys are ignored.

use crate::error::{ConvertError, Result};
use crate::util::checked_product;
use crate::volume::SampleFormat;
use byteordered::Endianness;

/// The parsed description of a raw voxel file.
#[derive(Debug, Clone, PartialEq)]
pub struct RawDescription {
    /// Sample format
    pub format: SampleFormat,
    /// Number of rows per frame
    pub rows: usize,
    /// Number of columns per frame
    pub columns: usize,
    /// Number of frames
    pub frames: usize,
    /// Byte order of the samples
    pub endianness: Endianness,
    /// Bytes to skip before the first sample
    pub offset: usize,
    /// Distance between adjacent columns
    pub column_spacing: Option<f64>,
    /// Distance between adjacent rows
    pub row_spacing: Option<f64>,
    /// Distance between adjacent frames
    pub slice_spacing: Option<f64>,
    /// Direction of increasing column index
    pub row_direction: Option<[f64; 3]>,
    /// Direction of increasing row index
    pub column_direction: Option<[f64; 3]>,
    /// Position of the first voxel
    pub origin: Option<[f64; 3]>,
}

impl RawDescription {
    /// Parse a description text.
    pub fn from_text(text: &str) -> Result<RawDescription> {
        let mut format = None;
        let mut rows = None;
        let mut columns = None;
        let mut desc = RawDescription {
            format: SampleFormat::U8,
            rows: 0,
            columns: 0,
            frames: 1,
            endianness: Endianness::Little,
            offset: 0,
            column_spacing: None,
            row_spacing: None,
            slice_spacing: None,
            row_direction: None,
            column_direction: None,
            origin: None,
        };

        for (i, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let at = line.find(|c: char| c == '=' || c == ':').ok_or_else(|| {
                ConvertError::format(format!(
                    "raw description line {} is not a key/value pair: {:?}",
                    i + 1,
                    line
                ))
            })?;
            let key = line[..at].trim().to_lowercase();
            let value = line[at + 1..].trim();
            match key.as_str() {
                "type" => format = Some(parse_type(value)?),
                "rows" => rows = Some(parse_extent(&key, value)?),
                "columns" => columns = Some(parse_extent(&key, value)?),
                "frames" => desc.frames = parse_extent(&key, value)?,
                "endian" | "endianness" => desc.endianness = parse_endian(value)?,
                "offset" => desc.offset = parse_value(&key, value)?,
                "columnspacing" => desc.column_spacing = Some(parse_value(&key, value)?),
                "rowspacing" => desc.row_spacing = Some(parse_value(&key, value)?),
                "slicespacing" => desc.slice_spacing = Some(parse_value(&key, value)?),
                "rowdirection" => desc.row_direction = Some(parse_triplet(&key, value)?),
                "columndirection" => desc.column_direction = Some(parse_triplet(&key, value)?),
                "origin" => desc.origin = Some(parse_triplet(&key, value)?),
                _ => log::debug!("ignoring raw description key {:?}", key),
            }
        }

        desc.format = format.ok_or_else(|| missing("type"))?;
        desc.rows = rows.ok_or_else(|| missing("rows"))?;
        desc.columns = columns.ok_or_else(|| missing("columns"))?;
        desc.element_count()?;
        Ok(desc)
    }

    /// Whether any geometry key was given.
    pub fn has_geometry(&self) -> bool {
        self.column_spacing.is_some()
            || self.row_spacing.is_some()
            || self.slice_spacing.is_some()
            || self.row_direction.is_some()
            || self.column_direction.is_some()
            || self.origin.is_some()
    }

    /// Number of samples described.
    pub fn element_count(&self) -> Result<usize> {
        let extents = [self.rows, self.columns, self.frames];
        checked_product("rows, columns and frames", extents.iter().cloned())
    }
}

fn missing(key: &str) -> ConvertError {
    ConvertError::format(format!("raw description lacks the required {:?} key", key))
}

fn parse_type(value: &str) -> Result<SampleFormat> {
    let format = match value.to_lowercase().as_str() {
        "byte" | "uchar" | "uint8" | "unsigned8" => SampleFormat::U8,
        "sbyte" | "char" | "int8" | "signed8" => SampleFormat::I8,
        "short" | "int16" | "signed16" => SampleFormat::I16,
        "ushort" | "uint16" | "unsigned16" => SampleFormat::U16,
        "float" | "float32" => SampleFormat::F32,
        "double" | "float64" => SampleFormat::F64,
        other => {
            return Err(ConvertError::UnsupportedDataType(format!(
                "raw type {:?}",
                other
            )))
        }
    };
    Ok(format)
}

fn parse_endian(value: &str) -> Result<Endianness> {
    match value.to_lowercase().as_str() {
        "little" | "le" => Ok(Endianness::Little),
        "big" | "be" => Ok(Endianness::Big),
        other => Err(ConvertError::format(format!(
            "raw description endian must be little or big, found {:?}",
            other
        ))),
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value.parse().map_err(|_| {
        ConvertError::format(format!(
            "raw description {} value {:?} is not a number",
            key, value
        ))
    })
}

fn parse_extent(key: &str, value: &str) -> Result<usize> {
    match parse_value::<usize>(key, value)? {
        0 => Err(ConvertError::format(format!(
            "raw description {} must be positive",
            key
        ))),
        n => Ok(n),
    }
}

fn parse_triplet(key: &str, value: &str) -> Result<[f64; 3]> {
    let parts = value
        .trim_matches(|c: char| c == '(' || c == ')')
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .map(|p| parse_value(key, p))
        .collect::<Result<Vec<f64>>>()?;
    match parts.as_slice() {
        [x, y, z] => Ok([*x, *y, *z]),
        _ => Err(ConvertError::format(format!(
            "raw description {} needs three components, found {:?}",
            key, value
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_description() {
        let d = RawDescription::from_text("type=short\nrows=4\ncolumns: 3\n").unwrap();
        assert_eq!(d.format, SampleFormat::I16);
        assert_eq!((d.rows, d.columns, d.frames), (4, 3, 1));
        assert_eq!(d.endianness, Endianness::Little);
        assert!(!d.has_geometry());
        assert_eq!(d.element_count().unwrap(), 12);
    }

    #[test]
    fn geometry_keys() {
        let text = "# acquisition\n\
                    type = float\nrows = 2\ncolumns = 2\nframes = 3\nendian = big\n\
                    offset = 16\nsliceSpacing = 2.5\nrowDirection = 0, 1, 0\n\
                    columnDirection = (0 0 -1)\norigin = 1,2,3\nvendor = acme\n";
        let d = RawDescription::from_text(text).unwrap();
        assert_eq!(d.format, SampleFormat::F32);
        assert_eq!(d.endianness, Endianness::Big);
        assert_eq!(d.offset, 16);
        assert_eq!(d.slice_spacing, Some(2.5));
        assert_eq!(d.row_direction, Some([0., 1., 0.]));
        assert_eq!(d.column_direction, Some([0., 0., -1.]));
        assert_eq!(d.origin, Some([1., 2., 3.]));
        assert!(d.has_geometry());
    }

    #[test]
    fn invalid_descriptions() {
        assert!(RawDescription::from_text("rows=4\ncolumns=3").is_err());
        assert!(RawDescription::from_text("type=short\nrows=0\ncolumns=3").is_err());
        assert!(RawDescription::from_text("type=short\nrows 4\ncolumns=3").is_err());
        let huge = format!("type=uchar\nrows={0}\ncolumns={0}\nframes={0}", usize::MAX / 2);
        let e = RawDescription::from_text(&huge).unwrap_err();
        assert!(e.is_format_error());
        assert!(e.to_string().contains("frames"));
        match RawDescription::from_text("type=complex\nrows=4\ncolumns=3") {
            Err(ConvertError::UnsupportedDataType(_)) => {}
            other => panic!("unexpected result {:?}", other),
        }
    }
}
