//! The NRRD text header.
//!
//! A NRRD header is a sequence of newline-terminated text lines: a magic
//! line starting with `NRRD`, then `field: value` and `key:=value` lines
//! and `#` comments, up to an empty line. Unless a `data file` field points
//! elsewhere, the binary payload starts right after that empty line, which
//! is why the payload offset is found by scanning the raw bytes rather
//! than a decoded string.

use crate::error::{ConvertError, Result};
use crate::util::checked_product;
use byteordered::Endianness;

/// Scalar type of the samples of a NRRD.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum NrrdType {
    /// signed char
    Int8,
    /// unsigned char
    Uint8,
    /// signed short
    Int16,
    /// unsigned short
    Uint16,
    /// signed int
    Int32,
    /// unsigned int
    Uint32,
    /// signed long long
    Int64,
    /// unsigned long long
    Uint64,
    /// 32 bit float
    Float,
    /// 64 bit float
    Double,
    /// opaque blocks of `block size` bytes
    Block,
}

impl NrrdType {
    /// Map a `type` field value, accepting all the synonyms of the format.
    pub fn from_name(name: &str) -> Option<NrrdType> {
        let name = name.trim().to_lowercase();
        let t = match name.as_str() {
            "signed char" | "int8" | "int8_t" => NrrdType::Int8,
            "uchar" | "unsigned char" | "uint8" | "uint8_t" => NrrdType::Uint8,
            "short" | "short int" | "signed short" | "signed short int" | "int16"
            | "int16_t" => NrrdType::Int16,
            "ushort" | "unsigned short" | "unsigned short int" | "uint16" | "uint16_t" => {
                NrrdType::Uint16
            }
            "int" | "signed int" | "int32" | "int32_t" => NrrdType::Int32,
            "uint" | "unsigned int" | "uint32" | "uint32_t" => NrrdType::Uint32,
            "longlong" | "long long" | "long long int" | "signed long long"
            | "signed long long int" | "int64" | "int64_t" => NrrdType::Int64,
            "ulonglong" | "unsigned long long" | "unsigned long long int" | "uint64"
            | "uint64_t" => NrrdType::Uint64,
            "float" => NrrdType::Float,
            "double" => NrrdType::Double,
            "block" => NrrdType::Block,
            _ => return None,
        };
        Some(t)
    }
}

/// How the payload of a NRRD is encoded.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub enum NrrdEncoding {
    /// Uncompressed binary samples.
    Raw,
    /// Gzip-compressed binary samples.
    Gzip,
    /// Any other encoding (ascii, hex, bzip2, ...), which is not decoded.
    Other(String),
}

/// A parsed NRRD header.
#[derive(Debug, Clone, PartialEq)]
pub struct NrrdHeader {
    /// The magic line, such as `NRRD0004`
    pub magic: String,
    /// Number of axes
    pub dimension: usize,
    /// Extent of each axis, fastest varying first
    pub sizes: Vec<usize>,
    /// Sample type
    pub sample_type: NrrdType,
    /// Payload encoding
    pub encoding: NrrdEncoding,
    /// Byte order of multi-byte samples, little endian if not declared
    pub endianness: Endianness,
    /// Name of the world space
    pub space: Option<String>,
    /// Number of world space dimensions, when declared without a name
    pub space_dimension: Option<usize>,
    /// One entry per axis: its direction vector, or `None` for an axis
    /// declared as `none` (not spatial)
    pub space_directions: Option<Vec<Option<Vec<f64>>>>,
    /// Location of the center of the first sample
    pub space_origin: Option<Vec<f64>>,
    /// Kind of each axis (`domain`, `space`, `list`, `RGB-color`, ...)
    pub kinds: Option<Vec<String>>,
    /// Sample spacing of each axis, NaN where undefined
    pub spacings: Option<Vec<f64>>,
    /// Detached payload file name
    pub data_file: Option<String>,
    /// Bytes to skip before the payload, -1 for "payload at the end"
    pub byte_skip: i64,
    /// Lines to skip before the payload
    pub line_skip: usize,
    /// All `field: value` pairs in order of appearance
    pub fields: Vec<(String, String)>,
    /// All `key:=value` pairs in order of appearance
    pub key_values: Vec<(String, String)>,
    /// Offset of the inline payload, if the header is followed by one
    pub data_offset: Option<usize>,
}

impl NrrdHeader {
    /// Parse a NRRD header from the start of the given bytes.
    ///
    /// # Errors
    ///
    /// - `ConvertError::BadMagic` if the first line does not start with `NRRD`
    /// - `ConvertError::Format` on a malformed line, a malformed vector, or
    ///   missing or inconsistent required fields
    pub fn from_bytes(bytes: &[u8]) -> Result<NrrdHeader> {
        let mut lines = Lines::new(bytes);
        let magic = match lines.next() {
            Some((_, line)) if line.starts_with(b"NRRD") => decode_line(1, line)?.to_string(),
            _ => {
                return Err(ConvertError::BadMagic {
                    offset: 0,
                    found: bytes.iter().take(4).cloned().collect(),
                })
            }
        };

        let mut fields = Vec::new();
        let mut key_values = Vec::new();
        for (number, line) in lines {
            if line.is_empty() {
                break;
            }
            let line = decode_line(number, line)?;
            if line.starts_with('#') {
                continue;
            }
            // whichever separator comes first decides the kind of line
            match (line.find(": "), line.find(":=")) {
                (Some(at), kv) if kv.map_or(true, |k| at < k) => {
                    let name = canonical_field(&line[..at]);
                    let value = line[at + 2..].trim().to_string();
                    if name == "datafile" && is_multi_file(&value) {
                        return Err(ConvertError::format(format!(
                            "NRRD data file {:?} spans several files, which is not supported",
                            value
                        )));
                    }
                    fields.push((name, value));
                }
                (_, Some(at)) => {
                    key_values.push((line[..at].to_string(), line[at + 2..].to_string()));
                }
                _ => {
                    return Err(ConvertError::format(format!(
                        "NRRD header line {} is neither a field nor a key/value pair: {:?}",
                        number, line
                    )))
                }
            }
        }

        let lookup = |name: &str| {
            fields
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.as_str())
        };

        let dimension: usize = parse_number(
            "dimension",
            lookup("dimension").ok_or_else(|| missing("dimension"))?,
        )?;
        let sizes = lookup("sizes")
            .ok_or_else(|| missing("sizes"))?
            .split_whitespace()
            .map(|s| parse_number::<usize>("sizes", s))
            .collect::<Result<Vec<_>>>()?;
        if sizes.len() != dimension || sizes.iter().any(|&s| s == 0) {
            return Err(ConvertError::format(format!(
                "NRRD sizes {:?} do not describe {} non-empty axes",
                sizes, dimension
            )));
        }
        checked_product("sizes", sizes.iter().cloned())?;
        let type_name = lookup("type").ok_or_else(|| missing("type"))?;
        let sample_type = NrrdType::from_name(type_name).ok_or_else(|| {
            ConvertError::format(format!("unknown NRRD type {:?}", type_name))
        })?;
        let encoding = match lookup("encoding").map(|e| e.to_lowercase()) {
            Some(ref e) if e == "raw" => NrrdEncoding::Raw,
            Some(ref e) if e == "gzip" || e == "gz" => NrrdEncoding::Gzip,
            Some(e) => NrrdEncoding::Other(e),
            None => return Err(missing("encoding")),
        };
        let endianness = match lookup("endian") {
            None | Some("little") => Endianness::Little,
            Some("big") => Endianness::Big,
            Some(other) => {
                return Err(ConvertError::format(format!(
                    "NRRD endian must be little or big, found {:?}",
                    other
                )))
            }
        };
        let space = lookup("space").map(str::to_string);
        let space_dimension: Option<usize> = lookup("spacedimension")
            .map(|v| parse_number("space dimension", v))
            .transpose()?;
        let space_directions = lookup("spacedirections")
            .map(|v| {
                let directions = parse_vector_list(v)?;
                if directions.len() != dimension {
                    return Err(ConvertError::format(format!(
                        "NRRD space directions lists {} axes, expected {}",
                        directions.len(),
                        dimension
                    )));
                }
                Ok(directions)
            })
            .transpose()?;
        let space_origin = lookup("spaceorigin").map(parse_vector).transpose()?;
        let kinds: Option<Vec<String>> = lookup("kinds").map(|v| v.split_whitespace().map(str::to_string).collect());
        let spacings = lookup("spacings")
            .map(|v| {
                v.split_whitespace()
                    .map(|s| parse_number::<f64>("spacings", s))
                    .collect::<Result<Vec<_>>>()
            })
            .transpose()?;
        let data_file = lookup("datafile").map(str::to_string);
        let byte_skip: i64 = lookup("byteskip")
            .map(|v| parse_number("byte skip", v))
            .transpose()?
            .unwrap_or(0);
        if byte_skip < -1 {
            return Err(ConvertError::format(format!(
                "NRRD byte skip must be -1 or more, found {}",
                byte_skip
            )));
        }
        let line_skip: usize = lookup("lineskip")
            .map(|v| parse_number("line skip", v))
            .transpose()?
            .unwrap_or(0);

        let data_offset = if data_file.is_some() {
            None
        } else {
            find_data_offset(bytes)
        };
        log::debug!("NRRD header parsed, inline payload at {:?}", data_offset);

        Ok(NrrdHeader {
            magic,
            dimension,
            sizes,
            sample_type,
            encoding,
            endianness,
            space,
            space_dimension,
            space_directions,
            space_origin,
            kinds,
            spacings,
            data_file,
            byte_skip,
            line_skip,
            fields,
            key_values,
            data_offset,
        })
    }

    /// Look up a field by name. Names are compared ignoring case and spaces.
    pub fn field(&self, name: &str) -> Option<&str> {
        let name = canonical_field(name);
        self.fields
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Look up a key/value pair by key.
    pub fn key_value(&self, key: &str) -> Option<&str> {
        self.key_values
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Whether the payload is gzip-compressed.
    pub fn is_gzip(&self) -> bool {
        self.encoding == NrrdEncoding::Gzip
    }

    /// Total number of samples in the payload.
    pub fn element_count(&self) -> Result<usize> {
        checked_product("sizes", self.sizes.iter().cloned())
    }
}

/// Locate the start of the inline payload: the byte following the first
/// empty line, terminated either by `\n` or `\r\n`.
pub fn find_data_offset(bytes: &[u8]) -> Option<usize> {
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\n' {
            match &bytes[i + 1..] {
                [b'\n', ..] => return Some(i + 2),
                [b'\r', b'\n', ..] => return Some(i + 3),
                _ => {}
            }
        }
        i += 1;
    }
    None
}

/// Iterator over the raw lines of a header, yielding 1-based line numbers.
/// Carriage returns preceding a line feed are dropped.
struct Lines<'a> {
    bytes: &'a [u8],
    pos: usize,
    number: usize,
}

impl<'a> Lines<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Lines {
            bytes,
            pos: 0,
            number: 0,
        }
    }
}

impl<'a> Iterator for Lines<'a> {
    type Item = (usize, &'a [u8]);

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.bytes.len() {
            return None;
        }
        let rest = &self.bytes[self.pos..];
        let (line, advance) = match rest.iter().position(|&b| b == b'\n') {
            Some(nl) => (&rest[..nl], nl + 1),
            None => (rest, rest.len()),
        };
        self.pos += advance;
        self.number += 1;
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        Some((self.number, line))
    }
}

fn decode_line(number: usize, line: &[u8]) -> Result<&str> {
    std::str::from_utf8(line).map_err(|_| {
        ConvertError::format(format!("NRRD header line {} is not valid UTF-8", number))
    })
}

fn canonical_field(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Whether a `data file` value uses the `LIST` form or the
/// `<format> <min> <max> <step>` pattern form.
fn is_multi_file(value: &str) -> bool {
    value.starts_with("LIST") || (value.contains('%') && value.split_whitespace().count() >= 4)
}

fn missing(field: &str) -> ConvertError {
    ConvertError::format(format!("NRRD header lacks the required {:?} field", field))
}

fn parse_number<T: std::str::FromStr>(field: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        ConvertError::format(format!("NRRD {} value {:?} is not a number", field, value))
    })
}

/// Parse a vector token of the form `(a,b,c)`.
pub fn parse_vector(token: &str) -> Result<Vec<f64>> {
    let token = token.trim();
    let inner = token
        .strip_prefix('(')
        .and_then(|t| t.strip_suffix(')'))
        .ok_or_else(|| ConvertError::format(format!("malformed NRRD vector {:?}", token)))?;
    inner
        .split(',')
        .map(|c| {
            c.trim().parse::<f64>().map_err(|_| {
                ConvertError::format(format!("malformed NRRD vector {:?}", token))
            })
        })
        .collect()
}

/// Parse a whitespace-separated list of vectors, where `none` marks an
/// axis without a vector. Spaces inside parentheses are tolerated.
pub fn parse_vector_list(value: &str) -> Result<Vec<Option<Vec<f64>>>> {
    let mut out = Vec::new();
    let mut rest = value.trim_start();
    while !rest.is_empty() {
        let end = if rest.starts_with('(') {
            rest.find(')').map(|p| p + 1).ok_or_else(|| {
                ConvertError::format(format!("malformed NRRD vector {:?}", rest))
            })?
        } else {
            rest.find(char::is_whitespace).unwrap_or(rest.len())
        };
        let token = &rest[..end];
        if token == "none" {
            out.push(None);
        } else {
            out.push(Some(parse_vector(token)?));
        }
        rest = rest[end..].trim_start();
    }
    Ok(out)
}
