//! Private utility module
use crate::error::{ConvertError, Result};
use flate2::bufread::MultiGzDecoder;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

/// Interpret a fixed-width text field, dropping everything from the first
/// NUL byte and any trailing whitespace.
pub fn text_field(raw: &[u8]) -> String {
    let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
    String::from_utf8_lossy(&raw[..end]).trim_end().to_string()
}

/// Multiply the extents read from a header field, failing when the product
/// does not fit in `usize`.
pub fn checked_product<I>(field: &str, extents: I) -> Result<usize>
where
    I: IntoIterator<Item = usize>,
{
    extents
        .into_iter()
        .try_fold(1usize, |acc, e| acc.checked_mul(e))
        .ok_or_else(|| {
            ConvertError::format(format!("the {} extents multiply beyond usize", field))
        })
}

/// Decompress a complete gzip stream.
pub fn gunzip(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    let _ = MultiGzDecoder::new(bytes).read_to_end(&mut out)?;
    Ok(out)
}

/// Read the full contents of a file, decoding it as a Gzip stream if
/// the file's name ends with ".gz".
pub fn read_file<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
    let gz = is_gz_file(&path);
    let mut file = BufReader::new(File::open(path)?);
    let mut out = Vec::new();
    if gz {
        let _ = MultiGzDecoder::new(file).read_to_end(&mut out)?;
    } else {
        let _ = file.read_to_end(&mut out)?;
    }
    Ok(out)
}

/// Check whether the given path ends with ".gz".
pub fn is_gz_file<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref()
        .file_name()
        .map(|a| a.to_string_lossy().ends_with(".gz"))
        .unwrap_or(false)
}

/// The file name of `path` without a trailing ".gz", lowercased.
pub fn plain_file_name<P: AsRef<Path>>(path: P) -> String {
    let name = path
        .as_ref()
        .file_name()
        .map(|a| a.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match name.strip_suffix(".gz") {
        Some(stripped) => stripped.to_string(),
        None => name,
    }
}

/// Candidate paths of the companion file of `path`, replacing its
/// (possibly gzipped) extension with `ext`. The compressed candidate is
/// listed first when the original file was compressed.
pub fn companion_files<P: AsRef<Path>>(path: P, ext: &str) -> Vec<PathBuf> {
    let path = path.as_ref();
    let base = if is_gz_file(path) {
        path.with_extension("")
    } else {
        path.to_path_buf()
    };
    let plain = base.with_extension(ext);
    let gz = base.with_extension(format!("{}.gz", ext));
    if is_gz_file(path) {
        vec![gz, plain]
    } else {
        vec![plain, gz]
    }
}

/// Read the first companion file that exists.
pub fn read_companion<P: AsRef<Path>>(path: P, ext: &str) -> Result<Vec<u8>> {
    let candidates = companion_files(&path, ext);
    for candidate in &candidates {
        if candidate.is_file() {
            log::debug!("reading companion file {}", candidate.display());
            return read_file(candidate);
        }
    }
    // report the preferred candidate as missing
    read_file(&candidates[0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn filenames() {
        assert!(!is_gz_file("/var/lib/foo.bar"));
        assert!(!is_gz_file("foo.bar"));
        assert!(!is_gz_file("/var/lib/foo.bar/"));
        assert!(!is_gz_file("/var/lib/foo.gz/bar"));
        assert!(is_gz_file("/var/lib/foo.bar.gz"));
        assert!(is_gz_file("foo.nii.gz"));

        assert_eq!(plain_file_name("/data/Brain.NII.gz"), "brain.nii");
        assert_eq!(plain_file_name("scan.nhdr"), "scan.nhdr");
    }

    #[test]
    fn companions() {
        assert_eq!(
            companion_files("/data/vol.hdr", "img"),
            vec![
                PathBuf::from("/data/vol.img"),
                PathBuf::from("/data/vol.img.gz")
            ]
        );
        assert_eq!(
            companion_files("/data/vol.hdr.gz", "img"),
            vec![
                PathBuf::from("/data/vol.img.gz"),
                PathBuf::from("/data/vol.img")
            ]
        );
    }

    #[test]
    fn text_fields() {
        assert_eq!(text_field(b"FSL3.2beta\0\0\0junk"), "FSL3.2beta");
        assert_eq!(text_field(b"none   "), "none");
        assert_eq!(text_field(b""), "");
    }
}
