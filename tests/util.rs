//! Builders of synthetic Analyze 7.5 and NIfTI-1 files.
#![allow(dead_code)]
use byteordered::{ByteOrdered, Endianness};

/// A 348 byte header under construction, written field by field at the
/// offsets of the standard layouts.
#[derive(Debug, Clone)]
pub struct HeaderBytes {
    bytes: Vec<u8>,
    endianness: Endianness,
}

impl HeaderBytes {
    fn blank(endianness: Endianness) -> Self {
        let mut h = HeaderBytes {
            bytes: vec![0; 348],
            endianness,
        };
        h.i32_at(0, 348);
        h
    }

    /// An Analyze 7.5 header with a 4x3x2 unsigned byte volume.
    pub fn analyze(endianness: Endianness) -> Self {
        let mut h = Self::blank(endianness);
        h.bytes[38] = b'r';
        h.dim(&[3, 4, 3, 2]).datatype(2, 8).pixdim(&[0., 1., 1., 1.]);
        h
    }

    /// A single-file NIfTI-1 header with a 4x3x2 unsigned byte volume and
    /// no transform.
    pub fn nifti(endianness: Endianness) -> Self {
        let mut h = Self::blank(endianness);
        h.dim(&[3, 4, 3, 2]).datatype(2, 8).pixdim(&[1., 1., 1., 1.]);
        h.f32_at(108, 352.);
        h.bytes[344..348].copy_from_slice(b"n+1\0");
        h
    }

    pub fn i16_at(&mut self, offset: usize, v: i16) -> &mut Self {
        ByteOrdered::runtime(&mut self.bytes[offset..offset + 2], self.endianness)
            .write_i16(v)
            .unwrap();
        self
    }

    pub fn i32_at(&mut self, offset: usize, v: i32) -> &mut Self {
        ByteOrdered::runtime(&mut self.bytes[offset..offset + 4], self.endianness)
            .write_i32(v)
            .unwrap();
        self
    }

    pub fn f32_at(&mut self, offset: usize, v: f32) -> &mut Self {
        ByteOrdered::runtime(&mut self.bytes[offset..offset + 4], self.endianness)
            .write_f32(v)
            .unwrap();
        self
    }

    pub fn u8_at(&mut self, offset: usize, v: u8) -> &mut Self {
        self.bytes[offset] = v;
        self
    }

    pub fn bytes_at(&mut self, offset: usize, v: &[u8]) -> &mut Self {
        self.bytes[offset..offset + v.len()].copy_from_slice(v);
        self
    }

    /// Set `dim`, with `dim[0]` first.
    pub fn dim(&mut self, dim: &[i16]) -> &mut Self {
        for (i, &d) in dim.iter().enumerate() {
            self.i16_at(40 + 2 * i, d);
        }
        self
    }

    pub fn datatype(&mut self, code: i16, bitpix: i16) -> &mut Self {
        self.i16_at(70, code).i16_at(72, bitpix)
    }

    /// Set `pixdim`, with `pixdim[0]` first.
    pub fn pixdim(&mut self, pixdim: &[f32]) -> &mut Self {
        for (i, &p) in pixdim.iter().enumerate() {
            self.f32_at(76 + 4 * i, p);
        }
        self
    }

    /// Set the NIfTI-1 qform code, quaternion and offsets.
    pub fn qform(&mut self, code: i16, bcd: [f32; 3], offset: [f32; 3]) -> &mut Self {
        self.i16_at(252, code);
        for (i, &v) in bcd.iter().chain(offset.iter()).enumerate() {
            self.f32_at(256 + 4 * i, v);
        }
        self
    }

    /// Set the NIfTI-1 sform code and affine rows.
    pub fn sform(&mut self, code: i16, rows: [[f32; 4]; 3]) -> &mut Self {
        self.i16_at(254, code);
        for (r, row) in rows.iter().enumerate() {
            for (c, &v) in row.iter().enumerate() {
                self.f32_at(280 + 16 * r + 4 * c, v);
            }
        }
        self
    }

    /// The header bytes alone.
    pub fn build(&self) -> Vec<u8> {
        self.bytes.clone()
    }

    /// The header followed by the 4 byte extension flag and the samples,
    /// as in a single-file NIfTI-1.
    pub fn build_with(&self, samples: &[u8]) -> Vec<u8> {
        let mut out = self.build();
        out.extend_from_slice(&[0; 4]);
        out.extend_from_slice(samples);
        out
    }
}

/// Encode 16 bit samples in the given byte order.
pub fn i16_samples(values: &[i16], endianness: Endianness) -> Vec<u8> {
    let mut out = Vec::with_capacity(values.len() * 2);
    {
        let mut w = ByteOrdered::runtime(&mut out, endianness);
        for &v in values {
            w.write_i16(v).unwrap();
        }
    }
    out
}

/// Encode 32 bit float samples in the given byte order.
pub fn f32_samples(values: &[f32], endianness: Endianness) -> Vec<u8> {
    let mut out = Vec::with_capacity(values.len() * 4);
    {
        let mut w = ByteOrdered::runtime(&mut out, endianness);
        for &v in values {
            w.write_f32(v).unwrap();
        }
    }
    out
}
