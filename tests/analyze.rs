mod util;

use approx::assert_abs_diff_eq;
use byteordered::Endianness;
use nalgebra::Vector3;
use pretty_assertions::assert_eq;
use util::{i16_samples, HeaderBytes};
use voxconv::{ConvertError, ConvertOptions, Photometric, VoxelBuffer};

#[test]
fn transverse_unflipped() {
    let header = HeaderBytes::analyze(Endianness::Big)
        .dim(&[3, 256, 256, 10])
        .pixdim(&[0., 1., 1., 2.])
        .u8_at(252, 0)
        .build();
    let image = vec![0u8; 256 * 256 * 10];
    let result = ConvertOptions::new()
        .convert_analyze(&header, &image)
        .unwrap();
    let g = &result.geometry;

    assert_abs_diff_eq!(g.row_direction(), Vector3::new(1., 0., 0.));
    assert_abs_diff_eq!(g.column_direction(), Vector3::new(0., -1., 0.));
    assert_eq!(g.number_of_frames(), 10);
    assert_abs_diff_eq!(g.frame_origin(5), Vector3::new(0., 0., 10.));
    assert_eq!(g.slice_spacing(), 2.);
    assert_eq!((result.rows, result.columns), (256, 256));
    assert_eq!(result.pixels.len(), 256 * 256 * 10);
    assert!(result.warnings.is_empty());
}

#[test]
fn every_orientation_has_unit_directions() {
    for orient in 0..6 {
        let header = HeaderBytes::analyze(Endianness::Little)
            .pixdim(&[0., 0.9, 1.1, 3.])
            .u8_at(252, orient)
            .build();
        let result = ConvertOptions::new()
            .convert_analyze(&header, &[0; 24])
            .unwrap();
        let g = &result.geometry;
        assert_abs_diff_eq!(g.row_direction().norm(), 1., epsilon = 1e-9);
        assert_abs_diff_eq!(g.column_direction().norm(), 1., epsilon = 1e-9);
        assert_abs_diff_eq!(g.row_direction().dot(&g.column_direction()), 0., epsilon = 1e-9);
        assert_abs_diff_eq!((g.frame_origin(1) - g.frame_origin(0)).norm(), 3., epsilon = 1e-6);
    }
}

#[test]
fn unknown_orientation_is_named() {
    let header = HeaderBytes::analyze(Endianness::Little)
        .u8_at(252, 9)
        .build();
    match ConvertOptions::new().convert_analyze(&header, &[0; 24]) {
        Err(ConvertError::UnsupportedGeometry { code, .. }) => assert!(code.contains('9')),
        other => panic!("unexpected result {:?}", other),
    }
}

#[test]
fn byte_order_independent() {
    let values: Vec<i16> = (0..24).map(|v| v * 100 - 1000).collect();
    let convert = |e: Endianness| {
        let header = HeaderBytes::analyze(e)
            .datatype(4, 16)
            .pixdim(&[0., 1.5, 1.5, 4.])
            .u8_at(252, 1)
            .build();
        ConvertOptions::new()
            .convert_analyze(&header, &i16_samples(&values, e))
            .unwrap()
    };
    let little = convert(Endianness::Little);
    let big = convert(Endianness::Big);
    assert_eq!(little, big);
    assert_eq!(little.pixels, VoxelBuffer::I16(values));
}

#[test]
fn malformed_header_size() {
    let header = HeaderBytes::analyze(Endianness::Little)
        .i32_at(0, 540)
        .build();
    let e = ConvertOptions::new()
        .convert_analyze(&header, &[0; 24])
        .unwrap_err();
    assert!(e.is_format_error());
    assert!(e.to_string().contains("indeterminate byte order"));
}

#[test]
fn short_image() {
    let header = HeaderBytes::analyze(Endianness::Little).build();
    match ConvertOptions::new().convert_analyze(&header, &[0; 23]) {
        Err(ConvertError::ShortRead {
            needed: 24,
            available: 23,
            ..
        }) => {}
        other => panic!("unexpected result {:?}", other),
    }
}

#[test]
fn rgb_and_spm_scale() {
    let header = HeaderBytes::analyze(Endianness::Big)
        .datatype(128, 24)
        .f32_at(112, 0.25)
        .build();
    let result = ConvertOptions::new()
        .convert_analyze(&header, &[7; 72])
        .unwrap();
    assert_eq!(result.encoding.samples_per_pixel, 3);
    assert_eq!(result.encoding.photometric, Photometric::Rgb);
    assert_eq!(result.encoding.rescale.map(|r| r.slope), Some(0.25));
    assert_eq!(result.frame_len(), 36);
}

#[test]
fn complex_is_unsupported() {
    let header = HeaderBytes::analyze(Endianness::Big)
        .datatype(32, 64)
        .build();
    match ConvertOptions::new().convert_analyze(&header, &[0; 192]) {
        Err(ConvertError::UnsupportedDataType(_)) => {}
        other => panic!("unexpected result {:?}", other),
    }
}
