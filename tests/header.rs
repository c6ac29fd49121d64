mod util;

use byteordered::Endianness;
use pretty_assertions::assert_eq;
use util::HeaderBytes;
use voxconv::typedef::{AnalyzeOrientation, AnalyzeType, Coded, NiftiType, Unit, XForm};
use voxconv::{AnalyzeHeader, ConvertError, NiftiHeader};

fn fsl_descrip() -> [u8; 80] {
    let mut descrip = [0; 80];
    descrip[..10].copy_from_slice(b"FSL3.2beta");
    descrip
}

#[test]
fn nifti_header_both_byte_orders() {
    for &e in &[Endianness::Little, Endianness::Big] {
        let bytes = HeaderBytes::nifti(e)
            .dim(&[3, 91, 109, 91, 1, 1, 1, 1])
            .datatype(4, 16)
            .pixdim(&[-1., 2., 2., 2., 1., 1., 1., 1.])
            .u8_at(123, 10)
            .bytes_at(148, b"FSL3.2beta")
            .qform(2, [0., 0.5, 0.], [-90., 126., -72.])
            .build();
        let h = NiftiHeader::from_bytes(&bytes).unwrap();

        let expected = NiftiHeader {
            dim: [3, 91, 109, 91, 1, 1, 1, 1],
            datatype: 4,
            bitpix: 16,
            pixdim: [-1., 2., 2., 2., 1., 1., 1., 1.],
            xyzt_units: 10,
            descrip: fsl_descrip(),
            qform_code: 2,
            quatern_c: 0.5,
            quatern_x: -90.,
            quatern_y: 126.,
            quatern_z: -72.,
            endianness: e,
            ..Default::default()
        };
        assert_eq!(h, expected);
        assert_eq!(h.data_type(), Coded::Known(NiftiType::Int16));
        assert_eq!(h.xyzt_to_space(), Coded::Known(Unit::Mm));
        assert_eq!(h.xyzt_to_time(), Coded::Known(Unit::Sec));
        assert_eq!(h.qform(), Coded::Known(XForm::AlignedAnat));
        assert_eq!(h.sform(), Coded::Known(XForm::Unknown));
        assert_eq!(h.description(), "FSL3.2beta");
        assert!(h.is_single_file());
        assert_eq!(h.data_offset().unwrap(), 352);

        let shape = h.shape().unwrap();
        assert_eq!((shape.columns, shape.rows), (91, 109));
    }
}

#[test]
fn nifti_header_unknown_codes() {
    let bytes = HeaderBytes::nifti(Endianness::Little)
        .datatype(1000, 8)
        .i16_at(254, 9)
        .build();
    let h = NiftiHeader::from_bytes(&bytes).unwrap();
    assert_eq!(h.data_type(), Coded::Unrecognized(1000));
    assert_eq!(h.sform(), Coded::Unrecognized(9));
}

#[test]
fn nifti_header_too_short() {
    let bytes = HeaderBytes::nifti(Endianness::Little).build();
    assert!(NiftiHeader::from_bytes(&bytes[..200]).is_err());
}

#[test]
fn analyze_header_both_byte_orders() {
    for &e in &[Endianness::Little, Endianness::Big] {
        let bytes = HeaderBytes::analyze(e)
            .dim(&[4, 64, 64, 10, 3])
            .datatype(16, 32)
            .pixdim(&[0., 3., 3., 4.])
            .bytes_at(148, b"FSL3.2beta")
            .u8_at(252, 1)
            .f32_at(112, 0.5)
            .build();
        let h = AnalyzeHeader::from_bytes(&bytes).unwrap();

        assert_eq!(h.endianness, e);
        assert_eq!(h.sizeof_hdr, 348);
        assert_eq!(h.regular, b'r');
        assert_eq!(h.dim, [4, 64, 64, 10, 3, 0, 0, 0]);
        assert_eq!(h.bitpix, 32);
        assert_eq!(h.pixdim, [0., 3., 3., 4., 0., 0., 0., 0.]);
        assert_eq!(h.descrip[..], fsl_descrip()[..]);
        assert_eq!(h.description(), "FSL3.2beta");
        assert_eq!(h.data_type(), Coded::Known(AnalyzeType::Float32));
        assert_eq!(h.orientation(), Coded::Known(AnalyzeOrientation::CoronalUnflipped));
        assert_eq!(h.spm_scale(), Some(0.5));
        assert_eq!(h.data_offset(), 0);
    }
}

#[test]
fn indeterminate_byte_order() {
    let bytes = HeaderBytes::analyze(Endianness::Little)
        .i32_at(0, 0x0102_0304)
        .build();
    match AnalyzeHeader::from_bytes(&bytes) {
        Err(ConvertError::IndeterminateByteOrder { .. }) => {}
        other => panic!("unexpected result {:?}", other),
    }
}
