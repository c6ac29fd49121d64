#![no_main]
use libfuzzer_sys::fuzz_target;
use voxconv::{ConvertOptions, NrrdHeader};

fuzz_target!(|data: &[u8]| {
    if let Ok(header) = NrrdHeader::from_bytes(data) {
        let _ = header.element_count();
        let _ = ConvertOptions::new().convert_nrrd(data, None);
    }
});
