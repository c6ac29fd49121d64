#![no_main]
use libfuzzer_sys::fuzz_target;
use voxconv::{AnalyzeHeader, NiftiHeader};

fuzz_target!(|data: &[u8]| {
    if let Ok(header) = NiftiHeader::from_bytes(data) {
        let _ = header.shape();
        let _ = header.data_type();
        let _ = header.data_offset();
        let _ = header.qform();
        let _ = header.sform();
        let _ = header.intent();
        let _ = header.slice_order();
        let _ = header.xyzt_to_space();
        let _ = header.description();
    }
    if let Ok(header) = AnalyzeHeader::from_bytes(data) {
        let _ = header.shape();
        let _ = header.data_type();
        let _ = header.orientation();
        let _ = header.spm_scale();
    }
});
