#![no_main]
use libfuzzer_sys::fuzz_target;
use voxconv::ConvertOptions;

fuzz_target!(|data: &[u8]| {
    if let Ok(result) = ConvertOptions::new().convert_nifti(data) {
        let geometry = &result.geometry;
        for frame in 0..geometry.number_of_frames().min(16) {
            let _ = geometry.frame_origin(frame);
        }
    }
});
