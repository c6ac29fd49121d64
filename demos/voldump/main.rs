//! An application for printing the geometry of a converted volume.

extern crate voxconv;

use std::env;
use voxconv::{ConvertOptions, FrameOrder};

fn main() {
    let mut args = env::args().skip(1);
    let filename = args.next().expect("Path to a volume file is required");
    let order = match args.next().as_deref() {
        Some("slice-major") => FrameOrder::SliceMajor,
        _ => FrameOrder::ScalarMajor,
    };
    let result = ConvertOptions::new()
        .frame_order(order)
        .convert_file(filename)
        .expect("Failed to convert volume");

    let g = &result.geometry;
    println!("{} frames of {}x{}", g.number_of_frames(), result.columns, result.rows);
    println!("{:#?}", result.encoding);
    println!(
        "spacing: {} x {} x {}",
        g.column_spacing(),
        g.row_spacing(),
        g.slice_spacing()
    );
    println!("row direction: {:?}", g.row_direction().as_slice());
    println!("column direction: {:?}", g.column_direction().as_slice());
    for f in 0..g.number_of_frames() {
        println!("frame {}: {:?}", f, g.frame_origin(f).as_slice());
    }
    if let Some(range) = result.value_range {
        println!("value range: [{}, {}]", range.min, range.max);
    }
    for w in &result.warnings {
        println!("warning: {}", w);
    }
}
