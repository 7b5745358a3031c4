//! Labeled preview: box outlines plus a printed index/class listing.
//!
//! This stands in for the upstream tool's rich matplotlib preview, which is
//! out of scope; outlines are enough to pick indices for `--objects`.

use image::{Rgb, RgbImage};

use crate::catalog;
use crate::detect::DetectionResult;

const OUTLINE_THICKNESS: u32 = 2;

/// A small rotation of visually distinct outline colors, cycled by class id.
const PALETTE: [[u8; 3]; 8] = [
    [230, 25, 75],
    [60, 180, 75],
    [255, 225, 25],
    [0, 130, 200],
    [245, 130, 48],
    [145, 30, 180],
    [70, 240, 240],
    [240, 50, 230],
];

fn class_color(class_id: u32) -> Rgb<u8> {
    Rgb(PALETTE[class_id as usize % PALETTE.len()])
}

/// Draw an outline for every detection on a copy of the image.
pub fn annotate(image: &RgbImage, detection: &DetectionResult) -> RgbImage {
    let mut output = image.clone();
    let (width, height) = output.dimensions();

    for (&class_id, roi) in detection.class_ids().iter().zip(detection.rois()) {
        let color = class_color(class_id);
        for t in 0..OUTLINE_THICKNESS {
            // Horizontal edges.
            for x in roi.x1..roi.x2.min(width) {
                for y in [roi.y1.saturating_add(t), roi.y2.saturating_sub(t + 1)] {
                    if y >= roi.y1 && y < roi.y2.min(height) {
                        output.put_pixel(x, y, color);
                    }
                }
            }
            // Vertical edges.
            for y in roi.y1..roi.y2.min(height) {
                for x in [roi.x1.saturating_add(t), roi.x2.saturating_sub(t + 1)] {
                    if x >= roi.x1 && x < roi.x2.min(width) {
                        output.put_pixel(x, y, color);
                    }
                }
            }
        }
    }
    output
}

/// One line per detection, for the preview printout.
pub fn listing(detection: &DetectionResult) -> String {
    let mut out = String::new();
    for (index, (&class_id, roi)) in detection
        .class_ids()
        .iter()
        .zip(detection.rois())
        .enumerate()
    {
        let name = catalog::class_name(class_id).unwrap_or("unknown");
        out.push_str(&format!(
            "[{index}] {name} (class {class_id}) at y{}-{} x{}-{}\n",
            roi.y1, roi.y2, roi.x1, roi.x2
        ));
    }
    out
}
