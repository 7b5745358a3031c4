//! Output encoding: PNG still, animated GIF, JSON detection dump.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame, RgbImage};
use serde::Serialize;

use crate::catalog;
use crate::detect::{DetectionResult, Roi};

/// GIF playback rate. Frame counts that divide a second of playback evenly
/// loop cleanly; that remains the caller's responsibility.
pub const GIF_FPS: u32 = 30;

/// Write the still composite (or pass-through) image.
pub fn write_still(image: &RgbImage, path: &Path) -> Result<()> {
    image
        .save(path)
        .with_context(|| format!("failed to write still image {}", path.display()))?;
    log::info!("wrote {}", path.display());
    Ok(())
}

/// Encode frames as an infinitely looping GIF at [`GIF_FPS`].
pub fn write_gif(frames: &[RgbImage], path: &Path) -> Result<()> {
    if frames.is_empty() {
        return Err(anyhow!("cannot encode a GIF with zero frames"));
    }

    let file = File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    let mut encoder = GifEncoder::new(BufWriter::new(file));
    encoder
        .set_repeat(Repeat::Infinite)
        .context("failed to set GIF repeat")?;

    let delay = Delay::from_numer_denom_ms(1000, GIF_FPS);
    for frame in frames {
        let rgba = image::DynamicImage::ImageRgb8(frame.clone()).to_rgba8();
        encoder
            .encode_frame(Frame::from_parts(rgba, 0, 0, delay))
            .context("failed to encode GIF frame")?;
    }
    log::info!("wrote {} ({} frames at {GIF_FPS} fps)", path.display(), frames.len());
    Ok(())
}

#[derive(Debug, Serialize)]
struct DetectionRecord {
    index: usize,
    class_id: u32,
    class_name: Option<&'static str>,
    roi: Roi,
}

/// Write a JSON sidecar describing every detection, for scripting against.
pub fn dump_detections(detection: &DetectionResult, path: &Path) -> Result<()> {
    let records: Vec<DetectionRecord> = detection
        .class_ids()
        .iter()
        .zip(detection.rois())
        .enumerate()
        .map(|(index, (&class_id, &roi))| DetectionRecord {
            index,
            class_id,
            class_name: catalog::class_name(class_id),
            roi,
        })
        .collect();

    let file = File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), &records)
        .context("failed to serialize detections")?;
    log::info!("wrote {} ({} detections)", path.display(), records.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    #[test]
    fn gif_requires_at_least_one_frame() {
        let dir = tempfile::tempdir().unwrap();
        let err = write_gif(&[], &dir.path().join("out.gif")).unwrap_err();
        assert!(err.to_string().contains("zero frames"));
    }

    #[test]
    fn gif_round_trips_frame_count() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.gif");
        let frames = vec![
            RgbImage::from_pixel(4, 4, image::Rgb([255, 0, 0])),
            RgbImage::from_pixel(4, 4, image::Rgb([0, 255, 0])),
            RgbImage::from_pixel(4, 4, image::Rgb([0, 0, 255])),
        ];
        write_gif(&frames, &path).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..6], b"GIF89a");
    }

    #[test]
    fn detection_dump_names_known_classes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("detections.json");
        let det = DetectionResult::new(
            vec![1, 200],
            vec![Roi::new(0, 0, 2, 2), Roi::new(0, 0, 1, 1)],
            Array3::from_elem((2, 2, 2), false),
        )
        .unwrap();
        dump_detections(&det, &path).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json[0]["class_name"], "person");
        assert!(json[1]["class_name"].is_null());
    }
}
