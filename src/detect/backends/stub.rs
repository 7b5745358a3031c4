use anyhow::Result;
use image::RgbImage;
use ndarray::Array3;
use sha2::{Digest, Sha256};

use crate::detect::backend::DetectorBackend;
use crate::detect::result::{DetectionResult, Roi};

/// Model-free backend for tests and demos.
///
/// By default it synthesizes a single `person` detection: a box around the
/// image center whose exact extent is nudged by a hash of the pixels, so
/// different images produce (deterministically) different detections. Tests
/// inject exact detections with [`StubBackend::with_detections`].
pub struct StubBackend {
    injected: Option<DetectionResult>,
}

impl StubBackend {
    pub fn new() -> Self {
        Self { injected: None }
    }

    /// Return `detections` from every `detect` call instead of synthesizing.
    pub fn with_detections(detections: DetectionResult) -> Self {
        Self {
            injected: Some(detections),
        }
    }

    fn synthesize(&self, image: &RgbImage) -> Result<DetectionResult> {
        let (width, height) = image.dimensions();
        if width < 4 || height < 4 {
            return Ok(DetectionResult::empty(height, width));
        }

        // Center third of the frame, shifted by up to 1/16 of the image from
        // the pixel hash so the stub is image-dependent but repeatable.
        let digest: [u8; 32] = Sha256::digest(image.as_raw()).into();
        let dx = (digest[0] as u32 % (width / 8).max(1)) as i64 - (width / 16) as i64;
        let dy = (digest[1] as u32 % (height / 8).max(1)) as i64 - (height / 16) as i64;

        let x1 = ((width / 3) as i64 + dx).clamp(0, (width - 2) as i64) as u32;
        let y1 = ((height / 3) as i64 + dy).clamp(0, (height - 2) as i64) as u32;
        let x2 = (x1 + width / 3).min(width);
        let y2 = (y1 + height / 3).min(height);
        let roi = Roi::new(y1, x1, y2, x2);

        let mut masks = Array3::from_elem((height as usize, width as usize, 1), false);
        for y in y1..y2 {
            for x in x1..x2 {
                masks[[y as usize, x as usize, 0]] = true;
            }
        }

        Ok(DetectionResult::new(vec![1], vec![roi], masks)?)
    }
}

impl Default for StubBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl DetectorBackend for StubBackend {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn detect(&mut self, image: &RgbImage) -> Result<DetectionResult> {
        if let Some(injected) = &self.injected {
            return Ok(injected.clone());
        }
        self.synthesize(image)
    }
}
