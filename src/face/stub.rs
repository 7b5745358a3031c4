use anyhow::Result;
use image::RgbImage;
use sha2::{Digest, Sha256};

use crate::detect::Roi;
use crate::face::{FaceEncoding, FaceMatcher};

/// Deterministic matcher for tests and model-free runs.
///
/// Encodings are derived from a pixel hash, so equal images encode equally.
/// `locate_and_match` reports the boxes injected at construction whenever at
/// least one known encoding is supplied; with no injected boxes it reports
/// nothing, which exercises the no-match pass-through path.
pub struct StubFaceMatcher {
    boxes: Vec<Roi>,
}

impl StubFaceMatcher {
    pub fn new() -> Self {
        Self { boxes: Vec::new() }
    }

    /// Report `boxes` as recognized faces on every match call.
    pub fn with_boxes(boxes: Vec<Roi>) -> Self {
        Self { boxes }
    }
}

impl Default for StubFaceMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl FaceMatcher for StubFaceMatcher {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn encode(&mut self, image: &RgbImage) -> Result<Option<FaceEncoding>> {
        let digest: [u8; 32] = Sha256::digest(image.as_raw()).into();
        let embedding = digest
            .iter()
            .map(|byte| *byte as f32 / 255.0)
            .collect::<Vec<_>>();
        Ok(Some(FaceEncoding(embedding)))
    }

    fn locate_and_match(&mut self, _image: &RgbImage, known: &[FaceEncoding]) -> Result<Vec<Roi>> {
        if known.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.boxes.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_images_encode_equally() {
        let image = RgbImage::from_pixel(8, 8, image::Rgb([1, 2, 3]));
        let mut matcher = StubFaceMatcher::new();
        let a = matcher.encode(&image).unwrap().unwrap();
        let b = matcher.encode(&image).unwrap().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn no_known_encodings_means_no_matches() {
        let image = RgbImage::new(8, 8);
        let mut matcher = StubFaceMatcher::with_boxes(vec![Roi::new(0, 0, 4, 4)]);
        assert!(matcher.locate_and_match(&image, &[]).unwrap().is_empty());
    }
}
