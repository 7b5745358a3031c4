use anyhow::Result;
use image::RgbImage;

use crate::detect::result::DetectionResult;

/// Detector backend trait.
///
/// This is the narrow seam to the external segmentation model. The pipeline
/// consumes nothing but `detect`; everything model-specific (weights format,
/// input size, score thresholds) stays behind the implementation.
///
/// Implementations must treat the image as read-only and must not retain it
/// beyond the `detect` call. Backends are not assumed to be reentrant; the
/// pipeline invokes them from a single thread.
pub trait DetectorBackend: Send {
    /// Backend identifier, as selected by `--backend`.
    fn name(&self) -> &'static str;

    /// Run instance segmentation over one image.
    fn detect(&mut self, image: &RgbImage) -> Result<DetectionResult>;

    /// Optional warm-up hook.
    fn warm_up(&mut self) -> Result<()> {
        Ok(())
    }
}

impl std::fmt::Debug for dyn DetectorBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DetectorBackend")
            .field("name", &self.name())
            .finish()
    }
}
