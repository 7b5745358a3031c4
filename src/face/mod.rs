//! Face-recognition matching.
//!
//! Face matching is the second external model seam: the pipeline consumes
//! only `encode` (one embedding per reference image) and `locate_and_match`
//! (boxes of faces recognized as known). Reference images are read from a
//! directory tree once per run; encoding is the expensive step, so encodings
//! are computed up front and reused across the match call.

mod stub;
#[cfg(feature = "backend-tract")]
mod tract;

pub use stub::StubFaceMatcher;
#[cfg(feature = "backend-tract")]
pub use tract::TractFaceMatcher;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use image::RgbImage;

use crate::detect::Roi;
use crate::error::BlockerError;

/// Opaque face embedding produced by a matcher backend.
#[derive(Clone, Debug, PartialEq)]
pub struct FaceEncoding(pub Vec<f32>);

impl FaceEncoding {
    /// Cosine similarity against another encoding; 0.0 when either is empty.
    pub fn similarity(&self, other: &FaceEncoding) -> f32 {
        let dot: f32 = self.0.iter().zip(&other.0).map(|(a, b)| a * b).sum();
        let norm_a: f32 = self.0.iter().map(|a| a * a).sum::<f32>().sqrt();
        let norm_b: f32 = other.0.iter().map(|b| b * b).sum::<f32>().sqrt();
        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }
        dot / (norm_a * norm_b)
    }
}

/// Face matcher trait.
///
/// Same audit posture as [`crate::detect::DetectorBackend`]: images are
/// read-only and must not be retained past the call.
pub trait FaceMatcher: Send {
    fn name(&self) -> &'static str;

    /// Embed the most prominent face in a reference image, if any.
    fn encode(&mut self, image: &RgbImage) -> Result<Option<FaceEncoding>>;

    /// Boxes (image pixel coordinates) of faces recognized as one of `known`.
    fn locate_and_match(&mut self, image: &RgbImage, known: &[FaceEncoding]) -> Result<Vec<Roi>>;
}

const IMAGE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "gif"];

/// Recursively collect reference images under `dir` and encode each one.
///
/// Fails with [`BlockerError::MissingReference`] when the walk yields no
/// usable encodings; unreadable or face-less files are skipped with a
/// warning so one bad reference does not sink the run.
pub fn load_reference_encodings(
    dir: &Path,
    matcher: &mut dyn FaceMatcher,
) -> Result<Vec<FaceEncoding>> {
    let mut paths = Vec::new();
    collect_reference_paths(dir, &mut paths)
        .with_context(|| format!("failed to scan reference directory {}", dir.display()))?;
    paths.sort();

    let mut encodings = Vec::new();
    for path in paths {
        let image = match image::open(&path) {
            Ok(image) => image.to_rgb8(),
            Err(err) => {
                log::warn!("skipping unreadable reference {}: {err}", path.display());
                continue;
            }
        };
        match matcher.encode(&image)? {
            Some(encoding) => {
                log::debug!("encoded reference {}", path.display());
                encodings.push(encoding);
            }
            None => log::warn!("no face found in reference {}", path.display()),
        }
    }

    if encodings.is_empty() {
        return Err(BlockerError::MissingReference {
            dir: dir.to_path_buf(),
        }
        .into());
    }
    Ok(encodings)
}

fn collect_reference_paths(dir: &Path, out: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            collect_reference_paths(&path, out)?;
        } else if has_image_extension(&path) {
            out.push(path);
        }
    }
    Ok(())
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            IMAGE_EXTENSIONS.iter().any(|known| *known == ext)
        })
        .unwrap_or(false)
}
