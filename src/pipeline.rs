//! The straight-line blocking pipeline.
//!
//! One run is: resolve the criterion to selected object indices (running the
//! face matcher first when asked), then composite and animate. Everything
//! here is synchronous and single-threaded; the only shared inputs are
//! read-only.

use anyhow::{anyhow, Result};
use image::RgbImage;
use rand::Rng;

use crate::color::Rgb;
use crate::compose;
use crate::detect::DetectionResult;
use crate::face::{self, FaceMatcher};
use crate::select::{self, SelectionCriterion};

/// Inputs that vary per run, already parsed at the CLI boundary.
#[derive(Clone, Debug)]
pub struct BlockRequest {
    pub criterion: SelectionCriterion,
    pub color: Rgb,
    pub frame_count: usize,
}

/// What a run produced.
///
/// An empty `frames` means the selection resolved to zero objects: `still`
/// is then the unmodified source image and no animation should be written.
#[derive(Debug)]
pub struct BlockOutcome {
    pub selected: Vec<usize>,
    pub still: RgbImage,
    pub frames: Vec<RgbImage>,
}

impl BlockOutcome {
    pub fn is_pass_through(&self) -> bool {
        self.frames.is_empty()
    }
}

/// Run selection + compositing + animation over one detection result.
///
/// `matcher` is only consulted for a face-match criterion and must then be
/// present; reference encodings are computed once, before any compositing.
pub fn block_image<'m, R: Rng + ?Sized>(
    image: &RgbImage,
    detection: &DetectionResult,
    request: &BlockRequest,
    mut matcher: Option<&mut (dyn FaceMatcher + 'm)>,
    rng: &mut R,
) -> Result<BlockOutcome> {
    let selected = match &request.criterion {
        SelectionCriterion::FaceMatch { reference_dir } => {
            let matcher = matcher
                .as_deref_mut()
                .ok_or_else(|| anyhow!("face matching requested but no matcher is available"))?;
            let known = face::load_reference_encodings(reference_dir, matcher)?;
            log::info!("loaded {} reference encoding(s)", known.len());
            let face_boxes = matcher.locate_and_match(image, &known)?;
            log::info!("recognized {} known face(s)", face_boxes.len());
            select::select_by_face_boxes(detection, &face_boxes)
        }
        criterion => select::select_objects(criterion, detection)?,
    };

    if selected.is_empty() {
        log::warn!("selection matched no objects; emitting the image unmodified");
        return Ok(BlockOutcome {
            selected,
            still: image.clone(),
            frames: Vec::new(),
        });
    }
    log::info!(
        "blocking {} of {} detected object(s)",
        selected.len(),
        detection.object_count()
    );

    let frames = compose::animate(
        image,
        &selected,
        detection,
        request.color,
        request.frame_count,
        rng,
    );
    let still = frames
        .first()
        .cloned()
        .ok_or_else(|| anyhow!("animation produced no frames"))?;

    Ok(BlockOutcome {
        selected,
        still,
        frames,
    })
}
