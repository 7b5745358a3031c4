//! person_blocker - block objects in an image with animated noise.
//!
//! One invocation:
//! 1. Loads the source image and (if needed) the model weights
//! 2. Runs instance segmentation
//! 3. Resolves the user's selection (class names, indices, or known faces)
//! 4. Overwrites the selected masks with noisy color and writes a PNG + GIF

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use person_blocker::config::KNOWN_BACKENDS;
use person_blocker::face::{FaceMatcher, StubFaceMatcher};
use person_blocker::{
    annotate, catalog, create_backend, ensure_weights, output, parse_color, pipeline,
    BlockRequest, BlockerConfig, SelectionCriterion,
};

#[derive(Parser, Debug)]
#[command(
    name = "person_blocker",
    about = "Automatically \"block\" people in images using a neural network"
)]
struct Args {
    /// Image file to process
    #[arg(short, long, required_unless_present = "names")]
    image: Option<PathBuf>,

    /// Path to the segmentation model weights (downloaded if configured)
    #[arg(short, long)]
    model: Option<PathBuf>,

    /// Objects to block: class names or detection indices
    #[arg(short, long, num_args = 1.., default_values_t = vec![String::from("person")])]
    objects: Vec<String>,

    /// Color of the block, as '#rrggbb' or '(r, g, b)'
    #[arg(short, long, default_value = "(255, 255, 255)")]
    color: String,

    /// Write a labeled preview instead of blocking
    #[arg(short, long)]
    labeled: bool,

    /// Print the class catalog and exit
    #[arg(short, long)]
    names: bool,

    /// Select objects by recognized faces from this reference-image directory
    #[arg(short, long, value_name = "DIR")]
    faces: Option<PathBuf>,

    /// Number of GIF frames
    #[arg(long)]
    frames: Option<usize>,

    /// Detector backend
    #[arg(long, value_parser = KNOWN_BACKENDS)]
    backend: Option<String>,

    /// Write detections as JSON to this path
    #[arg(long, value_name = "PATH")]
    dump_detections: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    if args.names {
        print!("{}", catalog::listing());
        return Ok(());
    }

    let mut cfg = BlockerConfig::load()?;
    if let Some(model) = args.model.clone() {
        cfg.model_path = model;
    }
    if let Some(backend) = args.backend.clone() {
        cfg.backend = backend;
    }
    if let Some(frames) = args.frames {
        cfg.output.frames = frames;
    }

    let color = parse_color(&args.color)?;
    let criterion = match &args.faces {
        Some(dir) => SelectionCriterion::FaceMatch {
            reference_dir: dir.clone(),
        },
        None => SelectionCriterion::from_tokens(&args.objects)?,
    };

    let image_path = args.image.as_ref().context("--image is required")?;
    let image = image::open(image_path)
        .with_context(|| format!("failed to read image {}", image_path.display()))?
        .to_rgb8();
    log::info!(
        "loaded {} ({}x{})",
        image_path.display(),
        image.width(),
        image.height()
    );

    if cfg.backend != "stub" {
        ensure_weights(&cfg.model_path, cfg.weights_url.as_deref())?;
    }
    let mut backend = create_backend(&cfg.backend, &cfg.model_path, cfg.model_input)?;
    log::info!("running detection with the '{}' backend", backend.name());
    backend.warm_up()?;
    let detection = backend.detect(&image)?;
    log::info!("detected {} object(s)", detection.object_count());

    if let Some(path) = &args.dump_detections {
        output::dump_detections(&detection, path)?;
    }

    if args.labeled {
        let preview = annotate::annotate(&image, &detection);
        print!("{}", annotate::listing(&detection));
        output::write_still(&preview, &cfg.output.still)?;
        return Ok(());
    }

    let request = BlockRequest {
        criterion,
        color,
        frame_count: cfg.output.frames,
    };
    let mut matcher: Option<Box<dyn FaceMatcher>> = match &request.criterion {
        SelectionCriterion::FaceMatch { .. } => Some(face_matcher(&cfg)?),
        _ => None,
    };
    let outcome = pipeline::block_image(
        &image,
        &detection,
        &request,
        matcher.as_deref_mut(),
        &mut rand::thread_rng(),
    )?;

    output::write_still(&outcome.still, &cfg.output.still)?;
    if outcome.is_pass_through() {
        log::info!("nothing to animate; skipping {}", cfg.output.gif.display());
        return Ok(());
    }
    output::write_gif(&outcome.frames, &cfg.output.gif)?;
    Ok(())
}

/// The face matcher paired with the configured detector backend.
fn face_matcher(cfg: &BlockerConfig) -> Result<Box<dyn FaceMatcher>> {
    #[cfg(feature = "backend-tract")]
    if cfg.backend == "tract" {
        let path = cfg.face_model_path.as_ref().ok_or_else(|| {
            anyhow::anyhow!("face matching with the tract backend requires face_model_path")
        })?;
        let (width, height) = cfg.model_input;
        let matcher = person_blocker::TractFaceMatcher::new(path, width, height)?;
        return Ok(Box::new(matcher));
    }
    #[cfg(not(feature = "backend-tract"))]
    let _ = cfg;
    Ok(Box::new(StubFaceMatcher::new()))
}
