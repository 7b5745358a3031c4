//! person-blocker
//!
//! Block people (or any other COCO class) in images: run an instance
//! segmentation model, pick the objects the user asked for, and overwrite
//! their masks with animated flat-color noise.
//!
//! # Module Structure
//!
//! - `detect`: detector backend seam (`stub`, and `tract` behind the
//!   `backend-tract` feature) and the `DetectionResult` data model
//! - `face`: face-matcher seam for recognizing known faces
//! - `select`: selection criterion parsing and object selection
//! - `compose`: mask union, noisy color fields, compositing, animation
//! - `catalog`, `color`: the COCO class table and fill-color parsing
//! - `weights`, `output`, `annotate`: model fetching and file emission
//! - `config`, `pipeline`: run configuration and the straight-line pipeline

pub mod annotate;
pub mod catalog;
pub mod color;
pub mod compose;
pub mod config;
pub mod detect;
pub mod error;
pub mod face;
pub mod output;
pub mod pipeline;
pub mod select;
pub mod weights;

pub use color::{parse_color, Rgb};
pub use config::{BlockerConfig, OutputSettings};
pub use detect::{create_backend, DetectionResult, DetectorBackend, Roi, StubBackend};
#[cfg(feature = "backend-tract")]
pub use detect::TractBackend;
pub use error::BlockerError;
pub use face::{load_reference_encodings, FaceEncoding, FaceMatcher, StubFaceMatcher};
#[cfg(feature = "backend-tract")]
pub use face::TractFaceMatcher;
pub use pipeline::{block_image, BlockOutcome, BlockRequest};
pub use select::{select_by_face_boxes, select_objects, SelectionCriterion};
pub use weights::ensure_weights;
