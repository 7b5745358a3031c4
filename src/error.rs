use std::path::PathBuf;

use thiserror::Error;

/// Domain errors surfaced by the blocking pipeline.
///
/// Anything not listed here (unreadable image, model load failure, inference
/// failure) propagates through `anyhow` with context attached at the call
/// site and is fatal to the run.
#[derive(Debug, Error)]
pub enum BlockerError {
    #[error("invalid color spec '{spec}': {reason}")]
    InvalidColorSpec { spec: String, reason: String },

    #[error("face matching requires at least one reference image under {}", dir.display())]
    MissingReference { dir: PathBuf },

    #[error("object selector mixes numeric indices and class names; pick one")]
    MixedSelector,

    #[error("object index {index} is out of range: {count} objects detected")]
    IndexOutOfRange { index: usize, count: usize },

    #[error("detection shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("unknown detector backend '{0}'")]
    UnknownBackend(String),
}
