mod backend;
mod backends;
mod result;

pub use backend::DetectorBackend;
pub use backends::StubBackend;
#[cfg(feature = "backend-tract")]
pub use backends::TractBackend;
pub use result::{DetectionResult, Roi};

use std::path::Path;

use anyhow::Result;

use crate::error::BlockerError;

/// Construct the detector backend selected by name.
///
/// `stub` needs no model file. `tract` loads the ONNX weights at `model_path`
/// and is only available when the crate is built with the `backend-tract`
/// feature.
pub fn create_backend(
    name: &str,
    model_path: &Path,
    input_size: (u32, u32),
) -> Result<Box<dyn DetectorBackend>> {
    match name {
        "stub" => Ok(Box::new(StubBackend::new())),
        #[cfg(feature = "backend-tract")]
        "tract" => {
            let (width, height) = input_size;
            Ok(Box::new(TractBackend::new(model_path, width, height)?))
        }
        #[cfg(not(feature = "backend-tract"))]
        "tract" => {
            let _ = (model_path, input_size);
            Err(anyhow::anyhow!(
                "backend 'tract' requires building with the backend-tract feature"
            ))
        }
        other => Err(BlockerError::UnknownBackend(other.to_string()).into()),
    }
}
