#![cfg(feature = "backend-tract")]

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use image::imageops::FilterType;
use image::RgbImage;
use tract_onnx::prelude::*;

use crate::detect::Roi;
use crate::face::{FaceEncoding, FaceMatcher};

/// Tract-based face matcher.
///
/// Expects an ONNX face pipeline with two outputs: face boxes `(n, 4)` as
/// `x1,y1,x2,y2` in input scale, and per-face embeddings `(n, d)`. A face is
/// "known" when its best cosine similarity against the reference encodings
/// reaches the threshold.
pub struct TractFaceMatcher {
    model: TypedSimplePlan<TypedModel>,
    input_width: u32,
    input_height: u32,
    match_threshold: f32,
}

impl TractFaceMatcher {
    pub fn new<P: AsRef<Path>>(model_path: P, input_width: u32, input_height: u32) -> Result<Self> {
        let model_path = model_path.as_ref();
        let model = tract_onnx::onnx()
            .model_for_path(model_path)
            .with_context(|| {
                format!("failed to load face model from {}", model_path.display())
            })?
            .with_input_fact(
                0,
                InferenceFact::dt_shape(
                    f32::datum_type(),
                    tvec!(1, 3, input_height as usize, input_width as usize),
                ),
            )
            .context("failed to set face model input fact")?
            .into_optimized()
            .context("failed to optimize face model")?
            .into_runnable()
            .context("failed to build runnable face model")?;

        Ok(Self {
            model,
            input_width,
            input_height,
            match_threshold: 0.6,
        })
    }

    /// Override the default cosine-similarity threshold.
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.match_threshold = threshold;
        self
    }

    fn run_faces(&mut self, image: &RgbImage) -> Result<Vec<(Roi, FaceEncoding)>> {
        let (source_width, source_height) = image.dimensions();
        let resized = image::imageops::resize(
            image,
            self.input_width,
            self.input_height,
            FilterType::Triangle,
        );
        let width = self.input_width as usize;
        let input = tract_ndarray::Array4::from_shape_fn(
            (1, 3, self.input_height as usize, width),
            |(_, channel, y, x)| resized.get_pixel(x as u32, y as u32)[channel] as f32 / 255.0,
        );

        let outputs = self
            .model
            .run(tvec!(input.into_tensor().into()))
            .context("face inference failed")?;

        let boxes = outputs
            .first()
            .ok_or_else(|| anyhow!("face model produced no outputs"))?
            .to_array_view::<f32>()
            .context("face boxes output was not f32")?
            .into_dimensionality::<tract_ndarray::Ix2>()
            .context("face boxes output was not (n, 4)")?
            .to_owned();
        let embeddings = outputs
            .get(1)
            .ok_or_else(|| anyhow!("face model produced no embeddings output"))?
            .to_array_view::<f32>()
            .context("face embeddings output was not f32")?
            .into_dimensionality::<tract_ndarray::Ix2>()
            .context("face embeddings output was not (n, d)")?
            .to_owned();

        let scale_x = source_width as f32 / self.input_width as f32;
        let scale_y = source_height as f32 / self.input_height as f32;

        let mut faces = Vec::new();
        for (index, embedding) in embeddings.outer_iter().enumerate() {
            let x1 = (boxes[[index, 0]] * scale_x).clamp(0.0, source_width as f32) as u32;
            let y1 = (boxes[[index, 1]] * scale_y).clamp(0.0, source_height as f32) as u32;
            let x2 = (boxes[[index, 2]] * scale_x).clamp(0.0, source_width as f32) as u32;
            let y2 = (boxes[[index, 3]] * scale_y).clamp(0.0, source_height as f32) as u32;
            let roi = Roi::new(y1, x1, y2, x2);
            if roi.width() == 0 || roi.height() == 0 {
                continue;
            }
            faces.push((roi, FaceEncoding(embedding.to_vec())));
        }
        Ok(faces)
    }
}

impl FaceMatcher for TractFaceMatcher {
    fn name(&self) -> &'static str {
        "tract"
    }

    fn encode(&mut self, image: &RgbImage) -> Result<Option<FaceEncoding>> {
        let mut faces = self.run_faces(image)?;
        // Largest face wins when a reference photo contains several.
        faces.sort_by_key(|(roi, _)| std::cmp::Reverse(roi.width() * roi.height()));
        Ok(faces.into_iter().next().map(|(_, encoding)| encoding))
    }

    fn locate_and_match(&mut self, image: &RgbImage, known: &[FaceEncoding]) -> Result<Vec<Roi>> {
        let faces = self.run_faces(image)?;
        let mut matched = Vec::new();
        for (roi, encoding) in faces {
            let best = known
                .iter()
                .map(|reference| reference.similarity(&encoding))
                .fold(f32::NEG_INFINITY, f32::max);
            if best >= self.match_threshold {
                matched.push(roi);
            }
        }
        Ok(matched)
    }
}
