#![cfg(feature = "backend-tract")]

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use image::imageops::FilterType;
use image::{GrayImage, RgbImage};
use ndarray::Array3;
use tract_onnx::prelude::*;

use crate::detect::backend::DetectorBackend;
use crate::detect::result::{DetectionResult, Roi};

/// Tract-based Mask R-CNN backend for ONNX inference.
///
/// Loads a local model file exported with a fixed input size; incoming images
/// are resized to that size for inference and boxes/masks are mapped back to
/// source coordinates. The model is expected to produce the standard
/// torchvision-style output quadruple: boxes `(n, 4)` as `x1,y1,x2,y2` in
/// input scale, class labels `(n)`, scores `(n)`, and mask logits
/// `(n, 1, mh, mw)`.
pub struct TractBackend {
    model: TypedSimplePlan<TypedModel>,
    input_width: u32,
    input_height: u32,
    score_threshold: f32,
}

/// Mask logits at or above this value count as object pixels.
const MASK_BINARIZE_THRESHOLD: f32 = 0.5;

impl TractBackend {
    pub fn new<P: AsRef<Path>>(model_path: P, input_width: u32, input_height: u32) -> Result<Self> {
        let model_path = model_path.as_ref();
        let model = tract_onnx::onnx()
            .model_for_path(model_path)
            .with_context(|| format!("failed to load ONNX model from {}", model_path.display()))?
            .with_input_fact(
                0,
                InferenceFact::dt_shape(
                    f32::datum_type(),
                    tvec!(1, 3, input_height as usize, input_width as usize),
                ),
            )
            .context("failed to set input fact")?
            .into_optimized()
            .context("failed to optimize ONNX model")?
            .into_runnable()
            .context("failed to build runnable ONNX model")?;

        Ok(Self {
            model,
            input_width,
            input_height,
            score_threshold: 0.7,
        })
    }

    /// Override the default confidence threshold.
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.score_threshold = threshold;
        self
    }

    fn build_input(&self, image: &RgbImage) -> Tensor {
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
        input.into_tensor()
    }

    fn extract(
        &self,
        outputs: TVec<TValue>,
        source_width: u32,
        source_height: u32,
    ) -> Result<DetectionResult> {
        let boxes = outputs
            .first()
            .ok_or_else(|| anyhow!("model produced no outputs"))?
            .to_array_view::<f32>()
            .context("boxes output was not f32")?
            .into_dimensionality::<tract_ndarray::Ix2>()
            .context("boxes output was not (n, 4)")?
            .to_owned();
        let labels = outputs
            .get(1)
            .ok_or_else(|| anyhow!("model produced no labels output"))?
            .to_array_view::<i64>()
            .context("labels output was not i64")?
            .into_dimensionality::<tract_ndarray::Ix1>()
            .context("labels output was not (n)")?
            .to_owned();
        let scores = outputs
            .get(2)
            .ok_or_else(|| anyhow!("model produced no scores output"))?
            .to_array_view::<f32>()
            .context("scores output was not f32")?
            .into_dimensionality::<tract_ndarray::Ix1>()
            .context("scores output was not (n)")?
            .to_owned();
        let mask_logits = outputs
            .get(3)
            .ok_or_else(|| anyhow!("model produced no masks output"))?
            .to_array_view::<f32>()
            .context("masks output was not f32")?
            .into_dimensionality::<tract_ndarray::Ix4>()
            .context("masks output was not (n, 1, mh, mw)")?
            .to_owned();

        let scale_x = source_width as f32 / self.input_width as f32;
        let scale_y = source_height as f32 / self.input_height as f32;

        let mut class_ids = Vec::new();
        let mut rois = Vec::new();
        let mut planes = Vec::new();

        for (index, score) in scores.iter().enumerate() {
            if *score < self.score_threshold {
                continue;
            }

            let x1 = (boxes[[index, 0]] * scale_x).clamp(0.0, source_width as f32) as u32;
            let y1 = (boxes[[index, 1]] * scale_y).clamp(0.0, source_height as f32) as u32;
            let x2 = (boxes[[index, 2]] * scale_x).clamp(0.0, source_width as f32) as u32;
            let y2 = (boxes[[index, 3]] * scale_y).clamp(0.0, source_height as f32) as u32;
            let roi = Roi::new(y1, x1, y2, x2);
            if roi.width() == 0 || roi.height() == 0 {
                continue;
            }

            class_ids.push(labels[index].max(0) as u32);
            planes.push(paste_mask(
                mask_logits.index_axis(tract_ndarray::Axis(0), index),
                &roi,
                source_width,
                source_height,
            ));
            rois.push(roi);
        }

        let mut masks = Array3::from_elem(
            (source_height as usize, source_width as usize, planes.len()),
            false,
        );
        for (object, plane) in planes.iter().enumerate() {
            for (y, row) in plane.iter().enumerate() {
                for (x, on) in row.iter().enumerate() {
                    if *on {
                        masks[[y, x, object]] = true;
                    }
                }
            }
        }

        Ok(DetectionResult::new(class_ids, rois, masks)?)
    }
}

/// Upsample one low-resolution mask into its roi at full image resolution.
fn paste_mask(
    logits: tract_ndarray::ArrayView3<'_, f32>,
    roi: &Roi,
    source_width: u32,
    source_height: u32,
) -> Vec<Vec<bool>> {
    let (_, mask_h, mask_w) = logits.dim();
    let mut low = GrayImage::new(mask_w as u32, mask_h as u32);
    for y in 0..mask_h {
        for x in 0..mask_w {
            let value = logits[[0, y, x]].clamp(0.0, 1.0);
            low.put_pixel(x as u32, y as u32, image::Luma([(value * 255.0) as u8]));
        }
    }
    let resized = image::imageops::resize(&low, roi.width(), roi.height(), FilterType::Triangle);

    let threshold = (MASK_BINARIZE_THRESHOLD * 255.0) as u8;
    let mut plane = vec![vec![false; source_width as usize]; source_height as usize];
    for (x, y, pixel) in resized.enumerate_pixels() {
        let px = roi.x1 + x;
        let py = roi.y1 + y;
        if px < source_width && py < source_height && pixel[0] >= threshold {
            plane[py as usize][px as usize] = true;
        }
    }
    plane
}

impl DetectorBackend for TractBackend {
    fn name(&self) -> &'static str {
        "tract"
    }

    fn detect(&mut self, image: &RgbImage) -> Result<DetectionResult> {
        let (source_width, source_height) = image.dimensions();
        let input = self.build_input(image);
        let outputs = self
            .model
            .run(tvec!(input.into()))
            .context("ONNX inference failed")?;
        self.extract(outputs, source_width, source_height)
    }

    fn warm_up(&mut self) -> Result<()> {
        let blank = RgbImage::new(self.input_width, self.input_height);
        self.detect(&blank).map(|_| ())
    }
}
