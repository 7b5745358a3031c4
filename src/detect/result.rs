use ndarray::Array3;
use serde::Serialize;

use crate::error::BlockerError;

/// Axis-aligned box in image pixel coordinates, `(y1, x1)` inclusive top-left
/// to `(y2, x2)` exclusive bottom-right.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Roi {
    pub y1: u32,
    pub x1: u32,
    pub y2: u32,
    pub x2: u32,
}

impl Roi {
    pub fn new(y1: u32, x1: u32, y2: u32, x2: u32) -> Self {
        Self { y1, x1, y2, x2 }
    }

    pub fn width(&self) -> u32 {
        self.x2.saturating_sub(self.x1)
    }

    pub fn height(&self) -> u32 {
        self.y2.saturating_sub(self.y1)
    }

    /// True when `other` lies fully inside this box on both axes.
    pub fn contains(&self, other: &Roi) -> bool {
        other.y1 >= self.y1 && other.y2 <= self.y2 && other.x1 >= self.x1 && other.x2 <= self.x2
    }
}

/// Output of one detector invocation over one image.
///
/// Index `i` is the same object across all three fields; the order is the
/// detector's and stays stable for the lifetime of the result.
#[derive(Clone, Debug)]
pub struct DetectionResult {
    class_ids: Vec<u32>,
    rois: Vec<Roi>,
    /// Per-pixel membership, shape `(height, width, num_objects)`.
    masks: Array3<bool>,
}

impl DetectionResult {
    /// Build a result, enforcing that the three fields describe the same
    /// number of objects.
    pub fn new(
        class_ids: Vec<u32>,
        rois: Vec<Roi>,
        masks: Array3<bool>,
    ) -> Result<Self, BlockerError> {
        let objects = masks.dim().2;
        if class_ids.len() != objects || rois.len() != objects {
            return Err(BlockerError::ShapeMismatch(format!(
                "{} class ids, {} rois, {} mask planes",
                class_ids.len(),
                rois.len(),
                objects
            )));
        }
        Ok(Self {
            class_ids,
            rois,
            masks,
        })
    }

    /// An empty result sized to the image, for detectors that found nothing.
    pub fn empty(height: u32, width: u32) -> Self {
        Self {
            class_ids: Vec::new(),
            rois: Vec::new(),
            masks: Array3::from_elem((height as usize, width as usize, 0), false),
        }
    }

    pub fn object_count(&self) -> usize {
        self.class_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.class_ids.is_empty()
    }

    pub fn class_ids(&self) -> &[u32] {
        &self.class_ids
    }

    pub fn rois(&self) -> &[Roi] {
        &self.rois
    }

    pub fn masks(&self) -> &Array3<bool> {
        &self.masks
    }

    /// `(height, width)` of the image the masks were computed over.
    pub fn mask_dims(&self) -> (usize, usize) {
        let (h, w, _) = self.masks.dim();
        (h, w)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    #[test]
    fn constructor_enforces_matching_lengths() {
        let masks = Array3::from_elem((4, 4, 2), false);
        let err = DetectionResult::new(vec![1], vec![Roi::new(0, 0, 2, 2)], masks);
        assert!(matches!(err, Err(BlockerError::ShapeMismatch(_))));
    }

    #[test]
    fn containment_is_symmetric_on_both_axes() {
        let outer = Roi::new(10, 10, 50, 50);
        assert!(outer.contains(&Roi::new(20, 20, 30, 30)));
        // Fits in x but pokes out in y.
        assert!(!outer.contains(&Roi::new(5, 20, 30, 30)));
        // Fits in y but pokes out in x.
        assert!(!outer.contains(&Roi::new(20, 5, 30, 30)));
        // Mere overlap is not containment.
        assert!(!outer.contains(&Roi::new(40, 40, 60, 60)));
    }

    #[test]
    fn empty_result_keeps_image_dims() {
        let det = DetectionResult::empty(480, 640);
        assert!(det.is_empty());
        assert_eq!(det.mask_dims(), (480, 640));
    }
}
