//! Object selection.
//!
//! The CLI's selector tokens are sniffed exactly once, at the boundary, into
//! a tagged [`SelectionCriterion`]; everything downstream dispatches on the
//! variant. Selection itself is read-only over the detection result.

use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::catalog;
use crate::detect::{DetectionResult, Roi};
use crate::error::BlockerError;

/// What the user asked to block, decided once per run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SelectionCriterion {
    /// Block every detection whose class name is in the set.
    ClassNames(BTreeSet<String>),
    /// Block exactly these detection indices.
    Indices(BTreeSet<usize>),
    /// Block detections containing a face recognized from the reference set.
    FaceMatch { reference_dir: PathBuf },
}

impl SelectionCriterion {
    /// Classify CLI tokens: all-numeric means indices, all-names means class
    /// names, and a mix is rejected outright.
    pub fn from_tokens(tokens: &[String]) -> Result<Self, BlockerError> {
        let parsed: Vec<Option<usize>> = tokens
            .iter()
            .map(|token| token.trim().parse::<usize>().ok())
            .collect();

        if parsed.iter().all(Option::is_some) && !parsed.is_empty() {
            return Ok(Self::Indices(parsed.into_iter().flatten().collect()));
        }
        if parsed.iter().any(Option::is_some) {
            return Err(BlockerError::MixedSelector);
        }
        Ok(Self::ClassNames(
            tokens.iter().map(|token| token.trim().to_string()).collect(),
        ))
    }
}

/// Resolve a name/index criterion to detection indices, ascending.
///
/// Class names that are not in the catalog contribute zero matches (warned,
/// not fatal). Explicit indices are validated against the detection count.
/// Face-match criteria are resolved by the pipeline via
/// [`select_by_face_boxes`] once the matcher has produced its boxes.
pub fn select_objects(
    criterion: &SelectionCriterion,
    detection: &DetectionResult,
) -> Result<Vec<usize>, BlockerError> {
    match criterion {
        SelectionCriterion::Indices(indices) => {
            for &index in indices {
                if index >= detection.object_count() {
                    return Err(BlockerError::IndexOutOfRange {
                        index,
                        count: detection.object_count(),
                    });
                }
            }
            Ok(indices.iter().copied().collect())
        }
        SelectionCriterion::ClassNames(names) => {
            let mut wanted_ids = BTreeSet::new();
            for name in names {
                match catalog::class_id(name) {
                    Some(id) => {
                        wanted_ids.insert(id);
                    }
                    None => log::warn!("'{name}' is not a known class name; ignoring"),
                }
            }
            Ok(detection
                .class_ids()
                .iter()
                .enumerate()
                .filter(|(_, class_id)| wanted_ids.contains(class_id))
                .map(|(index, _)| index)
                .collect())
        }
        SelectionCriterion::FaceMatch { .. } => Ok(Vec::new()),
    }
}

/// Detection indices whose roi fully contains at least one known-face box.
///
/// Containment, not overlap: a face straddling the roi edge does not select
/// the object.
pub fn select_by_face_boxes(detection: &DetectionResult, face_boxes: &[Roi]) -> Vec<usize> {
    detection
        .rois()
        .iter()
        .enumerate()
        .filter(|(_, roi)| face_boxes.iter().any(|face| roi.contains(face)))
        .map(|(index, _)| index)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    fn detection(class_ids: Vec<u32>) -> DetectionResult {
        let count = class_ids.len();
        let rois = (0..count)
            .map(|i| Roi::new(0, 10 * i as u32, 10, 10 * i as u32 + 10))
            .collect();
        let masks = Array3::from_elem((10, 10 * count.max(1), count), false);
        DetectionResult::new(class_ids, rois, masks).unwrap()
    }

    #[test]
    fn all_numeric_tokens_become_indices() {
        let criterion =
            SelectionCriterion::from_tokens(&["1".to_string(), "2".to_string()]).unwrap();
        assert_eq!(
            criterion,
            SelectionCriterion::Indices([1, 2].into_iter().collect())
        );
    }

    #[test]
    fn name_tokens_become_class_names() {
        let criterion =
            SelectionCriterion::from_tokens(&["person".to_string(), "car".to_string()]).unwrap();
        assert!(matches!(criterion, SelectionCriterion::ClassNames(_)));
    }

    #[test]
    fn mixed_tokens_are_rejected() {
        let err =
            SelectionCriterion::from_tokens(&["person".to_string(), "2".to_string()]).unwrap_err();
        assert!(matches!(err, BlockerError::MixedSelector));
    }

    #[test]
    fn class_name_selection_picks_every_instance() {
        // Two persons (0 and 2) and one car (1).
        let det = detection(vec![1, 3, 1]);
        let criterion =
            SelectionCriterion::ClassNames(["person".to_string()].into_iter().collect());
        assert_eq!(select_objects(&criterion, &det).unwrap(), vec![0, 2]);
    }

    #[test]
    fn index_selection_ignores_class() {
        let det = detection(vec![1, 3, 1]);
        let criterion = SelectionCriterion::Indices([1].into_iter().collect());
        assert_eq!(select_objects(&criterion, &det).unwrap(), vec![1]);
    }

    #[test]
    fn unknown_class_names_match_nothing() {
        let det = detection(vec![1, 3]);
        let criterion =
            SelectionCriterion::ClassNames(["unicorn".to_string()].into_iter().collect());
        assert!(select_objects(&criterion, &det).unwrap().is_empty());
    }

    #[test]
    fn out_of_range_index_is_an_error() {
        let det = detection(vec![1]);
        let criterion = SelectionCriterion::Indices([5].into_iter().collect());
        assert!(matches!(
            select_objects(&criterion, &det),
            Err(BlockerError::IndexOutOfRange { index: 5, count: 1 })
        ));
    }

    #[test]
    fn face_selection_requires_containment() {
        let det = detection(vec![1, 1]);
        // Object 0 roi is (0,0)-(10,10); a face inside it selects only it.
        let selected = select_by_face_boxes(&det, &[Roi::new(2, 2, 8, 8)]);
        assert_eq!(selected, vec![0]);
        // A face overlapping but not contained selects nothing.
        let selected = select_by_face_boxes(&det, &[Roi::new(5, 5, 15, 15)]);
        assert!(selected.is_empty());
    }
}
