use image::RgbImage;
use ndarray::Array3;
use rand::rngs::StdRng;
use rand::SeedableRng;

use person_blocker::{
    block_image, compose, output, BlockRequest, DetectionResult, DetectorBackend, Roi,
    SelectionCriterion, StubBackend,
};

/// A 20x20 scene with two persons (objects 0 and 2) and one car (object 1).
fn street_scene() -> DetectionResult {
    let mut masks = Array3::from_elem((20, 20, 3), false);
    let rois = vec![
        Roi::new(0, 0, 8, 8),
        Roi::new(0, 10, 8, 18),
        Roi::new(10, 0, 18, 8),
    ];
    for (object, roi) in rois.iter().enumerate() {
        for y in roi.y1..roi.y2 {
            for x in roi.x1..roi.x2 {
                masks[[y as usize, x as usize, object]] = true;
            }
        }
    }
    DetectionResult::new(vec![1, 3, 1], rois, masks).unwrap()
}

fn request(criterion: SelectionCriterion, frame_count: usize) -> BlockRequest {
    BlockRequest {
        criterion,
        color: [255, 255, 255],
        frame_count,
    }
}

#[test]
fn blocking_persons_covers_both_person_masks_and_spares_the_car() {
    let image = RgbImage::from_pixel(20, 20, image::Rgb([0, 0, 0]));
    let detection = street_scene();
    let criterion = SelectionCriterion::from_tokens(&["person".to_string()]).unwrap();
    let mut rng = StdRng::seed_from_u64(42);

    let outcome = block_image(&image, &detection, &request(criterion, 4), None, &mut rng).unwrap();
    assert_eq!(outcome.selected, vec![0, 2]);

    let occupancy = compose::union_masks(&detection, &outcome.selected);
    for frame in &outcome.frames {
        for (x, y, pixel) in frame.enumerate_pixels() {
            let source = image.get_pixel(x, y);
            if occupancy[[y as usize, x as usize]] > 0 {
                // White fill with sigma-25 noise cannot land on pure black.
                assert_ne!(pixel, source, "masked pixel ({x},{y}) left untouched");
            } else {
                assert_eq!(pixel, source, "unmasked pixel ({x},{y}) was modified");
            }
        }
    }
    // The car mask is entirely unmasked territory.
    assert_eq!(occupancy[[4, 14]], 0);
}

#[test]
fn full_run_through_stub_backend_writes_png_and_gif() {
    let dir = tempfile::tempdir().unwrap();
    let image = RgbImage::from_pixel(64, 48, image::Rgb([30, 90, 150]));

    let mut backend = StubBackend::new();
    let detection = backend.detect(&image).unwrap();
    assert!(!detection.is_empty());

    let criterion = SelectionCriterion::from_tokens(&["person".to_string()]).unwrap();
    let mut rng = StdRng::seed_from_u64(1);
    let outcome = block_image(&image, &detection, &request(criterion, 10), None, &mut rng).unwrap();
    assert_eq!(outcome.frames.len(), 10);

    let still_path = dir.path().join("blocked.png");
    let gif_path = dir.path().join("blocked.gif");
    output::write_still(&outcome.still, &still_path).unwrap();
    output::write_gif(&outcome.frames, &gif_path).unwrap();

    let reloaded = image::open(&still_path).unwrap().to_rgb8();
    assert_eq!(reloaded, outcome.still);
    assert_eq!(&std::fs::read(&gif_path).unwrap()[..6], b"GIF89a");
}

#[test]
fn zero_match_selection_reproduces_the_source_exactly() {
    let image = RgbImage::from_pixel(20, 20, image::Rgb([12, 34, 56]));
    let detection = street_scene();
    // "giraffe" is a valid class with no instances in the scene.
    let criterion = SelectionCriterion::from_tokens(&["giraffe".to_string()]).unwrap();
    let mut rng = StdRng::seed_from_u64(9);

    let outcome = block_image(&image, &detection, &request(criterion, 10), None, &mut rng).unwrap();
    assert!(outcome.is_pass_through());
    assert_eq!(outcome.still, image);
    assert!(outcome.frames.is_empty());
}

#[test]
fn index_selection_blocks_exactly_the_requested_object() {
    let image = RgbImage::from_pixel(20, 20, image::Rgb([0, 0, 0]));
    let detection = street_scene();
    let criterion = SelectionCriterion::from_tokens(&["1".to_string()]).unwrap();
    let mut rng = StdRng::seed_from_u64(3);

    let outcome = block_image(&image, &detection, &request(criterion, 2), None, &mut rng).unwrap();
    assert_eq!(outcome.selected, vec![1]);

    // Inside the car roi: blocked. Inside person 0's roi: untouched.
    assert_ne!(outcome.still.get_pixel(14, 4), image.get_pixel(14, 4));
    assert_eq!(outcome.still.get_pixel(4, 4), image.get_pixel(4, 4));
}

#[test]
fn frames_use_independent_noise_draws() {
    let image = RgbImage::from_pixel(20, 20, image::Rgb([0, 0, 0]));
    let detection = street_scene();
    let criterion = SelectionCriterion::from_tokens(&["person".to_string(), "car".to_string()])
        .unwrap();
    let mut rng = StdRng::seed_from_u64(8);

    let outcome = block_image(&image, &detection, &request(criterion, 6), None, &mut rng).unwrap();
    for a in 0..outcome.frames.len() {
        for b in (a + 1)..outcome.frames.len() {
            assert_ne!(outcome.frames[a], outcome.frames[b]);
        }
    }
}
