//! Mask compositing and animation.
//!
//! The compositor unions the selected objects' masks into an occupancy
//! raster, draws a noisy color field, and overwrites occupied pixels in a
//! copy of the source image. The animator repeats that with a fresh noise
//! draw per frame; the "static" effect of the GIF is exactly those
//! independent draws.

use image::RgbImage;
use ndarray::{Array2, Axis, Zip};
use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::color::Rgb;
use crate::detect::DetectionResult;

/// Standard deviation of the per-pixel brightness noise.
const NOISE_SIGMA: f32 = 25.0;

/// Count, per pixel, how many of the selected objects cover it.
///
/// A pixel is blocked when the count is greater than zero. The count (rather
/// than an equality test against 1) makes duplicate indices and overlapping
/// masks harmless; an exact-equality threshold would silently unblock pixels
/// covered by two selected objects at once.
pub fn union_masks(detection: &DetectionResult, indices: &[usize]) -> Array2<u32> {
    let (height, width) = detection.mask_dims();
    let mut occupancy = Array2::<u32>::zeros((height, width));
    for &index in indices {
        let mask = detection.masks().index_axis(Axis(2), index);
        Zip::from(&mut occupancy).and(&mask).for_each(|count, &on| {
            if on {
                *count += 1;
            }
        });
    }
    occupancy
}

/// A full-size color field: the fill color plus Gaussian noise, clamped to
/// the valid channel range.
///
/// The same scalar sample is added to all three channels of a pixel, so the
/// noise perturbs brightness without shifting hue. Every call draws fresh
/// samples.
pub fn noisy_color_field<R: Rng + ?Sized>(
    width: u32,
    height: u32,
    color: Rgb,
    rng: &mut R,
) -> RgbImage {
    let normal = Normal::new(0.0f32, NOISE_SIGMA).expect("sigma is positive and finite");
    let mut field = RgbImage::new(width, height);
    for pixel in field.pixels_mut() {
        let delta = normal.sample(rng);
        for (channel, base) in pixel.0.iter_mut().zip(color) {
            *channel = (base as f32 + delta).clamp(0.0, 255.0) as u8;
        }
    }
    field
}

/// Overwrite every occupied pixel of a copy of `image` from a fresh noise
/// field. The source buffer is never mutated.
pub fn composite_occupied<R: Rng + ?Sized>(
    image: &RgbImage,
    occupancy: &Array2<u32>,
    color: Rgb,
    rng: &mut R,
) -> RgbImage {
    let (width, height) = image.dimensions();
    let field = noisy_color_field(width, height, color, rng);
    let mut output = image.clone();
    for (x, y, pixel) in output.enumerate_pixels_mut() {
        if occupancy[[y as usize, x as usize]] > 0 {
            *pixel = *field.get_pixel(x, y);
        }
    }
    output
}

/// Union the selected objects' masks and composite a single frame.
pub fn composite<R: Rng + ?Sized>(
    image: &RgbImage,
    indices: &[usize],
    detection: &DetectionResult,
    color: Rgb,
    rng: &mut R,
) -> RgbImage {
    let occupancy = union_masks(detection, indices);
    composite_occupied(image, &occupancy, color, rng)
}

/// Produce `frame_count` independent frames, each with its own noise draw.
///
/// Frame 0 doubles as the standalone still output. Playback is encoded at a
/// fixed rate by the GIF writer; a `frame_count` that divides the playback
/// convention evenly is the caller's responsibility.
pub fn animate<R: Rng + ?Sized>(
    image: &RgbImage,
    indices: &[usize],
    detection: &DetectionResult,
    color: Rgb,
    frame_count: usize,
    rng: &mut R,
) -> Vec<RgbImage> {
    let occupancy = union_masks(detection, indices);
    (0..frame_count)
        .map(|_| composite_occupied(image, &occupancy, color, rng))
        .collect()
}
