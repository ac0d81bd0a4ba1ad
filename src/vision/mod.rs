//! Color-histogram feature extraction.
//!
//! Maps a decoded image of any resolution to a fixed-length descriptor:
//! the image is resized to a 64×64 canvas, a joint 3-D histogram over the
//! RGB channels is computed with 8 bins per channel, flattened in a fixed
//! bin order, and L2-normalized. The descriptor is resolution-independent
//! and identical for identical input bytes.
//!
//! # Example
//!
//! ```
//! use clasificar::vision;
//! use image::{DynamicImage, Rgb, RgbImage};
//!
//! let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(32, 32, Rgb([255, 0, 0])));
//! let features = vision::extract(&img).expect("valid image");
//! assert_eq!(features.len(), vision::FEATURE_LEN);
//! assert!(features.iter().all(|&v| v >= 0.0));
//! ```

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use tracing::debug;

use crate::error::{ClasificarError, Result};

/// Side length of the fixed canvas every image is resized to.
pub const CANVAS_SIZE: u32 = 64;

/// Histogram bins per color channel.
pub const BINS_PER_CHANNEL: usize = 8;

/// Length of the extracted feature vector (8 × 8 × 8 joint bins).
pub const FEATURE_LEN: usize = BINS_PER_CHANNEL * BINS_PER_CHANNEL * BINS_PER_CHANNEL;

// 256 / 8 = 32 values per bin; a shift by 5 quantizes a channel byte.
const BIN_SHIFT: usize = 5;

/// Decodes an image payload and extracts its feature vector.
///
/// This is the single entry point shared by training and inference, so
/// both sides agree on feature semantics by construction.
///
/// # Errors
///
/// Returns [`ClasificarError::FeatureExtraction`] if the payload is empty
/// or cannot be decoded as an image.
pub fn extract_from_bytes(payload: &[u8]) -> Result<Vec<f32>> {
    if payload.is_empty() {
        return Err(ClasificarError::extraction("empty image payload"));
    }
    let decoded = image::load_from_memory(payload)
        .map_err(|e| ClasificarError::extraction(format!("image decode failed: {e}")))?;
    extract(&decoded)
}

/// Extracts the 512-bin joint color histogram from a decoded image.
///
/// The bin order is fixed: `idx = r_bin * 64 + g_bin * 8 + b_bin`.
///
/// # Errors
///
/// Returns [`ClasificarError::FeatureExtraction`] if the image has a zero
/// dimension.
pub fn extract(image: &DynamicImage) -> Result<Vec<f32>> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(ClasificarError::extraction(format!(
            "image has degenerate dimensions {width}x{height}"
        )));
    }

    let canvas = image
        .resize_exact(CANVAS_SIZE, CANVAS_SIZE, FilterType::Triangle)
        .to_rgb8();

    let mut hist = vec![0.0f32; FEATURE_LEN];
    for pixel in canvas.pixels() {
        let [r, g, b] = pixel.0;
        let idx = ((r as usize) >> BIN_SHIFT) * BINS_PER_CHANNEL * BINS_PER_CHANNEL
            + ((g as usize) >> BIN_SHIFT) * BINS_PER_CHANNEL
            + ((b as usize) >> BIN_SHIFT);
        hist[idx] += 1.0;
    }

    l2_normalize(&mut hist);
    debug!(width, height, "extracted color histogram");
    Ok(hist)
}

/// Rescales the vector to unit Euclidean norm.
///
/// A histogram over a non-empty canvas always has positive mass, so the
/// zero-norm guard exists only to keep the function total.
fn l2_normalize(values: &mut [f32]) {
    let norm = values.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
        for v in values.iter_mut() {
            *v /= norm;
        }
    }
}
