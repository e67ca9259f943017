//! Preprocessing Pipeline
//!
//! Deterministic transform from uploaded bytes to the fixed-shape
//! feature vector the forest expects. Identical input bytes always
//! produce bit-identical vectors; the checksum ties a diagnosis back
//! to the exact upload for feedback correlation.

use image::imageops::FilterType;
use ndarray::Array1;
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Model input geometry. Uploads of any resolution are normalized to
/// this shape.
pub const INPUT_WIDTH: u32 = 64;
pub const INPUT_HEIGHT: u32 = 64;
pub const FEATURE_COUNT: usize = (INPUT_WIDTH * INPUT_HEIGHT) as usize;

/// Pixels are scaled from 8-bit luma into [0, 1].
const PIXEL_SCALE: f32 = 1.0 / 255.0;

#[derive(Debug, Error)]
pub enum PreprocessError {
    #[error("empty upload")]
    EmptyInput,

    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    #[error("image could not be decoded: {0}")]
    Decode(String),
}

/// Normalized upload, ready for inference.
#[derive(Debug)]
pub struct PreprocessedImage {
    /// Row-major 64x64 grayscale pixels in [0, 1].
    pub pixels: Array1<f32>,
    /// Lowercase hex SHA-256 of the original upload bytes.
    pub checksum: String,
}

/// Decode, grayscale, resize and scale an upload.
pub fn preprocess(bytes: &[u8]) -> Result<PreprocessedImage, PreprocessError> {
    if bytes.is_empty() {
        return Err(PreprocessError::EmptyInput);
    }

    let decoded = image::load_from_memory(bytes).map_err(|e| match e {
        image::ImageError::Unsupported(inner) => {
            PreprocessError::UnsupportedFormat(inner.to_string())
        }
        other => PreprocessError::Decode(other.to_string()),
    })?;

    // Bilinear resize on the 8-bit luma plane, the same transform the
    // training pipeline applies.
    let gray = decoded.to_luma8();
    let resized = image::imageops::resize(&gray, INPUT_WIDTH, INPUT_HEIGHT, FilterType::Triangle);

    let pixels = Array1::from_iter(
        resized
            .pixels()
            .map(|pixel| f32::from(pixel.0[0]) * PIXEL_SCALE),
    );

    let checksum = format!("{:x}", Sha256::digest(bytes));

    Ok(PreprocessedImage { pixels, checksum })
}
