//! Recipe photos
//!
//! Uploaded images are downscaled and re-encoded as JPEG before being stored
//! on the recipe as an opaque blob.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageError};
use thiserror::Error;

/// Longest side of a stored photo, in pixels
pub const MAX_SIDE: u32 = 800;

/// JPEG quality of a stored photo
pub const JPEG_QUALITY: u8 = 80;

#[derive(Debug, Error)]
pub enum PhotoError {
    #[error("Unsupported image format")]
    UnsupportedFormat,

    #[error("Could not decode image: {0}")]
    Decode(String),

    #[error("Could not encode image: {0}")]
    Encode(String),
}

/// Target size for a `width` x `height` image: longest side at most [`MAX_SIDE`]
pub fn fitted_dimensions(width: u32, height: u32) -> (u32, u32) {
    let longest = width.max(height);
    if longest <= MAX_SIDE {
        return (width, height);
    }
    let scale = MAX_SIDE as f64 / longest as f64;
    let w = ((width as f64 * scale).round() as u32).max(1);
    let h = ((height as f64 * scale).round() as u32).max(1);
    (w, h)
}

/// Decode, downscale and re-encode an uploaded photo as JPEG
pub fn prepare_recipe_photo(bytes: &[u8]) -> Result<Vec<u8>, PhotoError> {
    let format = image::guess_format(bytes).map_err(|_| PhotoError::UnsupportedFormat)?;

    let img = image::load_from_memory_with_format(bytes, format).map_err(|e| match e {
        ImageError::Unsupported(_) => PhotoError::UnsupportedFormat,
        other => PhotoError::Decode(other.to_string()),
    })?;

    let (width, height) = img.dimensions();
    let (w, h) = fitted_dimensions(width, height);
    let img = if (w, h) == (width, height) {
        img
    } else {
        img.resize_exact(w, h, FilterType::Triangle)
    };

    // JPEG has no alpha channel
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());

    let mut out = Vec::new();
    let encoder = JpegEncoder::new_with_quality(Cursor::new(&mut out), JPEG_QUALITY);
    rgb.write_with_encoder(encoder)
        .map_err(|e| PhotoError::Encode(e.to_string()))?;

    tracing::debug!(width, height, w, h, size = out.len(), "recipe photo prepared");
    Ok(out)
}
