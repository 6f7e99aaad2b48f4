//! Raster-image handling.
//!
//! No OCR: the image is decoded only far enough to report its pixel
//! dimensions, and the pipeline carries a placeholder naming the file.

use image::GenericImageView;

use crate::core::errors::ExtractError;

pub fn describe(name: &str, bytes: &[u8]) -> Result<String, ExtractError> {
    let img = image::load_from_memory(bytes).map_err(|e| ExtractError::Decode(e.to_string()))?;
    let (width, height) = img.dimensions();
    Ok(format!("[image {}: {}x{} pixels]", name, width, height))
}
