use std::io::Cursor;

use image::{imageops::FilterType, DynamicImage, GenericImageView, ImageFormat};

use super::error::{Error, Result};

/// Largest width or height a stored photo may have
pub const MAX_PHOTO_DIMENSION: u32 = 800;
pub const MAX_PHOTO_BYTES: usize = 5 * 1024 * 1024;

///
/// Decodes an uploaded image and re-encodes it as a JPEG, scaling it down
/// to fit within `MAX_PHOTO_DIMENSION` while keeping its aspect ratio
/// 
pub fn to_profile_jpeg(bytes: &[u8]) -> Result<Vec<u8>> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| Error::InvalidImage(e.to_string()))?;

    let (width, height) = img.dimensions();
    let img = if width > MAX_PHOTO_DIMENSION || height > MAX_PHOTO_DIMENSION {
        img.resize(MAX_PHOTO_DIMENSION, MAX_PHOTO_DIMENSION, FilterType::Triangle)
    } else {
        img
    };

    // JPEG has no alpha channel
    let mut jpeg = Cursor::new(vec![]);
    DynamicImage::ImageRgb8(img.to_rgb8())
        .write_to(&mut jpeg, ImageFormat::Jpeg)
        .map_err(|e| Error::InvalidImage(e.to_string()))?;

    Ok(jpeg.into_inner())
}
