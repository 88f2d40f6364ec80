//! JPEG encoding and image loading.

use std::io::Cursor;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use image::codecs::jpeg::JpegEncoder;
use image::{ImageReader, RgbImage};

use crate::frame::Frame;

pub const DEFAULT_JPEG_QUALITY: u8 = 80;

/// JPEG-encode a captured frame.
pub fn encode_jpeg(frame: &Frame, quality: u8) -> Result<Vec<u8>> {
    if frame.is_empty() {
        return Err(anyhow!("cannot encode an empty frame"));
    }
    let img = frame.to_rgb_image()?;
    encode_rgb_jpeg(&img, quality)
}

/// JPEG-encode a processed image.
pub fn encode_rgb_jpeg(img: &RgbImage, quality: u8) -> Result<Vec<u8>> {
    validate_quality(quality)?;
    let mut buf = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut buf, quality);
    img.write_with_encoder(encoder)
        .context("encode frame as JPEG")?;
    Ok(buf.into_inner())
}

/// Load an image file, inferring the format from its content.
pub fn load_image(path: &Path) -> Result<RgbImage> {
    let reader = ImageReader::open(path)
        .with_context(|| format!("open image file {}", path.display()))?
        .with_guessed_format()
        .with_context(|| format!("probe image format of {}", path.display()))?;
    let img = reader
        .decode()
        .with_context(|| format!("decode image file {}", path.display()))?;
    Ok(img.to_rgb8())
}

pub(crate) fn validate_quality(quality: u8) -> Result<()> {
    if !(1..=100).contains(&quality) {
        return Err(anyhow!("JPEG quality must be 1..=100, got {}", quality));
    }
    Ok(())
}
