//! Frame container shared by capture sources and the processing stages.
//!
//! A `Frame` is one RGB24 buffer produced by a single read from a capture
//! source. Sources stamp each frame with a monotonic sequence number so
//! downstream sinks (the preview slot in particular) can tell a fresh frame
//! from a stale one.

use anyhow::{anyhow, Result};
use image::RgbImage;

/// One captured image: tightly packed RGB24 pixel data plus dimensions.
#[derive(Clone, Debug)]
pub struct Frame {
    data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Monotonic per-source sequence number, starting at 1.
    pub seq: u64,
}

impl Frame {
    /// Create a frame from RGB24 bytes. Called by the capture layer.
    ///
    /// Length must be exactly `width * height * 3`, except for the empty
    /// frame (no data, zero dimensions) which sources may emit when a read
    /// succeeds but the device returned nothing.
    pub fn new(data: Vec<u8>, width: u32, height: u32, seq: u64) -> Result<Self> {
        if data.is_empty() && width == 0 && height == 0 {
            return Ok(Self {
                data,
                width,
                height,
                seq,
            });
        }
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|v| v.checked_mul(3))
            .ok_or_else(|| anyhow!("frame dimensions overflow"))?;
        if data.len() != expected {
            return Err(anyhow!(
                "frame length mismatch: expected {} bytes for {}x{}, got {}",
                expected,
                width,
                height,
                data.len()
            ));
        }
        Ok(Self {
            data,
            width,
            height,
            seq,
        })
    }

    /// The empty frame: a successful read that carried no image.
    pub fn empty(seq: u64) -> Self {
        Self {
            data: Vec::new(),
            width: 0,
            height: 0,
            seq,
        }
    }

    /// True when this frame carries no pixels. Empty frames are transient
    /// and callers skip them rather than treating them as errors.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty() || self.width == 0 || self.height == 0
    }

    pub fn pixels(&self) -> &[u8] {
        &self.data
    }

    /// Copy into an `image::RgbImage` for processing.
    pub fn to_rgb_image(&self) -> Result<RgbImage> {
        if self.is_empty() {
            return Err(anyhow!("cannot convert an empty frame to an image"));
        }
        RgbImage::from_raw(self.width, self.height, self.data.clone())
            .ok_or_else(|| anyhow!("frame buffer does not match {}x{}", self.width, self.height))
    }

    /// Rebuild a frame from a processed image, keeping the sequence number.
    pub fn from_rgb_image(img: RgbImage, seq: u64) -> Self {
        let (width, height) = img.dimensions();
        Self {
            data: img.into_raw(),
            width,
            height,
            seq,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_validates_buffer_length() {
        assert!(Frame::new(vec![0u8; 12], 2, 2, 1).is_ok());
        assert!(Frame::new(vec![0u8; 11], 2, 2, 1).is_err());
    }

    #[test]
    fn empty_frame_is_empty() {
        let frame = Frame::empty(7);
        assert!(frame.is_empty());
        assert_eq!(frame.seq, 7);
        assert!(frame.to_rgb_image().is_err());
    }

    #[test]
    fn round_trips_through_rgb_image() {
        let frame = Frame::new(vec![9u8; 27], 3, 3, 2).unwrap();
        let img = frame.to_rgb_image().unwrap();
        let back = Frame::from_rgb_image(img, frame.seq);
        assert_eq!(back.pixels(), frame.pixels());
        assert_eq!(back.seq, 2);
    }
}
