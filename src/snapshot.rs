//! Single-shot capture: read one usable frame and write it to disk.

use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};

use crate::capture::CameraSource;
use crate::encode::encode_jpeg;
use crate::frame::Frame;

/// Delay between retries when the device hands back an empty frame.
const EMPTY_RETRY_DELAY: Duration = Duration::from_millis(20);

/// Read frames until a non-empty one arrives.
///
/// Empty frames are a transient device condition, so they are skipped, but
/// only `attempts` times. An always-empty device is an error, not a reason
/// to spin forever.
pub fn capture_still(source: &mut CameraSource, attempts: usize) -> Result<Frame> {
    if attempts == 0 {
        return Err(anyhow!("capture attempts must be at least 1"));
    }
    for attempt in 1..=attempts {
        let frame = source.next_frame().context("read frame from device")?;
        if !frame.is_empty() {
            return Ok(frame);
        }
        log::debug!("empty frame on attempt {}/{}, retrying", attempt, attempts);
        if attempt < attempts {
            std::thread::sleep(EMPTY_RETRY_DELAY);
        }
    }
    Err(anyhow!(
        "no image after {} attempts: device returned only empty frames",
        attempts
    ))
}

/// Write a frame to `path` as JPEG.
///
/// Refuses empty frames before touching the filesystem: when this returns
/// an error for an empty frame, no file has been created.
pub fn save_frame(path: &Path, frame: &Frame, quality: u8) -> Result<()> {
    if frame.is_empty() {
        return Err(anyhow!("refusing to save an empty frame"));
    }
    let jpeg = encode_jpeg(frame, quality)?;
    std::fs::write(path, jpeg)
        .with_context(|| format!("write image file {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::CameraConfig;

    fn source(device: &str) -> CameraSource {
        CameraSource::new(CameraConfig {
            device: device.to_string(),
            target_fps: 30,
            width: 32,
            height: 24,
        })
        .unwrap()
    }

    #[test]
    fn capture_still_returns_first_usable_frame() {
        let mut cam = source("stub://camera");
        cam.connect().unwrap();

        let frame = capture_still(&mut cam, 3).unwrap();
        assert!(!frame.is_empty());
        assert_eq!(frame.seq, 1);
    }

    #[test]
    fn capture_still_gives_up_on_always_empty_source() {
        let mut cam = source("stub://empty");
        cam.connect().unwrap();

        let err = capture_still(&mut cam, 3).unwrap_err();
        assert!(err.to_string().contains("3 attempts"));
    }

    #[test]
    fn save_frame_refuses_empty_frame_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.jpg");

        assert!(save_frame(&path, &Frame::empty(1), 80).is_err());
        assert!(!path.exists(), "no file may be created for an empty frame");
    }

    #[test]
    fn save_frame_writes_decodable_jpeg() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shot.jpg");

        let mut cam = source("stub://camera");
        cam.connect().unwrap();
        let frame = capture_still(&mut cam, 3).unwrap();
        save_frame(&path, &frame, 80).unwrap();

        let decoded = image::open(&path).unwrap();
        assert_eq!(decoded.width(), 32);
        assert_eq!(decoded.height(), 24);
    }
}
