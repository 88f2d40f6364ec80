use std::path::Path;

use anyhow::Result;
use tempfile::tempdir;

use framegrab::snapshot::{capture_still, save_frame};
use framegrab::{CameraConfig, CameraSource};

/// The save_image control flow: open, capture one usable frame, write.
fn try_snapshot(device: &str, path: &Path) -> Result<()> {
    let mut source = CameraSource::new(CameraConfig {
        device: device.to_string(),
        target_fps: 30,
        width: 64,
        height: 48,
    })?;
    source.connect()?;
    let frame = capture_still(&mut source, 3)?;
    save_frame(path, &frame, 80)
}

#[test]
fn writes_a_decodable_jpeg_for_a_live_source() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("shot.jpg");

    try_snapshot("stub://camera", &path).expect("snapshot succeeds");

    assert!(path.exists());
    let decoded = image::open(&path).expect("output decodes as an image");
    assert_eq!(decoded.width(), 64);
    assert_eq!(decoded.height(), 48);
}

#[test]
fn writes_nothing_when_only_empty_frames_arrive() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("shot.jpg");

    let err = try_snapshot("stub://empty", &path).unwrap_err();
    assert!(err.to_string().contains("empty frames"));
    assert!(!path.exists(), "no file may be written without an image");
}
