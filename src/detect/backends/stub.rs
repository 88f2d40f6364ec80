use anyhow::Result;
use image::GrayImage;

use crate::detect::backend::FaceDetectorBackend;
use crate::detect::result::FaceRect;

/// Stub backend: reports a fixed set of regions on every frame.
///
/// The default instance reports nothing, which is what a real detector does
/// on a faceless scene. Tests and demos construct it with known regions.
#[derive(Default)]
pub struct StubBackend {
    rects: Vec<FaceRect>,
    tracking: bool,
}

impl StubBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rects(rects: Vec<FaceRect>) -> Self {
        Self {
            rects,
            tracking: false,
        }
    }

    pub fn tracking_enabled(&self) -> bool {
        self.tracking
    }
}

impl FaceDetectorBackend for StubBackend {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn set_tracking(&mut self, enabled: bool) {
        self.tracking = enabled;
    }

    fn detect(&mut self, _gray: &GrayImage) -> Result<Vec<FaceRect>> {
        Ok(self.rects.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stub_backend_reports_configured_rects() {
        let rect = FaceRect::new(1, 2, 3, 4, 0.75);
        let mut backend = StubBackend::with_rects(vec![rect]);
        let gray = GrayImage::new(8, 8);

        let faces = backend.detect(&gray).unwrap();
        assert_eq!(faces, vec![rect]);
    }

    #[test]
    fn stub_backend_defaults_to_no_faces() {
        let mut backend = StubBackend::new();
        let gray = GrayImage::new(8, 8);

        assert!(backend.detect(&gray).unwrap().is_empty());
    }

    #[test]
    fn stub_backend_remembers_tracking_toggle() {
        let mut backend = StubBackend::new();
        assert!(!backend.tracking_enabled());
        backend.set_tracking(true);
        assert!(backend.tracking_enabled());
    }
}
