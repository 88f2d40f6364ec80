use anyhow::Result;
use image::GrayImage;

use crate::detect::result::FaceRect;

/// Face detector backend trait.
///
/// Detection runs on grayscale frames; the conversion is the caller's job.
/// A scene with no faces is a normal outcome: implementations return an
/// empty list, never an error. `Err` is reserved for the backend itself
/// failing (model not loaded, SDK call failed).
///
/// Returned regions are not guaranteed to lie inside the frame; consumers
/// clamp via `FaceRect::clamp_to` before touching pixels.
pub trait FaceDetectorBackend: Send {
    /// Backend identifier.
    fn name(&self) -> &'static str;

    /// Toggle tracking mode. Backends that track faces across consecutive
    /// frames of a video source can detect more cheaply than on isolated
    /// stills; backends without a tracker ignore the toggle.
    fn set_tracking(&mut self, _enabled: bool) {}

    /// Run detection on a grayscale frame.
    fn detect(&mut self, gray: &GrayImage) -> Result<Vec<FaceRect>>;

    /// Optional warm-up hook.
    fn warm_up(&mut self) -> Result<()> {
        Ok(())
    }
}
