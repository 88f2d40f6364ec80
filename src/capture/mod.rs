//! Frame capture sources.
//!
//! This module provides the camera layer the tools read from:
//! - Synthetic sources (`stub://…`) for development and tests
//! - V4L2 devices (feature: camera-v4l2)
//!
//! All sources produce `Frame` instances normalized to RGB24. The capture
//! layer is responsible for:
//! - Opening and configuring the device (resolution, frame rate)
//! - Normalizing the device pixel format to RGB24
//! - Stamping frames with monotonic sequence numbers
//!
//! Read failures are returned to the caller and are fatal to the reading
//! loop; empty frames are returned as `Frame::empty` and skipped by callers.

pub mod camera;
#[cfg(feature = "camera-v4l2")]
mod normalize;

pub use camera::{CameraConfig, CameraSource, CameraStats};
