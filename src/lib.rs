//! framegrab - camera capture toolkit
//!
//! This crate provides the library behind four small tools:
//!
//! - `mjpeg_streamer`: capture a camera and serve it as an HTTP MJPEG stream
//! - `face_blur`: blur detected faces and publish to the preview surface
//! - `save_image`: capture one frame and write it to disk as JPEG
//! - `show_image`: load an image file and redraw it on the preview surface
//!
//! # Module Structure
//!
//! - `capture`: frame sources (synthetic stubs, V4L2 devices)
//! - `frame`: the RGB24 frame container
//! - `imgproc`: grayscale conversion and face-region blur
//! - `detect`: face detector backend seam and registry
//! - `encode`: JPEG encoding and image loading
//! - `snapshot`: single-shot capture-and-save
//! - `preview`: shared latest-frame slot and the HTTP preview server
//! - `config`, `cli`, `ui`: configuration, argument parsing, stage output

pub mod capture;
pub mod cli;
pub mod config;
pub mod detect;
pub mod encode;
pub mod frame;
pub mod imgproc;
pub mod preview;
pub mod snapshot;
pub mod ui;

pub use capture::{CameraConfig, CameraSource, CameraStats};
pub use detect::{BackendRegistry, FaceDetectorBackend, FaceRect, StubBackend};
pub use encode::{encode_jpeg, encode_rgb_jpeg, load_image, DEFAULT_JPEG_QUALITY};
pub use frame::Frame;
pub use preview::{
    latest, shared_slot, FramePublisher, JpegFrame, PreviewConfig, PreviewHandle, PreviewServer,
    SharedJpeg,
};
pub use snapshot::{capture_still, save_frame};
