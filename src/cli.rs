//! clap argument types for the framegrab binaries.
//!
//! Kept in the library so argument validation is unit-testable: a missing
//! positional argument fails parsing (usage error, non-zero exit) before
//! any capture device is opened.

use std::path::PathBuf;

use clap::Parser;

/// mjpeg_streamer - stream a camera as MJPEG over HTTP.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct StreamerArgs {
    /// Camera index (0 -> /dev/video0) or device path.
    pub camera: String,
    /// host:port to serve the stream on (e.g. 0.0.0.0:8080).
    pub addr: String,
    /// JPEG quality, 1..=100.
    #[arg(long)]
    pub quality: Option<u8>,
    /// Target capture frame rate.
    #[arg(long)]
    pub fps: Option<u32>,
    /// Preferred frame width.
    #[arg(long)]
    pub width: Option<u32>,
    /// Preferred frame height.
    #[arg(long)]
    pub height: Option<u32>,
}

/// face_blur - blur detected faces and publish to the preview surface.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct FaceBlurArgs {
    /// Camera index (0 -> /dev/video0) or device path.
    pub camera: String,
    /// host:port for the preview surface.
    #[arg(default_value = "127.0.0.1:8080")]
    pub addr: String,
    /// Detector backend name.
    #[arg(long, default_value = "stub")]
    pub detector: String,
    /// Gaussian blur strength applied to each face region.
    #[arg(long, default_value_t = 8.0)]
    pub blur_sigma: f32,
    /// Enable detector tracking mode for video sources.
    #[arg(long)]
    pub tracking: bool,
    /// JPEG quality, 1..=100.
    #[arg(long)]
    pub quality: Option<u8>,
}

/// save_image - capture one frame and write it to disk as JPEG.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct SaveImageArgs {
    /// Camera index (0 -> /dev/video0) or device path.
    pub camera: String,
    /// Output file path.
    pub output: PathBuf,
    /// JPEG quality, 1..=100.
    #[arg(long)]
    pub quality: Option<u8>,
    /// How many empty frames to tolerate before giving up.
    #[arg(long, default_value_t = 10)]
    pub attempts: usize,
    /// Plain stderr output (no spinners).
    #[arg(long)]
    pub plain: bool,
}

/// show_image - load an image file and redraw it on the preview surface.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct ShowImageArgs {
    /// Image file to display (format inferred from content).
    pub path: PathBuf,
    /// host:port for the preview surface.
    #[arg(default_value = "127.0.0.1:8080")]
    pub addr: String,
    /// Redraw delay in milliseconds.
    #[arg(long, default_value_t = 100)]
    pub delay_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn streamer_requires_camera_and_addr() {
        assert!(StreamerArgs::try_parse_from(["mjpeg_streamer"]).is_err());
        assert!(StreamerArgs::try_parse_from(["mjpeg_streamer", "1"]).is_err());

        let args =
            StreamerArgs::try_parse_from(["mjpeg_streamer", "1", "0.0.0.0:8080"]).unwrap();
        assert_eq!(args.camera, "1");
        assert_eq!(args.addr, "0.0.0.0:8080");
        assert!(args.quality.is_none());
    }

    #[test]
    fn save_image_requires_camera_and_output() {
        assert!(SaveImageArgs::try_parse_from(["save_image", "0"]).is_err());

        let args = SaveImageArgs::try_parse_from(["save_image", "0", "shot.jpg"]).unwrap();
        assert_eq!(args.camera, "0");
        assert_eq!(args.output, PathBuf::from("shot.jpg"));
        assert!(args.quality.is_none());
        assert_eq!(args.attempts, 10);
    }

    #[test]
    fn face_blur_defaults() {
        let args = FaceBlurArgs::try_parse_from(["face_blur", "0"]).unwrap();
        assert_eq!(args.addr, "127.0.0.1:8080");
        assert_eq!(args.detector, "stub");
        assert!(!args.tracking);

        assert!(FaceBlurArgs::try_parse_from(["face_blur"]).is_err());
    }

    #[test]
    fn show_image_requires_path() {
        assert!(ShowImageArgs::try_parse_from(["show_image"]).is_err());

        let args =
            ShowImageArgs::try_parse_from(["show_image", "pic.png", "--delay-ms", "50"]).unwrap();
        assert_eq!(args.path, PathBuf::from("pic.png"));
        assert_eq!(args.delay_ms, 50);
    }
}
