//! Camera frame source.
//!
//! `CameraSource` opens a capture device and produces RGB24 `Frame`s:
//! - `stub://…` devices are synthetic (patterned frames; `stub://empty`
//!   yields empty frames for exercising the skip path)
//! - anything else is a V4L2 device node, available with the camera-v4l2
//!   feature
//!
//! The source negotiates RGB24 with the device where possible and falls back
//! to normalizing whatever format the device actually delivers.

use anyhow::Result;
#[cfg(feature = "camera-v4l2")]
use anyhow::{anyhow, Context};

use crate::frame::Frame;

#[cfg(feature = "camera-v4l2")]
use super::normalize::{normalize_to_rgb, PixelFormat};
#[cfg(feature = "camera-v4l2")]
use ouroboros::self_referencing;
#[cfg(feature = "camera-v4l2")]
use std::time::{Duration, Instant};

/// Configuration for a camera source.
#[derive(Clone, Debug)]
pub struct CameraConfig {
    /// Device node (e.g., "/dev/video0") or a `stub://` synthetic source.
    pub device: String,
    /// Target frame rate (frames per second).
    pub target_fps: u32,
    /// Preferred frame width.
    pub width: u32,
    /// Preferred frame height.
    pub height: u32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            device: "/dev/video0".to_string(),
            target_fps: 30,
            width: 640,
            height: 480,
        }
    }
}

impl CameraConfig {
    /// Map a CLI camera argument to a device node: a bare integer selects
    /// `/dev/videoN`, anything else is used as-is.
    pub fn device_from_arg(arg: &str) -> String {
        match arg.parse::<u32>() {
            Ok(index) => format!("/dev/video{index}"),
            Err(_) => arg.to_string(),
        }
    }
}

/// Camera frame source.
pub struct CameraSource {
    backend: CameraBackend,
}

enum CameraBackend {
    Synthetic(SyntheticCameraSource),
    #[cfg(feature = "camera-v4l2")]
    Device(DeviceCameraSource),
}

impl CameraSource {
    pub fn new(config: CameraConfig) -> Result<Self> {
        if config.device.starts_with("stub://") {
            return Ok(Self {
                backend: CameraBackend::Synthetic(SyntheticCameraSource::new(config)),
            });
        }
        #[cfg(feature = "camera-v4l2")]
        {
            Ok(Self {
                backend: CameraBackend::Device(DeviceCameraSource::new(config)?),
            })
        }
        #[cfg(not(feature = "camera-v4l2"))]
        {
            Err(anyhow::anyhow!(
                "device capture requires the camera-v4l2 feature (got '{}')",
                config.device
            ))
        }
    }

    /// Open and configure the device.
    pub fn connect(&mut self) -> Result<()> {
        match &mut self.backend {
            CameraBackend::Synthetic(source) => source.connect(),
            #[cfg(feature = "camera-v4l2")]
            CameraBackend::Device(source) => source.connect(),
        }
    }

    /// Capture the next frame, normalized to RGB24.
    ///
    /// An `Err` means the device failed and the reading loop should stop.
    /// An empty `Frame` means the read succeeded but carried no image;
    /// callers skip those.
    pub fn next_frame(&mut self) -> Result<Frame> {
        match &mut self.backend {
            CameraBackend::Synthetic(source) => source.next_frame(),
            #[cfg(feature = "camera-v4l2")]
            CameraBackend::Device(source) => source.next_frame(),
        }
    }

    /// Check if the source is healthy.
    pub fn is_healthy(&self) -> bool {
        match &self.backend {
            CameraBackend::Synthetic(source) => source.is_healthy(),
            #[cfg(feature = "camera-v4l2")]
            CameraBackend::Device(source) => source.is_healthy(),
        }
    }

    /// Get frame statistics.
    pub fn stats(&self) -> CameraStats {
        match &self.backend {
            CameraBackend::Synthetic(source) => source.stats(),
            #[cfg(feature = "camera-v4l2")]
            CameraBackend::Device(source) => source.stats(),
        }
    }
}

/// Statistics for a camera source.
#[derive(Clone, Debug)]
pub struct CameraStats {
    pub frames_captured: u64,
    pub device: String,
}

// ----------------------------------------------------------------------------
// Synthetic source (stub://) for development and tests
// ----------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SyntheticMode {
    /// Deterministic patterned frames with occasional scene changes.
    Patterned,
    /// Every read yields the empty frame.
    Empty,
}

struct SyntheticCameraSource {
    config: CameraConfig,
    mode: SyntheticMode,
    frame_count: u64,
    scene_state: u8,
}

impl SyntheticCameraSource {
    fn new(config: CameraConfig) -> Self {
        let mode = if config.device == "stub://empty" {
            SyntheticMode::Empty
        } else {
            SyntheticMode::Patterned
        };
        Self {
            config,
            mode,
            frame_count: 0,
            scene_state: 0,
        }
    }

    fn connect(&mut self) -> Result<()> {
        log::info!(
            "CameraSource: connected to {} (synthetic)",
            self.config.device
        );
        Ok(())
    }

    fn next_frame(&mut self) -> Result<Frame> {
        self.frame_count += 1;
        if self.mode == SyntheticMode::Empty {
            return Ok(Frame::empty(self.frame_count));
        }
        let pixels = self.generate_synthetic_pixels();
        Frame::new(
            pixels,
            self.config.width,
            self.config.height,
            self.frame_count,
        )
    }

    /// Generate patterned pixel data: a static gradient background with a
    /// band that moves as the scene state advances, so consecutive frames
    /// differ the way live camera frames do.
    fn generate_synthetic_pixels(&mut self) -> Vec<u8> {
        if self.frame_count % 50 == 0 {
            self.scene_state = self.scene_state.wrapping_add(1);
        }

        let pixel_count = (self.config.width * self.config.height * 3) as usize;
        let mut pixels = vec![0u8; pixel_count];
        for (i, pixel) in pixels.iter_mut().enumerate() {
            *pixel = ((i as u64 + self.frame_count + self.scene_state as u64) % 256) as u8;
        }
        pixels
    }

    fn is_healthy(&self) -> bool {
        true
    }

    fn stats(&self) -> CameraStats {
        CameraStats {
            frames_captured: self.frame_count,
            device: self.config.device.clone(),
        }
    }
}

// ----------------------------------------------------------------------------
// V4L2 device source
// ----------------------------------------------------------------------------

#[cfg(feature = "camera-v4l2")]
struct DeviceCameraSource {
    config: CameraConfig,
    state: Option<DeviceCameraState>,
    frame_count: u64,
    last_frame_at: Option<Instant>,
    last_error: Option<String>,
    active_width: u32,
    active_height: u32,
    active_format: PixelFormat,
}

#[cfg(feature = "camera-v4l2")]
#[self_referencing]
struct DeviceCameraState {
    device: v4l::Device,
    #[borrows(mut device)]
    #[covariant]
    stream: v4l::prelude::MmapStream<'this, v4l::Device>,
}

#[cfg(feature = "camera-v4l2")]
impl DeviceCameraSource {
    fn new(config: CameraConfig) -> Result<Self> {
        Ok(Self {
            active_width: config.width,
            active_height: config.height,
            active_format: PixelFormat::Rgb24,
            config,
            state: None,
            frame_count: 0,
            last_frame_at: None,
            last_error: None,
        })
    }

    fn connect(&mut self) -> Result<()> {
        use v4l::buffer::Type;
        use v4l::video::Capture;

        let mut device = v4l::Device::with_path(&self.config.device)
            .with_context(|| format!("open capture device {}", self.config.device))?;
        let mut format = device.format().context("read device format")?;
        format.width = self.config.width;
        format.height = self.config.height;
        format.fourcc = v4l::FourCC::new(b"RGB3");

        let format = match device.set_format(&format) {
            Ok(format) => format,
            Err(err) => {
                log::warn!(
                    "CameraSource: failed to set RGB24 on {}: {}",
                    self.config.device,
                    err
                );
                device
                    .format()
                    .context("read device format after set failure")?
            }
        };

        self.active_format = match &format.fourcc.repr {
            b"RGB3" => PixelFormat::Rgb24,
            b"YUYV" => PixelFormat::Yuyv,
            b"NV12" => PixelFormat::Nv12,
            other => {
                return Err(anyhow!(
                    "unsupported device pixel format {} on {}",
                    String::from_utf8_lossy(other),
                    self.config.device
                ))
            }
        };

        if self.config.target_fps > 0 {
            let params = v4l::video::capture::Parameters::with_fps(self.config.target_fps);
            if let Err(err) = device.set_params(&params) {
                log::warn!(
                    "CameraSource: failed to set fps on {}: {}",
                    self.config.device,
                    err
                );
            }
        }

        self.active_width = format.width;
        self.active_height = format.height;
        self.last_error = None;

        let state = DeviceCameraStateBuilder {
            device,
            stream_builder: |device| {
                v4l::prelude::MmapStream::with_buffers(device, Type::VideoCapture, 4)
                    .map_err(|err| anyhow::Error::new(err).context("create capture buffer stream"))
            },
        }
        .try_build()
        .map_err(|err| {
            self.last_error = Some(err.to_string());
            err
        })?;
        self.state = Some(state);

        log::info!(
            "CameraSource: connected to {} ({}x{}, {:?})",
            self.config.device,
            self.active_width,
            self.active_height,
            self.active_format
        );
        Ok(())
    }

    fn next_frame(&mut self) -> Result<Frame> {
        use v4l::io::traits::CaptureStream;

        let state = self.state.as_mut().context("capture device not connected")?;
        let (buf, _meta) = state
            .with_mut(|fields| fields.stream.next())
            .map_err(|err| {
                self.last_error = Some(err.to_string());
                anyhow::Error::new(err).context("capture frame")
            })?;

        self.frame_count += 1;
        self.last_frame_at = Some(Instant::now());

        if buf.is_empty() {
            return Ok(Frame::empty(self.frame_count));
        }

        let rgb = normalize_to_rgb(buf, self.active_width, self.active_height, self.active_format)
            .map_err(|err| {
                self.last_error = Some(err.to_string());
                err
            })?;
        Frame::new(rgb, self.active_width, self.active_height, self.frame_count)
    }

    fn is_healthy(&self) -> bool {
        if self.last_error.is_some() {
            return false;
        }
        let Some(last_frame_at) = self.last_frame_at else {
            return true;
        };
        last_frame_at.elapsed() <= self.health_grace()
    }

    fn stats(&self) -> CameraStats {
        CameraStats {
            frames_captured: self.frame_count,
            device: self.config.device.clone(),
        }
    }

    fn health_grace(&self) -> Duration {
        let base_ms = if self.config.target_fps == 0 {
            2_000
        } else {
            (1000 / self.config.target_fps).saturating_mul(6)
        };
        Duration::from_millis(base_ms.max(2_000) as u64)
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn stub_config(device: &str) -> CameraConfig {
        CameraConfig {
            device: device.to_string(),
            target_fps: 30,
            width: 64,
            height: 48,
        }
    }

    #[test]
    fn synthetic_source_produces_frames() -> Result<()> {
        let mut source = CameraSource::new(stub_config("stub://camera"))?;
        source.connect()?;

        let frame = source.next_frame()?;
        assert_eq!(frame.width, 64);
        assert_eq!(frame.height, 48);
        assert_eq!(frame.seq, 1);
        assert!(!frame.is_empty());

        Ok(())
    }

    #[test]
    fn synthetic_frames_differ_across_reads() -> Result<()> {
        let mut source = CameraSource::new(stub_config("stub://camera"))?;
        source.connect()?;

        let frame1 = source.next_frame()?;
        let frame2 = source.next_frame()?;
        assert_ne!(frame1.pixels(), frame2.pixels());
        assert_eq!(frame2.seq, 2);

        Ok(())
    }

    #[test]
    fn empty_stub_yields_empty_frames() -> Result<()> {
        let mut source = CameraSource::new(stub_config("stub://empty"))?;
        source.connect()?;

        for _ in 0..3 {
            assert!(source.next_frame()?.is_empty());
        }
        assert!(source.is_healthy());
        assert_eq!(source.stats().frames_captured, 3);

        Ok(())
    }

    #[test]
    fn device_arg_maps_index_to_node() {
        assert_eq!(CameraConfig::device_from_arg("1"), "/dev/video1");
        assert_eq!(CameraConfig::device_from_arg("/dev/video5"), "/dev/video5");
        assert_eq!(CameraConfig::device_from_arg("stub://camera"), "stub://camera");
    }
}
