use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::capture::CameraConfig;
use crate::preview::PreviewConfig;

const DEFAULT_DEVICE: &str = "/dev/video0";
const DEFAULT_TARGET_FPS: u32 = 30;
const DEFAULT_WIDTH: u32 = 640;
const DEFAULT_HEIGHT: u32 = 480;
const DEFAULT_HTTP_ADDR: &str = "127.0.0.1:8080";
const DEFAULT_FRAME_INTERVAL_MS: u64 = 33;
const DEFAULT_JPEG_QUALITY: u8 = 80;

#[derive(Debug, Deserialize, Default)]
struct ToolConfigFile {
    camera: Option<CameraConfigFile>,
    http: Option<HttpConfigFile>,
    jpeg_quality: Option<u8>,
}

#[derive(Debug, Deserialize, Default)]
struct CameraConfigFile {
    device: Option<String>,
    target_fps: Option<u32>,
    width: Option<u32>,
    height: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
struct HttpConfigFile {
    addr: Option<String>,
    frame_interval_ms: Option<u64>,
}

/// Shared tool configuration: optional JSON file named by `FRAMEGRAB_CONFIG`,
/// overridden by `FRAMEGRAB_*` environment variables, overridden in turn by
/// CLI arguments (applied by the binaries).
#[derive(Debug, Clone)]
pub struct ToolConfig {
    pub camera: CameraSettings,
    pub http: HttpSettings,
    pub jpeg_quality: u8,
}

#[derive(Debug, Clone)]
pub struct CameraSettings {
    pub device: String,
    pub target_fps: u32,
    pub width: u32,
    pub height: u32,
}

impl CameraSettings {
    pub fn to_capture_config(&self) -> CameraConfig {
        CameraConfig {
            device: self.device.clone(),
            target_fps: self.target_fps,
            width: self.width,
            height: self.height,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub addr: String,
    pub frame_interval_ms: u64,
}

impl HttpSettings {
    pub fn to_preview_config(&self) -> PreviewConfig {
        PreviewConfig {
            addr: self.addr.clone(),
            frame_interval: Duration::from_millis(self.frame_interval_ms),
        }
    }
}

impl ToolConfig {
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("FRAMEGRAB_CONFIG").ok();
        let file_cfg = match config_path.as_deref() {
            Some(path) => Some(read_config_file(Path::new(path))?),
            None => None,
        };
        let mut cfg = Self::from_file(file_cfg.unwrap_or_default());
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: ToolConfigFile) -> Self {
        let camera = CameraSettings {
            device: file
                .camera
                .as_ref()
                .and_then(|camera| camera.device.clone())
                .unwrap_or_else(|| DEFAULT_DEVICE.to_string()),
            target_fps: file
                .camera
                .as_ref()
                .and_then(|camera| camera.target_fps)
                .unwrap_or(DEFAULT_TARGET_FPS),
            width: file
                .camera
                .as_ref()
                .and_then(|camera| camera.width)
                .unwrap_or(DEFAULT_WIDTH),
            height: file
                .camera
                .as_ref()
                .and_then(|camera| camera.height)
                .unwrap_or(DEFAULT_HEIGHT),
        };
        let http = HttpSettings {
            addr: file
                .http
                .as_ref()
                .and_then(|http| http.addr.clone())
                .unwrap_or_else(|| DEFAULT_HTTP_ADDR.to_string()),
            frame_interval_ms: file
                .http
                .as_ref()
                .and_then(|http| http.frame_interval_ms)
                .unwrap_or(DEFAULT_FRAME_INTERVAL_MS),
        };
        Self {
            camera,
            http,
            jpeg_quality: file.jpeg_quality.unwrap_or(DEFAULT_JPEG_QUALITY),
        }
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(device) = std::env::var("FRAMEGRAB_CAMERA_DEVICE") {
            if !device.trim().is_empty() {
                self.camera.device = device;
            }
        }
        if let Ok(fps) = std::env::var("FRAMEGRAB_TARGET_FPS") {
            self.camera.target_fps = fps
                .parse()
                .map_err(|_| anyhow!("FRAMEGRAB_TARGET_FPS must be an integer"))?;
        }
        if let Ok(addr) = std::env::var("FRAMEGRAB_HTTP_ADDR") {
            if !addr.trim().is_empty() {
                self.http.addr = addr;
            }
        }
        if let Ok(quality) = std::env::var("FRAMEGRAB_JPEG_QUALITY") {
            self.jpeg_quality = quality
                .parse()
                .map_err(|_| anyhow!("FRAMEGRAB_JPEG_QUALITY must be an integer 1..=100"))?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.camera.target_fps == 0 {
            return Err(anyhow!("camera target_fps must be greater than zero"));
        }
        if self.camera.width == 0 || self.camera.height == 0 {
            return Err(anyhow!("camera dimensions must be greater than zero"));
        }
        if self.http.frame_interval_ms == 0 {
            return Err(anyhow!("http frame_interval_ms must be greater than zero"));
        }
        crate::encode::validate_quality(self.jpeg_quality)?;
        Ok(())
    }
}

fn read_config_file(path: &Path) -> Result<ToolConfigFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let cfg = serde_json::from_str(&raw)
        .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?;
    Ok(cfg)
}
