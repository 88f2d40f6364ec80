//! mjpeg_streamer - stream a camera as MJPEG over HTTP
//!
//! Opens a capture device, encodes every frame as JPEG on a background
//! thread, and serves the result on `/` as a multipart/x-mixed-replace
//! stream. Point a browser at http://host:port/ to watch.
//!
//!     mjpeg_streamer 1 0.0.0.0:8080

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use framegrab::cli::StreamerArgs;
use framegrab::config::ToolConfig;
use framegrab::{encode_jpeg, shared_slot, CameraConfig, CameraSource, FramePublisher, PreviewServer};

/// Consecutive empty reads tolerated before the capture loop gives up.
const MAX_CONSECUTIVE_EMPTY: u32 = 500;
const EMPTY_FRAME_PAUSE: Duration = Duration::from_millis(10);

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = StreamerArgs::parse();

    let mut cfg = ToolConfig::load()?;
    cfg.camera.device = CameraConfig::device_from_arg(&args.camera);
    cfg.http.addr = args.addr.clone();
    if let Some(fps) = args.fps {
        cfg.camera.target_fps = fps;
    }
    if let Some(width) = args.width {
        cfg.camera.width = width;
    }
    if let Some(height) = args.height {
        cfg.camera.height = height;
    }
    if let Some(quality) = args.quality {
        cfg.jpeg_quality = quality;
    }

    let mut source = CameraSource::new(cfg.camera.to_capture_config())?;
    source
        .connect()
        .with_context(|| format!("error opening video capture device {}", cfg.camera.device))?;

    let slot = shared_slot();
    let publisher = FramePublisher::new(slot.clone());

    let shutdown = Arc::new(AtomicBool::new(false));
    let ctrlc_shutdown = shutdown.clone();
    ctrlc::set_handler(move || {
        log::info!("shutdown requested");
        ctrlc_shutdown.store(true, Ordering::SeqCst);
    })
    .context("install shutdown handler")?;

    let capture_shutdown = shutdown.clone();
    let quality = cfg.jpeg_quality;
    let device = cfg.camera.device.clone();
    let capture = std::thread::spawn(move || {
        capture_loop(source, publisher, &capture_shutdown, quality, &device);
        // A dead capture loop makes the stream useless; take the server down.
        capture_shutdown.store(true, Ordering::SeqCst);
    });

    let handle = PreviewServer::new(cfg.http.to_preview_config(), slot).spawn()?;
    log::info!("streaming on http://{}/", handle.addr);

    while !shutdown.load(Ordering::SeqCst) {
        std::thread::sleep(Duration::from_millis(200));
    }

    capture
        .join()
        .map_err(|_| anyhow::anyhow!("capture thread panicked"))?;
    handle.stop()?;
    Ok(())
}

fn capture_loop(
    mut source: CameraSource,
    publisher: FramePublisher,
    shutdown: &AtomicBool,
    quality: u8,
    device: &str,
) {
    let mut empty_streak = 0u32;
    let mut last_health_log = Instant::now();

    while !shutdown.load(Ordering::SeqCst) {
        let frame = match source.next_frame() {
            Ok(frame) => frame,
            Err(err) => {
                log::error!("cannot read device {}: {:#}", device, err);
                return;
            }
        };

        if frame.is_empty() {
            empty_streak += 1;
            if empty_streak > MAX_CONSECUTIVE_EMPTY {
                log::error!(
                    "device {} returned {} empty frames in a row, giving up",
                    device,
                    empty_streak
                );
                return;
            }
            std::thread::sleep(EMPTY_FRAME_PAUSE);
            continue;
        }
        empty_streak = 0;

        match encode_jpeg(&frame, quality) {
            Ok(jpeg) => publisher.publish(jpeg),
            Err(err) => {
                log::error!("encode failed for frame {}: {:#}", frame.seq, err);
                return;
            }
        }

        if last_health_log.elapsed() >= Duration::from_secs(5) {
            let stats = source.stats();
            log::info!(
                "camera health={} frames={} published={} device={}",
                source.is_healthy(),
                stats.frames_captured,
                publisher.published(),
                stats.device
            );
            last_health_log = Instant::now();
        }
    }
}
