//! face_blur - blur detected faces on a live camera feed
//!
//! Reads frames, converts each to grayscale for detection, asks the selected
//! detector backend for face regions, Gaussian-blurs each region on the
//! color frame, and publishes the result to the HTTP preview surface.
//!
//!     face_blur 0
//!     face_blur 0 0.0.0.0:8080 --detector stub --blur-sigma 10 --tracking

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use framegrab::cli::FaceBlurArgs;
use framegrab::config::ToolConfig;
use framegrab::imgproc::{blur_faces, grayscale};
use framegrab::{
    encode_rgb_jpeg, shared_slot, BackendRegistry, CameraConfig, CameraSource, FramePublisher,
    PreviewServer,
};

const MAX_CONSECUTIVE_EMPTY: u32 = 500;
const EMPTY_FRAME_PAUSE: Duration = Duration::from_millis(10);

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = FaceBlurArgs::parse();

    let mut cfg = ToolConfig::load()?;
    cfg.camera.device = CameraConfig::device_from_arg(&args.camera);
    cfg.http.addr = args.addr.clone();
    if let Some(quality) = args.quality {
        cfg.jpeg_quality = quality;
    }

    let registry = BackendRegistry::with_builtin();
    let mut detector = registry.create(&args.detector)?;
    detector.set_tracking(args.tracking);
    detector.warm_up().context("warm up face detector")?;

    let mut source = CameraSource::new(cfg.camera.to_capture_config())?;
    source
        .connect()
        .with_context(|| format!("error opening video capture device {}", cfg.camera.device))?;

    let slot = shared_slot();
    let publisher = FramePublisher::new(slot.clone());
    let handle = PreviewServer::new(cfg.http.to_preview_config(), slot).spawn()?;

    let shutdown = Arc::new(AtomicBool::new(false));
    let ctrlc_shutdown = shutdown.clone();
    ctrlc::set_handler(move || {
        log::info!("shutdown requested");
        ctrlc_shutdown.store(true, Ordering::SeqCst);
    })
    .context("install shutdown handler")?;

    log::info!(
        "start reading camera device {} (detector={}, preview http://{}/)",
        cfg.camera.device,
        detector.name(),
        handle.addr
    );

    let frame_pause = Duration::from_millis(1000 / u64::from(cfg.camera.target_fps.max(1)));
    let mut empty_streak = 0u32;

    while !shutdown.load(Ordering::SeqCst) {
        let frame = match source.next_frame() {
            Ok(frame) => frame,
            Err(err) => {
                log::error!("cannot read device {}: {:#}", cfg.camera.device, err);
                break;
            }
        };

        if frame.is_empty() {
            empty_streak += 1;
            if empty_streak > MAX_CONSECUTIVE_EMPTY {
                log::error!(
                    "device {} returned {} empty frames in a row, giving up",
                    cfg.camera.device,
                    empty_streak
                );
                break;
            }
            std::thread::sleep(EMPTY_FRAME_PAUSE);
            continue;
        }
        empty_streak = 0;

        let mut img = frame.to_rgb_image()?;
        let gray = grayscale(&img);

        let faces = detector.detect(&gray).context("run face detection")?;
        log::debug!("found {} faces in frame {}", faces.len(), frame.seq);

        blur_faces(&mut img, &faces, args.blur_sigma);

        let jpeg = encode_rgb_jpeg(&img, cfg.jpeg_quality)?;
        publisher.publish(jpeg);

        std::thread::sleep(frame_pause);
    }

    handle.stop()?;
    Ok(())
}
