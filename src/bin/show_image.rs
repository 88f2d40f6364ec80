//! show_image - display an image file on the HTTP preview surface
//!
//! Loads the file once (format inferred from content), then republishes it
//! on a fixed-delay redraw loop until interrupted.
//!
//!     show_image picture.jpg
//!     show_image picture.png 0.0.0.0:8080 --delay-ms 250

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use framegrab::cli::ShowImageArgs;
use framegrab::config::ToolConfig;
use framegrab::{encode_rgb_jpeg, load_image, shared_slot, FramePublisher, PreviewServer};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = ShowImageArgs::parse();

    let mut cfg = ToolConfig::load()?;
    cfg.http.addr = args.addr.clone();

    let img = load_image(&args.path)?;
    let jpeg = encode_rgb_jpeg(&img, cfg.jpeg_quality)
        .with_context(|| format!("encode {}", args.path.display()))?;

    let slot = shared_slot();
    let publisher = FramePublisher::new(slot.clone());
    let handle = PreviewServer::new(cfg.http.to_preview_config(), slot).spawn()?;

    let shutdown = Arc::new(AtomicBool::new(false));
    let ctrlc_shutdown = shutdown.clone();
    ctrlc::set_handler(move || {
        ctrlc_shutdown.store(true, Ordering::SeqCst);
    })
    .context("install shutdown handler")?;

    log::info!(
        "showing {} ({}x{}) on http://{}/",
        args.path.display(),
        img.width(),
        img.height(),
        handle.addr
    );

    // Redraw loop: the image never changes, but each publish advances the
    // slot sequence so connected clients keep receiving parts.
    while !shutdown.load(Ordering::SeqCst) {
        publisher.publish(jpeg.clone());
        std::thread::sleep(Duration::from_millis(args.delay_ms));
    }

    handle.stop()?;
    Ok(())
}
