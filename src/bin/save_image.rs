//! save_image - capture one frame from a camera and write it to disk
//!
//!     save_image 0 filename.jpg

use anyhow::{Context, Result};
use clap::Parser;

use framegrab::cli::SaveImageArgs;
use framegrab::config::ToolConfig;
use framegrab::snapshot::{capture_still, save_frame};
use framegrab::ui::Ui;
use framegrab::{CameraConfig, CameraSource};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = SaveImageArgs::parse();
    let ui = Ui::new(args.plain);

    let mut cfg = ToolConfig::load()?;
    cfg.camera.device = CameraConfig::device_from_arg(&args.camera);
    if let Some(quality) = args.quality {
        cfg.jpeg_quality = quality;
    }

    let mut source = CameraSource::new(cfg.camera.to_capture_config())?;
    {
        let _stage = ui.stage(&format!("opening {}", cfg.camera.device));
        source
            .connect()
            .with_context(|| format!("error opening video capture device {}", cfg.camera.device))?;
    }

    let frame = {
        let _stage = ui.stage("capturing frame");
        capture_still(&mut source, args.attempts)
            .with_context(|| format!("no image on device {}", cfg.camera.device))?
    };

    {
        let _stage = ui.stage(&format!("writing {}", args.output.display()));
        save_frame(&args.output, &frame, cfg.jpeg_quality)?;
    }

    log::info!(
        "saved {}x{} frame to {}",
        frame.width,
        frame.height,
        args.output.display()
    );
    Ok(())
}
