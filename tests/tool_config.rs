use std::sync::Mutex;

use tempfile::NamedTempFile;

use framegrab::config::ToolConfig;

static ENV_LOCK: Mutex<()> = Mutex::new(());

fn clear_env() {
    for key in [
        "FRAMEGRAB_CONFIG",
        "FRAMEGRAB_CAMERA_DEVICE",
        "FRAMEGRAB_TARGET_FPS",
        "FRAMEGRAB_HTTP_ADDR",
        "FRAMEGRAB_JPEG_QUALITY",
    ] {
        std::env::remove_var(key);
    }
}

#[test]
fn loads_defaults_without_file_or_env() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let cfg = ToolConfig::load().expect("load config");

    assert_eq!(cfg.camera.device, "/dev/video0");
    assert_eq!(cfg.camera.target_fps, 30);
    assert_eq!(cfg.camera.width, 640);
    assert_eq!(cfg.camera.height, 480);
    assert_eq!(cfg.http.addr, "127.0.0.1:8080");
    assert_eq!(cfg.jpeg_quality, 80);

    clear_env();
}

#[test]
fn loads_config_from_file_and_env_overrides() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let mut file = NamedTempFile::new().expect("temp config");
    let json = r#"{
        "camera": {
            "device": "stub://camera",
            "target_fps": 15,
            "width": 800,
            "height": 600
        },
        "http": {
            "addr": "0.0.0.0:9000",
            "frame_interval_ms": 50
        },
        "jpeg_quality": 70
    }"#;
    std::io::Write::write_all(&mut file, json.as_bytes()).expect("write config");

    std::env::set_var("FRAMEGRAB_CONFIG", file.path());
    std::env::set_var("FRAMEGRAB_CAMERA_DEVICE", "/dev/video2");
    std::env::set_var("FRAMEGRAB_JPEG_QUALITY", "95");

    let cfg = ToolConfig::load().expect("load config");

    assert_eq!(cfg.camera.device, "/dev/video2");
    assert_eq!(cfg.camera.target_fps, 15);
    assert_eq!(cfg.camera.width, 800);
    assert_eq!(cfg.camera.height, 600);
    assert_eq!(cfg.http.addr, "0.0.0.0:9000");
    assert_eq!(cfg.http.frame_interval_ms, 50);
    assert_eq!(cfg.jpeg_quality, 95);

    clear_env();
}

#[test]
fn rejects_invalid_values() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    std::env::set_var("FRAMEGRAB_JPEG_QUALITY", "0");
    assert!(ToolConfig::load().is_err());

    std::env::set_var("FRAMEGRAB_JPEG_QUALITY", "80");
    std::env::set_var("FRAMEGRAB_TARGET_FPS", "0");
    assert!(ToolConfig::load().is_err());

    std::env::set_var("FRAMEGRAB_TARGET_FPS", "not-a-number");
    assert!(ToolConfig::load().is_err());

    clear_env();
}
