use std::sync::Mutex;

use tempfile::NamedTempFile;

use person_blocker::config::BlockerConfig;

static ENV_LOCK: Mutex<()> = Mutex::new(());

fn clear_env() {
    for key in [
        "PERSON_BLOCKER_CONFIG",
        "PERSON_BLOCKER_MODEL",
        "PERSON_BLOCKER_WEIGHTS_URL",
        "PERSON_BLOCKER_BACKEND",
        "PERSON_BLOCKER_FACE_MODEL",
        "PERSON_BLOCKER_STILL",
        "PERSON_BLOCKER_GIF",
        "PERSON_BLOCKER_FRAMES",
    ] {
        std::env::remove_var(key);
    }
}

#[test]
fn defaults_apply_without_config_or_env() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let cfg = BlockerConfig::load().expect("load config");
    assert_eq!(cfg.backend, "stub");
    assert_eq!(cfg.model_path.to_string_lossy(), "mask_rcnn_coco.onnx");
    assert_eq!(cfg.output.still.to_string_lossy(), "person_blocked.png");
    assert_eq!(cfg.output.gif.to_string_lossy(), "person_blocked.gif");
    assert_eq!(cfg.output.frames, 10);
    assert_eq!(cfg.model_input, (800, 800));
    assert!(cfg.weights_url.is_none());

    clear_env();
}

#[test]
fn loads_config_from_file_and_env_overrides() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let mut file = NamedTempFile::new().expect("temp config");
    let toml = r#"
        model_path = "models/maskrcnn.onnx"
        weights_url = "https://models.example/maskrcnn.onnx"
        backend = "stub"

        [model_input]
        width = 640
        height = 640

        [output]
        still = "blocked.png"
        gif = "blocked.gif"
        frames = 15
    "#;
    std::io::Write::write_all(&mut file, toml.as_bytes()).expect("write config");

    std::env::set_var("PERSON_BLOCKER_CONFIG", file.path());
    std::env::set_var("PERSON_BLOCKER_FRAMES", "30");
    std::env::set_var("PERSON_BLOCKER_GIF", "override.gif");

    let cfg = BlockerConfig::load().expect("load config");

    assert_eq!(cfg.model_path.to_string_lossy(), "models/maskrcnn.onnx");
    assert_eq!(
        cfg.weights_url.as_deref(),
        Some("https://models.example/maskrcnn.onnx")
    );
    assert_eq!(cfg.backend, "stub");
    assert_eq!(cfg.model_input, (640, 640));
    assert_eq!(cfg.output.still.to_string_lossy(), "blocked.png");
    assert_eq!(cfg.output.gif.to_string_lossy(), "override.gif");
    assert_eq!(cfg.output.frames, 30);

    clear_env();
}

#[test]
fn unknown_backend_is_rejected_at_load() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    std::env::set_var("PERSON_BLOCKER_BACKEND", "darknet");
    let err = BlockerConfig::load().expect_err("backend should be rejected");
    assert!(err.to_string().contains("unknown backend"));

    clear_env();
}

#[test]
fn zero_frames_are_rejected_at_load() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    std::env::set_var("PERSON_BLOCKER_FRAMES", "0");
    let err = BlockerConfig::load().expect_err("zero frames should be rejected");
    assert!(err.to_string().contains("frame count"));

    clear_env();
}
