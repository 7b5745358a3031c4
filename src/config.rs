//! Run configuration.
//!
//! Defaults < optional TOML file (path from `PERSON_BLOCKER_CONFIG`) < env
//! overrides. CLI flags sit on top of all three and are applied by the
//! binary.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use serde::Deserialize;

const DEFAULT_MODEL_PATH: &str = "mask_rcnn_coco.onnx";
const DEFAULT_BACKEND: &str = "stub";
const DEFAULT_STILL_PATH: &str = "person_blocked.png";
const DEFAULT_GIF_PATH: &str = "person_blocked.gif";
const DEFAULT_FRAME_COUNT: usize = 10;
const DEFAULT_MODEL_INPUT: u32 = 800;

pub const KNOWN_BACKENDS: [&str; 2] = ["stub", "tract"];

#[derive(Debug, Deserialize, Default)]
struct BlockerConfigFile {
    model_path: Option<PathBuf>,
    weights_url: Option<String>,
    backend: Option<String>,
    face_model_path: Option<PathBuf>,
    model_input: Option<ModelInputFile>,
    output: Option<OutputConfigFile>,
}

#[derive(Debug, Deserialize, Default)]
struct ModelInputFile {
    width: Option<u32>,
    height: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
struct OutputConfigFile {
    still: Option<PathBuf>,
    gif: Option<PathBuf>,
    frames: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct BlockerConfig {
    pub model_path: PathBuf,
    pub weights_url: Option<String>,
    pub backend: String,
    /// ONNX face pipeline used by the tract face matcher, when configured.
    pub face_model_path: Option<PathBuf>,
    pub model_input: (u32, u32),
    pub output: OutputSettings,
}

#[derive(Debug, Clone)]
pub struct OutputSettings {
    pub still: PathBuf,
    pub gif: PathBuf,
    pub frames: usize,
}

impl BlockerConfig {
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("PERSON_BLOCKER_CONFIG").ok();
        let file_cfg = match config_path.as_deref() {
            Some(path) => Some(read_config_file(Path::new(path))?),
            None => None,
        };
        let mut cfg = Self::from_file(file_cfg.unwrap_or_default());
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: BlockerConfigFile) -> Self {
        let model_input = (
            file.model_input
                .as_ref()
                .and_then(|input| input.width)
                .unwrap_or(DEFAULT_MODEL_INPUT),
            file.model_input
                .as_ref()
                .and_then(|input| input.height)
                .unwrap_or(DEFAULT_MODEL_INPUT),
        );
        let output = OutputSettings {
            still: file
                .output
                .as_ref()
                .and_then(|output| output.still.clone())
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STILL_PATH)),
            gif: file
                .output
                .as_ref()
                .and_then(|output| output.gif.clone())
                .unwrap_or_else(|| PathBuf::from(DEFAULT_GIF_PATH)),
            frames: file
                .output
                .as_ref()
                .and_then(|output| output.frames)
                .unwrap_or(DEFAULT_FRAME_COUNT),
        };
        Self {
            model_path: file
                .model_path
                .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_PATH)),
            weights_url: file.weights_url,
            backend: file.backend.unwrap_or_else(|| DEFAULT_BACKEND.to_string()),
            face_model_path: file.face_model_path,
            model_input,
            output,
        }
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(path) = std::env::var("PERSON_BLOCKER_MODEL") {
            if !path.trim().is_empty() {
                self.model_path = PathBuf::from(path);
            }
        }
        if let Ok(url) = std::env::var("PERSON_BLOCKER_WEIGHTS_URL") {
            if !url.trim().is_empty() {
                self.weights_url = Some(url);
            }
        }
        if let Ok(backend) = std::env::var("PERSON_BLOCKER_BACKEND") {
            if !backend.trim().is_empty() {
                self.backend = backend;
            }
        }
        if let Ok(path) = std::env::var("PERSON_BLOCKER_FACE_MODEL") {
            if !path.trim().is_empty() {
                self.face_model_path = Some(PathBuf::from(path));
            }
        }
        if let Ok(still) = std::env::var("PERSON_BLOCKER_STILL") {
            if !still.trim().is_empty() {
                self.output.still = PathBuf::from(still);
            }
        }
        if let Ok(gif) = std::env::var("PERSON_BLOCKER_GIF") {
            if !gif.trim().is_empty() {
                self.output.gif = PathBuf::from(gif);
            }
        }
        if let Ok(frames) = std::env::var("PERSON_BLOCKER_FRAMES") {
            self.output.frames = frames
                .parse()
                .map_err(|_| anyhow!("PERSON_BLOCKER_FRAMES must be a positive integer"))?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.output.frames == 0 {
            return Err(anyhow!("frame count must be at least 1"));
        }
        if !KNOWN_BACKENDS.contains(&self.backend.as_str()) {
            return Err(anyhow!(
                "unknown backend '{}'; expected one of {:?}",
                self.backend,
                KNOWN_BACKENDS
            ));
        }
        if self.model_input.0 == 0 || self.model_input.1 == 0 {
            return Err(anyhow!("model input dimensions must be non-zero"));
        }
        Ok(())
    }
}

impl Default for BlockerConfig {
    fn default() -> Self {
        Self::from_file(BlockerConfigFile::default())
    }
}

fn read_config_file(path: &Path) -> Result<BlockerConfigFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let cfg = toml::from_str(&raw)
        .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?;
    Ok(cfg)
}
