//! Application configuration: the directories the scanner, matcher, and
//! annotation engine operate on. Built explicitly at startup and passed into
//! calls, never read from an ambient global.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default location the configuration is persisted to.
pub const DEFAULT_CONFIG_PATH: &str = "mp4-labeler.toml";

/// Configuration for the annotation tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory scanned recursively for video files.
    pub video_dir: PathBuf,

    /// Directory human-approved annotations are written to.
    pub output_dir: PathBuf,

    /// Optional directory of pre-computed annotation drafts.
    pub pre_annotation_dir: Option<PathBuf>,

    /// Optional read-only directory of model-generated annotations.
    pub model_annotation_dir: Option<PathBuf>,

    /// Optional task file restricting which video stems are surfaced.
    pub task_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            video_dir: PathBuf::new(),
            output_dir: PathBuf::from("./annotations"),
            pre_annotation_dir: None,
            model_annotation_dir: None,
            task_file: None,
        }
    }
}

impl Config {
    /// Load configuration from the first parsable file in the search list,
    /// falling back to environment overrides on top of the defaults. Also
    /// returns the resolved config path, which later saves are written to.
    pub fn load() -> (Self, PathBuf) {
        let config_paths = [DEFAULT_CONFIG_PATH, "config/mp4-labeler.toml"];

        for path in &config_paths {
            if let Ok(config_str) = std::fs::read_to_string(path) {
                match toml::from_str::<Config>(&config_str) {
                    Ok(mut config) => {
                        tracing::info!("Loaded configuration from: {}", path);
                        config.normalize();
                        return (config, PathBuf::from(path));
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse config file {}: {}", path, e);
                    }
                }
            }
        }

        let mut config = Self::from_env();
        config.normalize();
        (config, PathBuf::from(DEFAULT_CONFIG_PATH))
    }

    /// Load configuration from an explicit file path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
        let mut config: Config = toml::from_str(&config_str)
            .map_err(|e| anyhow!("failed to parse config file {}: {}", path.display(), e))?;
        config.normalize();
        Ok(config)
    }

    /// Defaults overridden by `MP4_LABELER_*` environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(video_dir) = std::env::var("MP4_LABELER_VIDEO_DIR") {
            config.video_dir = PathBuf::from(video_dir);
        }
        if let Ok(output_dir) = std::env::var("MP4_LABELER_OUTPUT_DIR") {
            config.output_dir = PathBuf::from(output_dir);
        }
        if let Ok(pre_dir) = std::env::var("MP4_LABELER_PRE_ANNOTATION_DIR") {
            config.pre_annotation_dir = Some(PathBuf::from(pre_dir));
        }
        if let Ok(model_dir) = std::env::var("MP4_LABELER_MODEL_ANNOTATION_DIR") {
            config.model_annotation_dir = Some(PathBuf::from(model_dir));
        }
        if let Ok(task_file) = std::env::var("MP4_LABELER_TASK_FILE") {
            config.task_file = Some(PathBuf::from(task_file));
        }

        config
    }

    /// Persist the configuration as pretty-printed TOML.
    pub async fn save(&self, path: &Path) -> Result<()> {
        let config_str = toml::to_string_pretty(self)
            .map_err(|e| anyhow!("failed to serialize config: {}", e))?;

        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() {
                tokio::fs::create_dir_all(dir)
                    .await
                    .map_err(|e| anyhow!("failed to create directory {}: {}", dir.display(), e))?;
            }
        }

        tokio::fs::write(path, config_str)
            .await
            .map_err(|e| anyhow!("failed to save config file {}: {}", path.display(), e))?;

        tracing::info!("Configuration saved to: {}", path.display());
        Ok(())
    }

    /// Strip the quoting and whitespace that paths pasted from a file
    /// manager tend to carry, and drop optional paths that end up empty.
    pub fn normalize(&mut self) {
        self.video_dir = clean_path_buf(&self.video_dir);
        self.output_dir = clean_path_buf(&self.output_dir);
        self.pre_annotation_dir = take_cleaned(&mut self.pre_annotation_dir);
        self.model_annotation_dir = take_cleaned(&mut self.model_annotation_dir);
        self.task_file = take_cleaned(&mut self.task_file);
    }

    /// Normalize, then check that the required directories are set and the
    /// referenced paths exist.
    pub fn validate(&mut self) -> Result<()> {
        self.normalize();

        if self.video_dir.as_os_str().is_empty() {
            return Err(anyhow!("video directory cannot be empty"));
        }
        if self.output_dir.as_os_str().is_empty() {
            return Err(anyhow!("output directory cannot be empty"));
        }

        if !self.video_dir.exists() {
            return Err(anyhow!(
                "video directory does not exist: {}",
                self.video_dir.display()
            ));
        }

        if let Some(pre_dir) = &self.pre_annotation_dir {
            if !pre_dir.exists() {
                return Err(anyhow!(
                    "pre-annotation directory does not exist: {}",
                    pre_dir.display()
                ));
            }
        }

        if let Some(task_file) = &self.task_file {
            if !task_file.exists() {
                return Err(anyhow!(
                    "task file does not exist: {}",
                    task_file.display()
                ));
            }
        }

        Ok(())
    }
}

/// Remove surrounding whitespace and matching single or double quotes.
pub fn clean_path(path: &str) -> String {
    let path = path.trim();

    if path.len() >= 2 {
        let bytes = path.as_bytes();
        let first = bytes[0];
        let last = bytes[path.len() - 1];
        if (first == b'\'' && last == b'\'') || (first == b'"' && last == b'"') {
            return path[1..path.len() - 1].to_string();
        }
    }

    path.to_string()
}

fn clean_path_buf(path: &Path) -> PathBuf {
    PathBuf::from(clean_path(&path.to_string_lossy()))
}

fn take_cleaned(path: &mut Option<PathBuf>) -> Option<PathBuf> {
    path.take()
        .map(|p| clean_path_buf(&p))
        .filter(|p| !p.as_os_str().is_empty())
}
