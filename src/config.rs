use anyhow::{bail, Result};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::capture::CursorVisibility;
use crate::encoder::DEFAULT_PROFILES;

/// Environment prefix for overrides, e.g. `SCREEN_RECORDER__SAVE__PROMPT_BEFORE_SAVE=false`
pub const ENV_PREFIX: &str = "SCREEN_RECORDER";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub recorder: RecorderConfig,
    pub capture: CaptureConfig,
    pub save: SaveConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RecorderConfig {
    /// File name prefix for saved recordings
    pub file_prefix: String,
    /// Encoding preferences, richest first
    pub encoding_profiles: Vec<String>,
    /// Elapsed-time display refresh interval in milliseconds
    pub timer_interval_ms: u64,
}

impl RecorderConfig {
    pub fn timer_interval(&self) -> Duration {
        Duration::from_millis(self.timer_interval_ms)
    }
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            file_prefix: "recording".to_string(),
            encoding_profiles: DEFAULT_PROFILES.iter().map(|p| p.to_string()).collect(),
            timer_interval_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    pub cursor: CursorVisibility,
    /// Request an audio track alongside video
    pub audio: bool,
    pub noise_suppression: bool,
    pub echo_cancellation: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            cursor: CursorVisibility::Always,
            audio: true,
            noise_suppression: true,
            echo_cancellation: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SaveConfig {
    /// Ask before opening the file picker when no location was pre-selected
    pub prompt_before_save: bool,
    /// Fallback download directory (`~` is expanded)
    pub downloads_dir: String,
    /// Directory the file-backed save dialog resolves to (`~` is expanded)
    pub save_dir: String,
}

impl SaveConfig {
    pub fn downloads_path(&self) -> PathBuf {
        expand(&self.downloads_dir)
    }

    pub fn save_path(&self) -> PathBuf {
        expand(&self.save_dir)
    }
}

impl Default for SaveConfig {
    fn default() -> Self {
        Self {
            prompt_before_save: true,
            downloads_dir: "~/Downloads".to_string(),
            save_dir: "~/Videos".to_string(),
        }
    }
}

fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}

impl Config {
    /// Load from an optional config file (any format the `config` crate
    /// detects by extension) layered under `SCREEN_RECORDER__*` variables
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?;

        let cfg: Self = settings.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.recorder.file_prefix.trim().is_empty() {
            bail!("recorder.file_prefix cannot be empty");
        }

        if self.recorder.encoding_profiles.is_empty() {
            bail!("recorder.encoding_profiles must list at least one media type");
        }

        if self.recorder.timer_interval_ms == 0 {
            bail!("recorder.timer_interval_ms must be greater than zero");
        }

        Ok(())
    }
}
