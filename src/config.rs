//! Settings, loaded from an optional ~/.notaphone/config.yaml.

use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Sample rate used for offline rendering when none is configured.
pub const DEFAULT_OFFLINE_SAMPLE_RATE: u32 = 44_100;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config io error: {0}")]
    Io(#[from] io::Error),
    #[error("malformed config: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Playback settings loaded from ~/.notaphone/config.yaml.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Settings {
    /// Offset from "now" to the first scheduled tone.
    #[serde(default = "default_lookahead")]
    pub lookahead_secs: f64,
    /// Extra time a melodic tone sounds past its notated length.
    #[serde(default = "default_release_tail")]
    pub release_tail_secs: f64,
    #[serde(default = "default_volume")]
    pub master_volume: f32,
    /// `None` uses the device default (44.1 kHz offline).
    #[serde(default)]
    pub sample_rate: Option<u32>,
    /// Seed for noise sources.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

fn default_lookahead() -> f64 {
    0.1
}

fn default_release_tail() -> f64 {
    0.1
}

fn default_volume() -> f32 {
    0.8
}

fn default_seed() -> u64 {
    42
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            lookahead_secs: default_lookahead(),
            release_tail_secs: default_release_tail(),
            master_volume: default_volume(),
            sample_rate: None,
            seed: default_seed(),
        }
    }
}

impl Settings {
    /// Load from `path`. A missing file gives the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let settings: Settings = serde_yaml::from_str(&content)?;
        Ok(settings.sanitized())
    }

    /// Load from [`default_config_path`], or defaults when there is no home
    /// directory.
    pub fn load_default() -> Result<Self, ConfigError> {
        match default_config_path() {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    /// Write as YAML, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_yaml::to_string(self)?)?;
        Ok(())
    }

    /// Sample rate for offline rendering.
    pub fn offline_sample_rate(&self) -> u32 {
        self.sample_rate.unwrap_or(DEFAULT_OFFLINE_SAMPLE_RATE)
    }

    /// Clamp values into their usable ranges. Non-finite values fall back
    /// to their defaults.
    pub fn sanitized(mut self) -> Self {
        if !self.master_volume.is_finite() {
            self.master_volume = default_volume();
        }
        if !self.lookahead_secs.is_finite() {
            self.lookahead_secs = default_lookahead();
        }
        if !self.release_tail_secs.is_finite() {
            self.release_tail_secs = default_release_tail();
        }
        self.master_volume = self.master_volume.clamp(0.0, 1.0);
        self.lookahead_secs = self.lookahead_secs.max(0.0);
        self.release_tail_secs = self.release_tail_secs.max(0.0);
        self.sample_rate = self.sample_rate.filter(|&sr| sr > 0);
        self
    }
}

/// ~/.notaphone/config.yaml
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".notaphone").join("config.yaml"))
}
