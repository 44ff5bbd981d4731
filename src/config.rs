use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::constants::{
    CONTROLS_HIDE_DELAY_SECS, DEFAULT_SEEK_STEP_MS, DEMO_STREAM_URL, POSITION_TICK_INTERVAL_MS,
    SEEK_OVERLAY_DISPLAY_MS,
};
use crate::utils::errors::PlayerError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub playback: PlaybackConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Engine backend to construct ("gstreamer").
    #[serde(default = "default_engine_backend")]
    pub engine_backend: String,

    #[serde(default = "default_demo_stream_url")]
    pub demo_stream_url: String,

    #[serde(default = "default_seek_step")]
    pub seek_step_ms: u64,

    #[serde(default = "default_position_tick")]
    pub position_tick_ms: u64,

    #[serde(default = "default_seek_overlay_display")]
    pub seek_overlay_display_ms: u64,

    #[serde(default = "default_controls_hide_delay")]
    pub controls_hide_delay_secs: u64,
}

fn default_engine_backend() -> String {
    "gstreamer".to_string()
}

fn default_demo_stream_url() -> String {
    DEMO_STREAM_URL.to_string()
}

fn default_seek_step() -> u64 {
    DEFAULT_SEEK_STEP_MS
}

fn default_position_tick() -> u64 {
    POSITION_TICK_INTERVAL_MS
}

fn default_seek_overlay_display() -> u64 {
    SEEK_OVERLAY_DISPLAY_MS
}

fn default_controls_hide_delay() -> u64 {
    CONTROLS_HIDE_DELAY_SECS
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            engine_backend: default_engine_backend(),
            demo_stream_url: default_demo_stream_url(),
            seek_step_ms: default_seek_step(),
            position_tick_ms: default_position_tick(),
            seek_overlay_display_ms: default_seek_overlay_display(),
            controls_hide_delay_secs: default_controls_hide_delay(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            debug!("Loading config from {:?}", config_path);
            let config = Self::from_file(&config_path)?;
            info!("Config loaded successfully");
            Ok(config)
        } else {
            info!("No config file found, using defaults");
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;
        self.write_to(&config_path)?;
        debug!("Config saved to {:?}", config_path);
        Ok(())
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).context("Failed to read config file")?;
        toml::from_str(&contents).context("Failed to parse config file")
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, contents).context("Failed to write config file")?;
        Ok(())
    }

    /// Rejects values the coordinator cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.playback.position_tick_ms == 0 {
            return Err(
                PlayerError::Configuration("position_tick_ms must be non-zero".to_string()).into(),
            );
        }
        if self.playback.seek_step_ms == 0 {
            return Err(
                PlayerError::Configuration("seek_step_ms must be non-zero".to_string()).into(),
            );
        }
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Failed to find config directory")?;
        Ok(config_dir.join("playhead").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.playback.engine_backend, "gstreamer");
        assert_eq!(config.playback.seek_step_ms, 10_000);
        assert_eq!(config.playback.position_tick_ms, 1_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [playback]
            seek_step_ms = 5000
            "#,
        )
        .unwrap();

        assert_eq!(config.playback.seek_step_ms, 5_000);
        assert_eq!(config.playback.position_tick_ms, 1_000);
        assert_eq!(config.playback.demo_stream_url, DEMO_STREAM_URL);
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.playback.engine_backend = "gstreamer".to_string();
        config.playback.controls_hide_delay_secs = 7;
        config.write_to(&path).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded.playback.controls_hide_delay_secs, 7);
        assert_eq!(loaded.playback.seek_step_ms, config.playback.seek_step_ms);
    }

    #[test]
    fn test_validate_rejects_zero_tick() {
        let mut config = Config::default();
        config.playback.position_tick_ms = 0;
        assert!(config.validate().is_err());
    }
}
