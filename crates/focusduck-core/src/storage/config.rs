//! TOML-based engine configuration.
//!
//! Stores tuning knobs for:
//! - Idle/warning thresholds and heartbeat grace window
//! - Duck animation stage durations
//! - Session defaults (goal, tick length)
//!
//! Configuration is stored at `~/.config/focusduck/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::ConfigError;

/// Activity detection thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionConfig {
    #[serde(default = "default_warning_secs")]
    pub warning_secs: u64,
    #[serde(default = "default_idle_secs")]
    pub idle_secs: u64,
    /// How long a companion window's last heartbeat keeps the idle veto alive.
    #[serde(default = "default_heartbeat_grace_secs")]
    pub heartbeat_grace_secs: u64,
    /// 0 disables debouncing of visibility changes.
    #[serde(default)]
    pub visibility_debounce_ms: u64,
}

/// Duck animation stage durations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationConfig {
    #[serde(default = "default_falling_ms")]
    pub falling_ms: u64,
    #[serde(default = "default_ghost_after_ms")]
    pub ghost_after_ms: u64,
    #[serde(default = "default_climbing_ms")]
    pub climbing_ms: u64,
    #[serde(default = "default_celebrating_ms")]
    pub celebrating_ms: u64,
    #[serde(default = "default_celebrating_return_ms")]
    pub celebrating_return_ms: u64,
}

/// Session defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_goal_secs")]
    pub default_goal_secs: u64,
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
}

/// Engine configuration.
///
/// Serialized to/from TOML at `~/.config/focusduck/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub detection: DetectionConfig,
    #[serde(default)]
    pub animation: AnimationConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

// Default functions
fn default_warning_secs() -> u64 {
    30
}
fn default_idle_secs() -> u64 {
    60
}
fn default_heartbeat_grace_secs() -> u64 {
    5
}
fn default_falling_ms() -> u64 {
    1_500
}
fn default_ghost_after_ms() -> u64 {
    10_000
}
fn default_climbing_ms() -> u64 {
    1_800
}
fn default_celebrating_ms() -> u64 {
    2_000
}
fn default_celebrating_return_ms() -> u64 {
    3_000
}
fn default_goal_secs() -> u64 {
    25 * 60
}
fn default_tick_ms() -> u64 {
    1_000
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            warning_secs: default_warning_secs(),
            idle_secs: default_idle_secs(),
            heartbeat_grace_secs: default_heartbeat_grace_secs(),
            visibility_debounce_ms: 0,
        }
    }
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            falling_ms: default_falling_ms(),
            ghost_after_ms: default_ghost_after_ms(),
            climbing_ms: default_climbing_ms(),
            celebrating_ms: default_celebrating_ms(),
            celebrating_return_ms: default_celebrating_return_ms(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_goal_secs: default_goal_secs(),
            tick_ms: default_tick_ms(),
        }
    }
}

impl Config {
    /// Path of the config file inside the data directory.
    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load config from the default path, falling back to defaults when the
    /// file does not exist yet.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load and validate config from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        std::fs::write(path, content).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Reject combinations the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.detection.warning_secs >= self.detection.idle_secs {
            return Err(ConfigError::InvalidValue {
                key: "detection.warning_secs".into(),
                message: format!(
                    "must be lower than detection.idle_secs ({})",
                    self.detection.idle_secs
                ),
            });
        }
        if self.session.tick_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "session.tick_ms".into(),
                message: "must be greater than zero".into(),
            });
        }
        Ok(())
    }
}
