//! Settings file handling.
//!
//! Settings load from `<config dir>/openpad/config.toml` and fall back to
//! defaults when the file is absent. A malformed file is reported, not
//! papered over silently.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Tunable input behavior, applied to every button of a frame.
#[derive(Deserialize, Serialize, Clone, Debug)]
#[serde(default)]
pub struct InputSettings {
    /// Control loop period the application should run at.
    pub tick_interval_ms: u64,
    /// Hold duration before long-press fires.
    pub long_press_threshold_ms: u32,
    /// Spacing between repeat-press firings.
    pub repeat_cooldown_ms: u32,
    /// Stick deflection below which axes read zero.
    pub joystick_deadzone: f32,
}

impl Default for InputSettings {
    fn default() -> Self {
        Self {
            tick_interval_ms: 25,
            long_press_threshold_ms: 500,
            repeat_cooldown_ms: 50,
            joystick_deadzone: 0.05,
        }
    }
}

impl InputSettings {
    /// Default location: `<config dir>/openpad/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("openpad").join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let settings = toml::from_str(&contents)?;
        info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Loads from the default path, falling back to defaults when the file
    /// is missing. Parse errors are logged and fall back too, so a bad
    /// config cannot keep the controller from coming up.
    pub fn load_or_default() -> Self {
        let Some(path) = Self::default_path() else {
            debug!("no config directory available, using default settings");
            return Self::default();
        };
        if !path.exists() {
            debug!("no config file at {}, using default settings", path.display());
            return Self::default();
        }
        match Self::load(&path) {
            Ok(settings) => settings,
            Err(e) => {
                warn!("ignoring config file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_button_defaults() {
        let settings = InputSettings::default();
        assert_eq!(settings.long_press_threshold_ms, crate::button::DEFAULT_LONG_PRESS_THRESHOLD_MS);
        assert_eq!(settings.repeat_cooldown_ms, crate::button::DEFAULT_REPEAT_COOLDOWN_MS);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let settings: InputSettings = toml::from_str("long_press_threshold_ms = 750").unwrap();
        assert_eq!(settings.long_press_threshold_ms, 750);
        assert_eq!(settings.repeat_cooldown_ms, 50);
        assert_eq!(settings.tick_interval_ms, 25);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let result: Result<InputSettings, _> = toml::from_str("long_press_threshold_ms = \"soon\"");
        assert!(result.is_err());
    }
}
