//! Startup configuration
//!
//! Loaded once from the platform config directory, with fallback to
//! defaults on any error. The file is read-only: runtime preferences like
//! the sound toggle are in-memory and reset on the next run.

use std::fs;
use std::path::PathBuf;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

/// User-tunable settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Path to the pre-recorded chime asset
    pub chime_path: PathBuf,
    /// Path to the looping ambience asset
    pub ambience_path: PathBuf,
    /// Chime volume (0.0 - 1.0)
    pub chime_volume: f64,
    /// Ambience volume (0.0 - 1.0)
    pub ambience_volume: f64,
    /// Whether sound starts enabled
    pub sound_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            chime_path: PathBuf::from("assets/sounds/grandfather-chime.ogg"),
            ambience_path: PathBuf::from("assets/sounds/fireplace-loop.ogg"),
            chime_volume: 0.7,
            ambience_volume: 0.25,
            sound_enabled: true,
        }
    }
}

impl Settings {
    /// Load settings from the config file, or fall back to defaults.
    /// Missing or malformed files are logged, never fatal.
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            log::debug!("No config directory available, using default settings");
            return Self::default();
        };

        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    log::warn!("Malformed settings file {}: {}. Using defaults.", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => {
                log::debug!("No settings file at {}, using defaults", path.display());
                Self::default()
            }
        }
    }

    fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "timepiece").map(|dirs| dirs.config_dir().join("timepiece.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_volumes_in_range() {
        let s = Settings::default();
        assert!((0.0..=1.0).contains(&s.chime_volume));
        assert!((0.0..=1.0).contains(&s.ambience_volume));
        assert!(s.sound_enabled);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let s: Settings = serde_json::from_str(r#"{"chime_volume": 0.5}"#).unwrap();
        assert_eq!(s.chime_volume, 0.5);
        assert_eq!(s.ambience_path, Settings::default().ambience_path);
    }
}
