//! Game settings
//!
//! Read from an optional JSON file. Every field has a default, so a file only
//! needs the values it changes.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::consts::{WINDOW_HEIGHT, WINDOW_WIDTH};
use crate::tuning::{InvalidTuning, Tuning};

#[derive(thiserror::Error, Debug)]
pub enum SettingsError {
    #[error("failed to access settings file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("invalid settings file {path}: {source}")]
    Invalid {
        path: PathBuf,
        source: InvalidTuning,
    },
}

/// Game settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Window ===
    pub window_title: String,
    /// Initial inner size in physical pixels
    pub window_width: u32,
    pub window_height: u32,
    /// Wait for vertical blank when presenting
    pub vsync: bool,

    // === Assets ===
    /// Directory holding the texture files
    pub assets_dir: PathBuf,

    // === Gameplay ===
    /// Seed for the balloon layout jitter
    pub seed: u64,
    pub tuning: Tuning,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            window_title: "Balloon Shooter".to_string(),
            window_width: WINDOW_WIDTH,
            window_height: WINDOW_HEIGHT,
            vsync: true,

            assets_dir: PathBuf::from("assets"),

            seed: 12345,
            tuning: Tuning::default(),
        }
    }
}

impl Settings {
    /// Load settings from a JSON file
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: Self = serde_json::from_str(&json).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        settings
            .tuning
            .validate()
            .map_err(|source| SettingsError::Invalid {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(settings)
    }

    /// Load settings, falling back to defaults
    ///
    /// No path or a missing file gives the defaults quietly; a malformed file
    /// or out-of-range tuning is reported and ignored.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            log::info!("Using default settings");
            return Self::default();
        };

        match Self::load(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(SettingsError::Io { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                log::info!("No settings file at {}, using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                log::warn!("{e}; using defaults");
                Self::default()
            }
        }
    }

    /// Write settings as pretty JSON
    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let json = serde_json::to_string_pretty(self).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        std::fs::write(path, json).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let mut settings = Settings::default();
        settings.seed = 7;
        settings.tuning.target_jitter = 1.5;
        settings.vsync = false;

        settings.save(&path).unwrap();
        assert_eq!(Settings::load(&path).unwrap(), settings);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "window_width": 1024, "tuning": { "max_projectiles": 3 } }"#)
            .unwrap();

        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.window_width, 1024);
        assert_eq!(settings.window_height, WINDOW_HEIGHT);
        assert_eq!(settings.tuning.max_projectiles, 3);
        assert_eq!(settings.tuning.hit_radius, 2.0);
    }

    #[test]
    fn test_missing_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        assert!(matches!(
            Settings::load(&path),
            Err(SettingsError::Io { .. })
        ));
        assert_eq!(Settings::load_or_default(Some(&path)), Settings::default());
        assert_eq!(Settings::load_or_default(None), Settings::default());
    }

    #[test]
    fn test_malformed_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ window_width: ").unwrap();

        assert!(matches!(
            Settings::load(&path),
            Err(SettingsError::Parse { .. })
        ));
        assert_eq!(Settings::load_or_default(Some(&path)), Settings::default());
    }

    #[test]
    fn test_negative_velocity_cap_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "tuning": { "velocity_cap": -0.5 } }"#).unwrap();

        match Settings::load(&path) {
            Err(SettingsError::Invalid { source, .. }) => assert_eq!(source.field, "velocity_cap"),
            other => panic!("expected Invalid, got {other:?}"),
        }
        let settings = Settings::load_or_default(Some(&path));
        assert_eq!(settings.tuning.velocity_cap, 0.5);
    }

    #[test]
    fn test_stalled_projectiles_fall_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "seed": 9, "tuning": { "projectile_step": 0.0 } }"#).unwrap();

        let err = Settings::load(&path).unwrap_err();
        assert!(matches!(err, SettingsError::Invalid { .. }));
        assert!(err.to_string().contains("projectile_step"));
        assert_eq!(Settings::load_or_default(Some(&path)), Settings::default());
    }
}
