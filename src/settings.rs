//! Persisted player settings.
//!
//! One JSON document holding playback mode, volume, video adjustments
//! (keyed by adjustment name), and the subtitle font. Loaded once at
//! startup — a missing file is normal, a corrupt one is a warning and
//! defaults — and saved at shutdown.

use crate::subtitle::SubtitleFont;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const SETTINGS_FILE: &str = "player_settings.json";

pub const DEFAULT_VOLUME: u8 = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// `PlaybackMode` integer code (0 = normal).
    #[serde(default)]
    pub playback_mode: u8,
    #[serde(default = "default_volume")]
    pub volume: u8,
    /// Slider values (−100..=100) keyed by adjustment name.
    #[serde(default)]
    pub video_adjustments: BTreeMap<String, i32>,
    #[serde(default)]
    pub subtitle_font: SubtitleFont,
}

fn default_volume() -> u8 {
    DEFAULT_VOLUME
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            playback_mode: 0,
            volume: DEFAULT_VOLUME,
            video_adjustments: BTreeMap::new(),
            subtitle_font: SubtitleFont::default(),
        }
    }
}

impl Settings {
    /// Load settings from a file, or defaults if it is missing or corrupt.
    pub fn load_from(path: &Path) -> Self {
        if path.exists() {
            match fs::read_to_string(path) {
                Ok(data) => match serde_json::from_str(&data) {
                    Ok(settings) => return settings,
                    Err(e) => eprintln!("Warning: corrupt settings file, using defaults: {}", e),
                },
                Err(e) => eprintln!("Warning: could not read settings file: {}", e),
            }
        }
        Settings::default()
    }

    /// Persist settings to a file.
    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        let json =
            serde_json::to_string_pretty(self).map_err(|e| format!("Serialize error: {}", e))?;
        fs::write(path, json).map_err(|e| format!("Write error: {}", e))?;
        Ok(())
    }
}

/// Default settings location: the user config directory, falling back to
/// the working directory.
pub fn default_settings_path() -> PathBuf {
    match dirs::config_dir() {
        Some(dir) => dir.join("rhythms").join(SETTINGS_FILE),
        None => PathBuf::from(SETTINGS_FILE),
    }
}
