//! Subtitle track selection, timing, and the persisted font descriptor.

use serde::{Deserialize, Serialize};

/// Font used to render subtitles. Persisted across sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtitleFont {
    pub family: String,
    pub size: u32,
    pub bold: bool,
    pub italic: bool,
}

impl Default for SubtitleFont {
    fn default() -> Self {
        SubtitleFont {
            family: "Sans".to_string(),
            size: 12,
            bold: false,
            italic: false,
        }
    }
}

/// Reference point size; the engine takes a relative scale.
const BASE_FONT_SIZE: f32 = 12.0;

impl SubtitleFont {
    /// Engine text scale for this font size (1.0 at 12 pt).
    pub fn engine_scale(&self) -> f32 {
        self.size as f32 / BASE_FONT_SIZE
    }
}

/// Map a UI track selection to the engine's track argument.
/// Selection 0 is "Disabled" (engine track −1); selection n picks the
/// engine's track n−1.
pub fn engine_track_for_selection(selection: usize) -> i32 {
    if selection == 0 {
        -1
    } else {
        (selection - 1) as i32
    }
}

/// UI track list: "Disabled" followed by the engine-reported track names.
pub fn selection_names(engine_tracks: &[String]) -> Vec<String> {
    let mut names = Vec::with_capacity(engine_tracks.len() + 1);
    names.push("Disabled".to_string());
    names.extend(engine_tracks.iter().cloned());
    names
}
