//! Video adjustments and display options.
//!
//! Sliders run −100..=100 in the UI; each adjustment maps deterministically
//! onto the engine's native range before the engine ever sees it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A tunable video property. Names double as keys in the settings file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VideoAdjustment {
    Contrast,
    Brightness,
    Hue,
    Saturation,
    Gamma,
}

pub const ALL_ADJUSTMENTS: [VideoAdjustment; 5] = [
    VideoAdjustment::Contrast,
    VideoAdjustment::Brightness,
    VideoAdjustment::Hue,
    VideoAdjustment::Saturation,
    VideoAdjustment::Gamma,
];

impl fmt::Display for VideoAdjustment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl VideoAdjustment {
    pub fn name(&self) -> &'static str {
        match self {
            VideoAdjustment::Contrast => "Contrast",
            VideoAdjustment::Brightness => "Brightness",
            VideoAdjustment::Hue => "Hue",
            VideoAdjustment::Saturation => "Saturation",
            VideoAdjustment::Gamma => "Gamma",
        }
    }

    /// Parse a settings-file key back into an adjustment.
    pub fn from_name(name: &str) -> Option<Self> {
        ALL_ADJUSTMENTS
            .iter()
            .copied()
            .find(|a| a.name().eq_ignore_ascii_case(name))
    }

    /// Map a −100..=100 slider value onto the engine's native range.
    ///
    /// Hue is angular (−180..180 degrees). The rest are multiplicative
    /// controls running 0.0..2.0 where 1.0 is the identity, so slider 0
    /// must land exactly on 1.0.
    pub fn to_native(&self, value: i32) -> f32 {
        let v = value.clamp(-100, 100) as f32;
        match self {
            VideoAdjustment::Hue => v * 1.8,
            _ => 1.0 + v / 100.0,
        }
    }
}

/// Aspect ratio choices offered by the UI. "Default" hands control back to
/// the engine (None on the capability surface).
pub const ASPECT_RATIOS: [&str; 6] = ["Default", "16:9", "4:3", "1:1", "16:10", "2.35:1"];

/// Translate a UI aspect-ratio choice into the engine argument.
pub fn aspect_ratio_arg(choice: &str) -> Option<&str> {
    if choice.eq_ignore_ascii_case("default") {
        None
    } else {
        Some(choice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for adj in ALL_ADJUSTMENTS {
            assert_eq!(VideoAdjustment::from_name(adj.name()), Some(adj));
        }
        assert_eq!(VideoAdjustment::from_name("contrast"), Some(VideoAdjustment::Contrast));
        assert_eq!(VideoAdjustment::from_name("Sharpness"), None);
    }

    #[test]
    fn slider_zero_is_identity() {
        assert_eq!(VideoAdjustment::Contrast.to_native(0), 1.0);
        assert_eq!(VideoAdjustment::Gamma.to_native(0), 1.0);
        assert_eq!(VideoAdjustment::Hue.to_native(0), 0.0);
    }

    #[test]
    fn slider_endpoints_map_to_native_endpoints() {
        assert_eq!(VideoAdjustment::Brightness.to_native(-100), 0.0);
        assert_eq!(VideoAdjustment::Brightness.to_native(100), 2.0);
        assert_eq!(VideoAdjustment::Hue.to_native(-100), -180.0);
        assert_eq!(VideoAdjustment::Hue.to_native(100), 180.0);
    }

    #[test]
    fn out_of_range_sliders_clamp() {
        assert_eq!(VideoAdjustment::Saturation.to_native(500), 2.0);
        assert_eq!(VideoAdjustment::Hue.to_native(-500), -180.0);
    }

    #[test]
    fn default_aspect_means_engine_choice() {
        assert_eq!(aspect_ratio_arg("Default"), None);
        assert_eq!(aspect_ratio_arg("default"), None);
        assert_eq!(aspect_ratio_arg("16:9"), Some("16:9"));
    }
}
