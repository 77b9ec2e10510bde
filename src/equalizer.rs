//! Ten-band equalizer state and presets.
//!
//! Band amplitudes are held in dB (±20). Applying a band to the engine
//! resolves the engine's own reported band list by nearest frequency —
//! a linear scan with first-seen tie-break, so the mapping is deterministic
//! regardless of how the backend lays out its bands.

use crate::media_engine::{EngineResult, MediaEngine};
use std::fmt;

/// Canonical UI band frequencies, low to high, in Hz.
pub const BAND_FREQUENCIES: [f32; 10] = [
    60.0, 170.0, 310.0, 600.0, 1000.0, 3000.0, 6000.0, 12000.0, 14000.0, 16000.0,
];

pub const AMP_MIN_DB: f32 = -20.0;
pub const AMP_MAX_DB: f32 = 20.0;

// ── Presets ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    Flat,
    Classical,
    Rock,
    Pop,
    Jazz,
    Electronic,
}

pub const ALL_PRESETS: [Preset; 6] = [
    Preset::Flat,
    Preset::Classical,
    Preset::Rock,
    Preset::Pop,
    Preset::Jazz,
    Preset::Electronic,
];

impl Preset {
    /// Fixed per-band dB values, in `BAND_FREQUENCIES` order.
    pub fn amps_db(&self) -> [f32; 10] {
        match self {
            Preset::Flat => [0.0; 10],
            Preset::Classical => [-1.0, -1.0, 0.0, 0.0, 0.0, 0.0, -5.0, -5.0, -5.0, -6.0],
            Preset::Rock => [8.0, 5.0, -5.0, -8.0, -3.0, 4.0, 8.0, 11.0, 11.0, 11.0],
            Preset::Pop => [-2.0, -1.0, 0.0, 2.0, 4.0, 4.0, 2.0, -1.0, -1.0, -1.0],
            Preset::Jazz => [0.0, 0.0, 0.0, 4.0, -2.0, -2.0, 0.0, 2.0, 3.0, 4.0],
            Preset::Electronic => [4.0, 3.0, 1.0, 0.0, -2.0, 4.0, 6.0, 8.0, 8.0, 8.0],
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Preset::Flat => "Flat",
            Preset::Classical => "Classical",
            Preset::Rock => "Rock",
            Preset::Pop => "Pop",
            Preset::Jazz => "Jazz",
            Preset::Electronic => "Electronic",
        }
    }

    pub fn from_str_loose(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "flat" => Ok(Preset::Flat),
            "classical" => Ok(Preset::Classical),
            "rock" => Ok(Preset::Rock),
            "pop" => Ok(Preset::Pop),
            "jazz" => Ok(Preset::Jazz),
            "electronic" => Ok(Preset::Electronic),
            _ => Err(format!(
                "Unknown preset '{}'. Expected: flat, classical, rock, pop, jazz, electronic",
                s
            )),
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ── Equalizer state ──────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Equalizer {
    amps_db: [f32; 10],
}

impl Default for Equalizer {
    fn default() -> Self {
        Equalizer { amps_db: [0.0; 10] }
    }
}

impl Equalizer {
    pub fn new() -> Self {
        Equalizer::default()
    }

    pub fn amps_db(&self) -> &[f32; 10] {
        &self.amps_db
    }

    /// Set one band (by canonical frequency) and push it to the engine.
    /// Unknown frequencies are rejected; amplitude is clamped to ±20 dB.
    pub fn set_band(
        &mut self,
        engine: &mut dyn MediaEngine,
        frequency: f32,
        amp_db: f32,
    ) -> Result<(), String> {
        let slot = BAND_FREQUENCIES
            .iter()
            .position(|&f| f == frequency)
            .ok_or_else(|| format!("No {} Hz band", frequency))?;
        let amp = amp_db.clamp(AMP_MIN_DB, AMP_MAX_DB);
        self.amps_db[slot] = amp;
        apply_band(engine, frequency, amp).map_err(|e| e.to_string())
    }

    /// Write a preset's values into every band, engine included.
    pub fn apply_preset(
        &mut self,
        engine: &mut dyn MediaEngine,
        preset: Preset,
    ) -> Result<(), String> {
        for (&freq, &amp) in BAND_FREQUENCIES.iter().zip(preset.amps_db().iter()) {
            self.set_band(engine, freq, amp)?;
        }
        Ok(())
    }

    /// Back to flat.
    pub fn reset(&mut self, engine: &mut dyn MediaEngine) -> Result<(), String> {
        self.apply_preset(engine, Preset::Flat)
    }
}

/// Resolve the engine band closest to `frequency` and set its amplitude.
fn apply_band(engine: &mut dyn MediaEngine, frequency: f32, amp_db: f32) -> EngineResult<()> {
    let index = closest_band_index(engine, frequency)?;
    engine.set_band_amp(index, amp_db)
}

/// Nearest-frequency search over the engine's reported bands. Linear scan;
/// on a tie the earlier index wins.
pub fn closest_band_index(engine: &dyn MediaEngine, frequency: f32) -> EngineResult<usize> {
    let count = engine.band_count()?;
    let mut closest = 0;
    let mut smallest_diff = f32::INFINITY;
    for i in 0..count {
        let diff = (engine.band_frequency(i)? - frequency).abs();
        if diff < smallest_diff {
            smallest_diff = diff;
            closest = i;
        }
    }
    Ok(closest)
}
