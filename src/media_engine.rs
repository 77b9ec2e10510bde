//! MediaEngine — the capability surface the playback controller consumes.
//!
//! Every method carries a default body returning `EngineError::Unsupported`,
//! so a backend implements only the capabilities it actually has. Callers
//! treat `Unsupported` as "skip the operation", never as a failure worth
//! surfacing to the user.

use crate::video::VideoAdjustment;
use std::fmt;
use std::path::{Path, PathBuf};

// ── Errors ───────────────────────────────────────────────────────────────────

/// Why an engine call did not take effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The backend does not implement this capability.
    Unsupported,
    /// No media is loaded, so the operation has nothing to act on.
    NoMedia,
    /// The backend attempted the operation and it failed.
    Failed(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Unsupported => write!(f, "not supported by this engine"),
            EngineError::NoMedia => write!(f, "no media loaded"),
            EngineError::Failed(msg) => write!(f, "{}", msg),
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;

// ── Capability surface ───────────────────────────────────────────────────────

/// The fixed set of calls the application makes into the external playback
/// engine. Created once at startup, dropped at shutdown, and only ever
/// touched from the event-loop thread.
pub trait MediaEngine {
    // Transport
    fn load(&mut self, _path: &Path) -> EngineResult<()> {
        Err(EngineError::Unsupported)
    }
    fn play(&mut self) -> EngineResult<()> {
        Err(EngineError::Unsupported)
    }
    fn pause(&mut self) -> EngineResult<()> {
        Err(EngineError::Unsupported)
    }
    fn stop(&mut self) -> EngineResult<()> {
        Err(EngineError::Unsupported)
    }
    fn is_playing(&self) -> bool {
        false
    }
    /// True once the loaded media has played through to its end.
    fn end_of_media(&self) -> bool {
        false
    }

    // Position
    fn seek_fraction(&mut self, _fraction: f64) -> EngineResult<()> {
        Err(EngineError::Unsupported)
    }
    fn position_fraction(&self) -> EngineResult<f64> {
        Err(EngineError::Unsupported)
    }
    fn time_ms(&self) -> EngineResult<i64> {
        Err(EngineError::Unsupported)
    }
    fn length_ms(&self) -> EngineResult<i64> {
        Err(EngineError::Unsupported)
    }
    fn set_time_ms(&mut self, _time_ms: i64) -> EngineResult<()> {
        Err(EngineError::Unsupported)
    }

    // Audio
    fn set_rate(&mut self, _rate: f32) -> EngineResult<()> {
        Err(EngineError::Unsupported)
    }
    fn set_volume(&mut self, _volume: u8) -> EngineResult<()> {
        Err(EngineError::Unsupported)
    }

    // Equalizer (band indices refer to the engine's own reported bands)
    fn band_count(&self) -> EngineResult<usize> {
        Err(EngineError::Unsupported)
    }
    fn band_frequency(&self, _index: usize) -> EngineResult<f32> {
        Err(EngineError::Unsupported)
    }
    fn set_band_amp(&mut self, _index: usize, _amp_db: f32) -> EngineResult<()> {
        Err(EngineError::Unsupported)
    }

    // Video
    fn set_adjustment(&mut self, _adjustment: VideoAdjustment, _native: f32) -> EngineResult<()> {
        Err(EngineError::Unsupported)
    }
    fn set_deinterlace(&mut self, _enabled: bool) -> EngineResult<()> {
        Err(EngineError::Unsupported)
    }
    fn set_aspect_ratio(&mut self, _ratio: Option<&str>) -> EngineResult<()> {
        Err(EngineError::Unsupported)
    }

    // Subtitles
    fn subtitle_track_count(&self) -> EngineResult<usize> {
        Err(EngineError::Unsupported)
    }
    fn subtitle_track_names(&self) -> EngineResult<Vec<String>> {
        Err(EngineError::Unsupported)
    }
    /// Track -1 disables subtitles.
    fn set_subtitle_track(&mut self, _track: i32) -> EngineResult<()> {
        Err(EngineError::Unsupported)
    }
    fn set_subtitle_delay_ms(&mut self, _delay_ms: i64) -> EngineResult<()> {
        Err(EngineError::Unsupported)
    }
    fn set_subtitle_file(&mut self, _path: &Path) -> EngineResult<()> {
        Err(EngineError::Unsupported)
    }
    fn set_subtitle_scale(&mut self, _scale: f32) -> EngineResult<()> {
        Err(EngineError::Unsupported)
    }
}

// ── Mock engine ──────────────────────────────────────────────────────────────

use std::cell::RefCell;
use std::rc::Rc;

/// Scriptable engine for headless tests. Cloning shares the underlying
/// state, so a test can keep a probe while `AppCore` owns the boxed copy
/// (single-threaded, like everything else touching the engine handle).
#[derive(Clone, Default)]
pub struct MockEngine {
    state: Rc<RefCell<MockState>>,
}

#[derive(Default)]
pub struct MockState {
    pub loaded: Option<PathBuf>,
    pub playing: bool,
    pub ended: bool,
    pub time_ms: i64,
    pub length_ms: i64,
    pub volume: u8,
    pub rate: f32,
    pub band_amps: Vec<f32>,
    pub subtitle_tracks: Vec<String>,
    pub subtitle_track: i32,
    pub subtitle_delay_ms: i64,
    pub subtitle_file: Option<PathBuf>,
    pub subtitle_scale: f32,
    pub adjustments: Vec<(VideoAdjustment, f32)>,
    pub deinterlace: bool,
    pub aspect_ratio: Option<String>,
    pub fail_next_load: bool,
    /// Every call that reached the engine, in order.
    pub calls: Vec<String>,
}

/// Band layout the mock reports, matching the canonical 10-band EQ.
const MOCK_BAND_FREQS: [f32; 10] = [
    60.0, 170.0, 310.0, 600.0, 1000.0, 3000.0, 6000.0, 12000.0, 14000.0, 16000.0,
];

impl MockEngine {
    pub fn new() -> Self {
        let engine = MockEngine::default();
        {
            let mut s = engine.state.borrow_mut();
            s.band_amps = vec![0.0; MOCK_BAND_FREQS.len()];
            s.subtitle_track = -1;
            s.rate = 1.0;
            s.subtitle_scale = 1.0;
        }
        engine
    }

    pub fn state(&self) -> std::cell::Ref<'_, MockState> {
        self.state.borrow()
    }

    pub fn state_mut(&self) -> std::cell::RefMut<'_, MockState> {
        self.state.borrow_mut()
    }

    /// Script the playhead position.
    pub fn set_time(&self, time_ms: i64) {
        self.state.borrow_mut().time_ms = time_ms;
    }

    /// Script the media length.
    pub fn set_length(&self, length_ms: i64) {
        self.state.borrow_mut().length_ms = length_ms;
    }

    /// Script the current track reaching its end.
    pub fn finish_track(&self) {
        let mut s = self.state.borrow_mut();
        s.playing = false;
        s.ended = true;
    }
}

impl MediaEngine for MockEngine {
    fn load(&mut self, path: &Path) -> EngineResult<()> {
        let mut s = self.state.borrow_mut();
        s.calls.push(format!("load {}", path.display()));
        if s.fail_next_load {
            s.fail_next_load = false;
            return Err(EngineError::Failed(format!(
                "cannot open '{}'",
                path.display()
            )));
        }
        s.loaded = Some(path.to_path_buf());
        s.ended = false;
        s.time_ms = 0;
        Ok(())
    }

    fn play(&mut self) -> EngineResult<()> {
        let mut s = self.state.borrow_mut();
        if s.loaded.is_none() {
            return Err(EngineError::NoMedia);
        }
        s.calls.push("play".to_string());
        s.playing = true;
        s.ended = false;
        Ok(())
    }

    fn pause(&mut self) -> EngineResult<()> {
        let mut s = self.state.borrow_mut();
        if s.loaded.is_none() {
            return Err(EngineError::NoMedia);
        }
        s.calls.push("pause".to_string());
        s.playing = false;
        Ok(())
    }

    fn stop(&mut self) -> EngineResult<()> {
        let mut s = self.state.borrow_mut();
        s.calls.push("stop".to_string());
        s.playing = false;
        s.ended = false;
        s.time_ms = 0;
        Ok(())
    }

    fn is_playing(&self) -> bool {
        self.state.borrow().playing
    }

    fn end_of_media(&self) -> bool {
        self.state.borrow().ended
    }

    fn seek_fraction(&mut self, fraction: f64) -> EngineResult<()> {
        let mut s = self.state.borrow_mut();
        if s.loaded.is_none() {
            return Err(EngineError::NoMedia);
        }
        s.time_ms = (fraction.clamp(0.0, 1.0) * s.length_ms as f64) as i64;
        s.calls.push(format!("seek_fraction {:.3}", fraction));
        Ok(())
    }

    fn position_fraction(&self) -> EngineResult<f64> {
        let s = self.state.borrow();
        if s.loaded.is_none() {
            return Err(EngineError::NoMedia);
        }
        if s.length_ms <= 0 {
            return Ok(0.0);
        }
        Ok(s.time_ms as f64 / s.length_ms as f64)
    }

    fn time_ms(&self) -> EngineResult<i64> {
        let s = self.state.borrow();
        if s.loaded.is_none() {
            return Err(EngineError::NoMedia);
        }
        Ok(s.time_ms)
    }

    fn length_ms(&self) -> EngineResult<i64> {
        let s = self.state.borrow();
        if s.loaded.is_none() {
            return Err(EngineError::NoMedia);
        }
        Ok(s.length_ms)
    }

    fn set_time_ms(&mut self, time_ms: i64) -> EngineResult<()> {
        let mut s = self.state.borrow_mut();
        if s.loaded.is_none() {
            return Err(EngineError::NoMedia);
        }
        s.time_ms = time_ms;
        s.calls.push(format!("set_time {}", time_ms));
        Ok(())
    }

    fn set_rate(&mut self, rate: f32) -> EngineResult<()> {
        let mut s = self.state.borrow_mut();
        s.rate = rate;
        s.calls.push(format!("set_rate {}", rate));
        Ok(())
    }

    fn set_volume(&mut self, volume: u8) -> EngineResult<()> {
        let mut s = self.state.borrow_mut();
        s.volume = volume;
        s.calls.push(format!("set_volume {}", volume));
        Ok(())
    }

    fn band_count(&self) -> EngineResult<usize> {
        Ok(MOCK_BAND_FREQS.len())
    }

    fn band_frequency(&self, index: usize) -> EngineResult<f32> {
        MOCK_BAND_FREQS
            .get(index)
            .copied()
            .ok_or_else(|| EngineError::Failed(format!("band {} out of range", index)))
    }

    fn set_band_amp(&mut self, index: usize, amp_db: f32) -> EngineResult<()> {
        let mut s = self.state.borrow_mut();
        if index >= s.band_amps.len() {
            return Err(EngineError::Failed(format!("band {} out of range", index)));
        }
        s.band_amps[index] = amp_db;
        s.calls.push(format!("set_band_amp {} {}", index, amp_db));
        Ok(())
    }

    fn set_adjustment(&mut self, adjustment: VideoAdjustment, native: f32) -> EngineResult<()> {
        let mut s = self.state.borrow_mut();
        s.calls.push(format!("adjust {} {}", adjustment, native));
        s.adjustments.push((adjustment, native));
        Ok(())
    }

    fn set_deinterlace(&mut self, enabled: bool) -> EngineResult<()> {
        let mut s = self.state.borrow_mut();
        s.deinterlace = enabled;
        s.calls.push(format!("deinterlace {}", enabled));
        Ok(())
    }

    fn set_aspect_ratio(&mut self, ratio: Option<&str>) -> EngineResult<()> {
        let mut s = self.state.borrow_mut();
        s.aspect_ratio = ratio.map(|r| r.to_string());
        s.calls.push(format!("aspect {:?}", ratio));
        Ok(())
    }

    fn subtitle_track_count(&self) -> EngineResult<usize> {
        Ok(self.state.borrow().subtitle_tracks.len())
    }

    fn subtitle_track_names(&self) -> EngineResult<Vec<String>> {
        Ok(self.state.borrow().subtitle_tracks.clone())
    }

    fn set_subtitle_track(&mut self, track: i32) -> EngineResult<()> {
        let mut s = self.state.borrow_mut();
        s.subtitle_track = track;
        s.calls.push(format!("subtitle_track {}", track));
        Ok(())
    }

    fn set_subtitle_delay_ms(&mut self, delay_ms: i64) -> EngineResult<()> {
        let mut s = self.state.borrow_mut();
        s.subtitle_delay_ms = delay_ms;
        s.calls.push(format!("subtitle_delay {}", delay_ms));
        Ok(())
    }

    fn set_subtitle_file(&mut self, path: &Path) -> EngineResult<()> {
        let mut s = self.state.borrow_mut();
        s.subtitle_file = Some(path.to_path_buf());
        s.calls.push(format!("subtitle_file {}", path.display()));
        Ok(())
    }

    fn set_subtitle_scale(&mut self, scale: f32) -> EngineResult<()> {
        let mut s = self.state.borrow_mut();
        s.subtitle_scale = scale;
        s.calls.push(format!("subtitle_scale {}", scale));
        Ok(())
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    struct BareEngine;
    impl MediaEngine for BareEngine {}

    #[test]
    fn default_surface_reports_unsupported() {
        let mut engine = BareEngine;
        assert_eq!(engine.play(), Err(EngineError::Unsupported));
        assert_eq!(engine.set_volume(50), Err(EngineError::Unsupported));
        assert_eq!(engine.band_count(), Err(EngineError::Unsupported));
        assert_eq!(engine.set_subtitle_track(0), Err(EngineError::Unsupported));
        assert!(!engine.is_playing());
        assert!(!engine.end_of_media());
    }

    #[test]
    fn mock_transport_requires_media() {
        let mut engine = MockEngine::new();
        assert_eq!(engine.play(), Err(EngineError::NoMedia));
        engine.load(Path::new("a.mp3")).unwrap();
        engine.play().unwrap();
        assert!(engine.is_playing());
    }

    #[test]
    fn mock_clones_share_state() {
        let probe = MockEngine::new();
        let mut owned = probe.clone();
        owned.load(Path::new("a.mp3")).unwrap();
        owned.set_volume(75).unwrap();
        assert_eq!(probe.state().volume, 75);
        assert!(probe.state().loaded.is_some());
    }

    #[test]
    fn mock_load_failure_is_scriptable() {
        let mut engine = MockEngine::new();
        engine.state_mut().fail_next_load = true;
        assert!(engine.load(Path::new("bad.mp3")).is_err());
        assert!(engine.state().loaded.is_none());
        // Next load succeeds again
        assert!(engine.load(Path::new("good.mp3")).is_ok());
    }

    #[test]
    fn position_fraction_handles_zero_length() {
        let mut engine = MockEngine::new();
        engine.load(Path::new("a.mp3")).unwrap();
        assert_eq!(engine.position_fraction().unwrap(), 0.0);
        engine.set_length(10_000);
        engine.set_time(2_500);
        assert!((engine.position_fraction().unwrap() - 0.25).abs() < 1e-9);
    }
}
