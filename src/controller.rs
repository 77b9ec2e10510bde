//! Playback controller: transport toggling, A-B repeat, and the repeat
//! policy applied when a track reaches its end.
//!
//! The controller decides; it never loads media itself. `on_tick` returns a
//! `TickOutcome` and the application core realizes it (loading the next
//! track, halting, or just refreshing the clock display).

use crate::media_engine::{EngineResult, MediaEngine};
use crate::playlist::Playlist;
use std::fmt;

// ── Playback mode ────────────────────────────────────────────────────────────

/// Policy governing what happens when the current track reaches its end.
/// Exactly one mode is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackMode {
    #[default]
    Normal,
    RepeatOne,
    RepeatAll,
    Shuffle,
}

impl PlaybackMode {
    /// Integer code used in the settings file.
    pub fn code(&self) -> u8 {
        match self {
            PlaybackMode::Normal => 0,
            PlaybackMode::RepeatOne => 1,
            PlaybackMode::RepeatAll => 2,
            PlaybackMode::Shuffle => 3,
        }
    }

    /// Decode a stored mode. Unknown codes fall back to Normal.
    pub fn from_code(code: u8) -> Self {
        match code {
            1 => PlaybackMode::RepeatOne,
            2 => PlaybackMode::RepeatAll,
            3 => PlaybackMode::Shuffle,
            _ => PlaybackMode::Normal,
        }
    }

    /// Parse a mode from a string (case-insensitive, accepts hyphens or
    /// underscores).
    pub fn from_str_loose(s: &str) -> Result<Self, String> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "normal" | "off" => Ok(PlaybackMode::Normal),
            "repeat-one" | "one" => Ok(PlaybackMode::RepeatOne),
            "repeat-all" | "all" => Ok(PlaybackMode::RepeatAll),
            "shuffle" => Ok(PlaybackMode::Shuffle),
            _ => Err(format!(
                "Unknown playback mode '{}'. Expected: normal, repeat-one, repeat-all, shuffle",
                s
            )),
        }
    }
}

impl fmt::Display for PlaybackMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaybackMode::Normal => write!(f, "normal"),
            PlaybackMode::RepeatOne => write!(f, "repeat-one"),
            PlaybackMode::RepeatAll => write!(f, "repeat-all"),
            PlaybackMode::Shuffle => write!(f, "shuffle"),
        }
    }
}

// ── A-B loop ─────────────────────────────────────────────────────────────────

/// A user-defined playback segment. Armed once both points are set; the
/// invariant `point_b > point_a` holds whenever `point_b` is present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AbLoop {
    pub point_a_ms: i64,
    pub point_b_ms: Option<i64>,
}

impl AbLoop {
    pub fn armed(&self) -> bool {
        self.point_b_ms.is_some()
    }
}

// ── Tick outcome ─────────────────────────────────────────────────────────────

/// What the control loop decided on one ~1 Hz tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Nothing playing and nothing ended.
    Idle,
    /// Still playing; current position for the clock display.
    Progress { time_ms: i64, length_ms: i64 },
    /// The A-B loop wrapped back to point A.
    LoopSeek,
    /// End of media: load this playlist index and play it.
    Load(usize),
    /// End of media under Normal mode (or an unplayable state): halt.
    Halt,
}

// ── Controller ───────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct Controller {
    mode: PlaybackMode,
    ab_loop: Option<AbLoop>,
    is_playing: bool,
}

impl Controller {
    pub fn new() -> Self {
        Controller::default()
    }

    pub fn mode(&self) -> PlaybackMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: PlaybackMode) {
        self.mode = mode;
    }

    pub fn ab_loop(&self) -> Option<AbLoop> {
        self.ab_loop
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    /// Mark playback started externally (a track was just loaded).
    pub fn note_playing(&mut self) {
        self.is_playing = true;
    }

    /// Toggle the engine transport. Returns true when now playing.
    pub fn play_pause(&mut self, engine: &mut dyn MediaEngine) -> EngineResult<bool> {
        if engine.is_playing() {
            engine.pause()?;
            self.is_playing = false;
            Ok(false)
        } else {
            engine.play()?;
            self.is_playing = true;
            Ok(true)
        }
    }

    /// Halt the transport. The A-B loop is cleared unconditionally, even if
    /// the engine cannot stop.
    pub fn stop(&mut self, engine: &mut dyn MediaEngine) -> EngineResult<()> {
        let result = engine.stop();
        self.ab_loop = None;
        self.is_playing = false;
        result
    }

    /// Seek to a 0..1 fraction of the media.
    pub fn seek_fraction(&mut self, engine: &mut dyn MediaEngine, fraction: f64) -> EngineResult<()> {
        engine.seek_fraction(fraction.clamp(0.0, 1.0))
    }

    /// Capture the current engine time as point A. Any previous point B is
    /// discarded and the loop disarmed. Ignored while not playing.
    pub fn set_point_a(&mut self, engine: &mut dyn MediaEngine) -> Option<i64> {
        if !engine.is_playing() {
            return None;
        }
        let time = engine.time_ms().ok()?;
        self.ab_loop = Some(AbLoop {
            point_a_ms: time,
            point_b_ms: None,
        });
        Some(time)
    }

    /// Capture the current engine time as point B and arm the loop.
    /// Rejected unless playing, point A is set, and the captured timestamp
    /// strictly exceeds point A.
    pub fn set_point_b(&mut self, engine: &mut dyn MediaEngine) -> Option<i64> {
        if !engine.is_playing() {
            return None;
        }
        let time = engine.time_ms().ok()?;
        match &mut self.ab_loop {
            Some(ab) if time > ab.point_a_ms => {
                ab.point_b_ms = Some(time);
                Some(time)
            }
            _ => None,
        }
    }

    /// One step of the ~1 Hz control loop.
    ///
    /// While the A-B loop is armed, playback never progresses past point B:
    /// any tick observing position ≥ B seeks back to exactly point A. End of
    /// media otherwise applies the repeat policy.
    pub fn on_tick(&mut self, engine: &mut dyn MediaEngine, playlist: &Playlist) -> TickOutcome {
        if engine.is_playing() {
            if let Some(ab) = self.ab_loop {
                if let (Some(b), Ok(time)) = (ab.point_b_ms, engine.time_ms()) {
                    if time >= b && engine.set_time_ms(ab.point_a_ms).is_ok() {
                        return TickOutcome::LoopSeek;
                    }
                }
            }
            return TickOutcome::Progress {
                time_ms: engine.time_ms().unwrap_or(0),
                length_ms: engine.length_ms().unwrap_or(0),
            };
        }

        if !engine.end_of_media() {
            return TickOutcome::Idle;
        }

        let len = playlist.len();
        let current = playlist.current_index();
        match self.mode {
            PlaybackMode::RepeatOne => match current {
                Some(i) => TickOutcome::Load(i),
                None => self.halt(),
            },
            PlaybackMode::RepeatAll => match (current, len) {
                (_, 0) => self.halt(),
                (Some(i), _) if i + 1 < len => TickOutcome::Load(i + 1),
                _ => TickOutcome::Load(0),
            },
            PlaybackMode::Shuffle => match len {
                0 => self.halt(),
                _ => TickOutcome::Load(shuffle_target(len, current)),
            },
            PlaybackMode::Normal => self.halt(),
        }
    }

    fn halt(&mut self) -> TickOutcome {
        self.is_playing = false;
        TickOutcome::Halt
    }
}

/// Pick the next index under Shuffle: uniform over all entries except the
/// current one (when more than one exists).
fn shuffle_target(len: usize, current: Option<usize>) -> usize {
    match current {
        _ if len == 1 => 0,
        Some(c) if c < len => {
            let draw = fastrand::usize(..len - 1);
            if draw >= c { draw + 1 } else { draw }
        }
        _ => fastrand::usize(..len),
    }
}
