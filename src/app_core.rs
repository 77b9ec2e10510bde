//! AppCore — central command dispatcher for rhythms.
//!
//! Unified interface for every player operation. A GUI shell, the CLI, and
//! the headless tests all drive the player through AppCore methods, so
//! validation and logging live in exactly one place. All mutable state
//! (engine handle, playlist, controller) is owned here and touched only
//! from the event-loop thread; engine calls are synchronous and assumed
//! near-instantaneous.

use crate::controller::{Controller, PlaybackMode, TickOutcome};
use crate::equalizer::{Equalizer, Preset};
use crate::media_engine::{EngineError, MediaEngine, MockEngine};
use crate::playlist::{AppendOutcome, Entry, Playlist};
use crate::settings::Settings;
use crate::subtitle::{self, SubtitleFont};
use crate::video::{self, VideoAdjustment, ALL_ADJUSTMENTS};
use chrono::Local;
use serde::Serialize;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

// ── Log buffer ──────────────────────────────────────────────────────────────

const LOG_BUFFER_MAX: usize = 500;

#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    pub timestamp: String,
    pub level: String,
    pub message: String,
}

pub struct LogBuffer {
    entries: VecDeque<LogEntry>,
}

impl LogBuffer {
    pub fn new() -> Self {
        LogBuffer {
            entries: VecDeque::new(),
        }
    }

    pub fn push(&mut self, level: &str, message: String) {
        let timestamp = Local::now().format("%H:%M:%S").to_string();
        self.entries.push_back(LogEntry {
            timestamp,
            level: level.to_string(),
            message,
        });
        while self.entries.len() > LOG_BUFFER_MAX {
            self.entries.pop_front();
        }
    }

    pub fn get(&self, since_index: usize) -> Vec<LogEntry> {
        self.entries.iter().skip(since_index).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ── Response data types ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct StatusData {
    pub entry_count: usize,
    pub current_index: Option<usize>,
    pub playback_mode: String,
    pub volume: u8,
    pub is_playing: bool,
    pub ab_loop_armed: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransportData {
    pub is_playing: bool,
    pub time_ms: i64,
    pub length_ms: i64,
    pub time_display: String,
    pub length_display: String,
    pub track_title: Option<String>,
    pub track_artist: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EntryData {
    pub index: usize,
    pub path: String,
    pub title: String,
    pub artist: String,
    pub duration_display: String,
    pub is_current: bool,
}

/// Format a millisecond count as HH:MM:SS.
pub fn format_clock(time_ms: i64) -> String {
    let secs = (time_ms.max(0) / 1000) as u64;
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

// ── AppCore ─────────────────────────────────────────────────────────────────

pub struct AppCore {
    pub engine: Box<dyn MediaEngine>,
    pub playlist: Playlist,
    pub controller: Controller,
    pub equalizer: Equalizer,
    pub settings: Settings,
    pub logs: LogBuffer,
    settings_path: PathBuf,
    displayed_time_ms: i64,
}

impl AppCore {
    /// Create an AppCore around an engine, loading settings from `settings_path`
    /// and applying them to the engine.
    pub fn new(engine: Box<dyn MediaEngine>, settings_path: PathBuf) -> Self {
        let settings = Settings::load_from(&settings_path);
        let mut core = AppCore {
            engine,
            playlist: Playlist::new(),
            controller: Controller::new(),
            equalizer: Equalizer::new(),
            settings,
            logs: LogBuffer::new(),
            settings_path,
            displayed_time_ms: 0,
        };
        core.apply_settings();
        core
    }

    /// Fresh AppCore over a mock engine with default settings. For testing;
    /// the returned probe shares state with the boxed engine.
    pub fn new_test() -> (Self, MockEngine) {
        let probe = MockEngine::new();
        let core = AppCore {
            engine: Box::new(probe.clone()),
            playlist: Playlist::new(),
            controller: Controller::new(),
            equalizer: Equalizer::new(),
            settings: Settings::default(),
            logs: LogBuffer::new(),
            settings_path: PathBuf::from("test_settings.json"),
            displayed_time_ms: 0,
        };
        (core, probe)
    }

    /// Push loaded settings into the engine and controller.
    fn apply_settings(&mut self) {
        self.controller
            .set_mode(PlaybackMode::from_code(self.settings.playback_mode));

        let volume = self.settings.volume.min(100);
        if let Err(e) = self.engine.set_volume(volume) {
            self.skip("set volume", e);
        }

        let adjustments: Vec<(String, i32)> = self
            .settings
            .video_adjustments
            .iter()
            .map(|(k, v)| (k.clone(), *v))
            .collect();
        for (name, value) in adjustments {
            match VideoAdjustment::from_name(&name) {
                Some(adj) => {
                    if let Err(e) = self.engine.set_adjustment(adj, adj.to_native(value)) {
                        self.skip("apply video adjustment", e);
                    }
                }
                None => self
                    .logs
                    .push("warn", format!("Ignoring unknown video adjustment '{}'", name)),
            }
        }

        let scale = self.settings.subtitle_font.engine_scale();
        if let Err(e) = self.engine.set_subtitle_scale(scale) {
            self.skip("set subtitle scale", e);
        }
    }

    /// An engine call did not take effect; note it and move on. Missing
    /// capabilities and missing media never surface to the user.
    fn skip(&mut self, what: &str, err: EngineError) {
        self.logs.push("warn", format!("Skipped {}: {}", what, err));
    }

    // ── Status (read-only) ──────────────────────────────────────────────

    pub fn get_status(&self) -> StatusData {
        StatusData {
            entry_count: self.playlist.len(),
            current_index: self.playlist.current_index(),
            playback_mode: self.controller.mode().to_string(),
            volume: self.settings.volume,
            is_playing: self.controller.is_playing(),
            ab_loop_armed: self.controller.ab_loop().map(|ab| ab.armed()).unwrap_or(false),
        }
    }

    pub fn get_transport(&self) -> TransportData {
        let length_ms = self.engine.length_ms().unwrap_or(0);
        let current = self.playlist.current();
        TransportData {
            is_playing: self.controller.is_playing(),
            time_ms: self.displayed_time_ms,
            length_ms,
            time_display: format_clock(self.displayed_time_ms),
            length_display: format_clock(length_ms),
            track_title: current.map(|e| e.title.clone()),
            track_artist: current.map(|e| e.artist.clone()),
        }
    }

    pub fn get_entries(&self) -> Vec<EntryData> {
        let current = self.playlist.current_index();
        self.playlist
            .entries()
            .iter()
            .enumerate()
            .map(|(i, e)| EntryData {
                index: i,
                path: e.path.to_string_lossy().to_string(),
                title: e.title.clone(),
                artist: e.artist.clone(),
                duration_display: e.duration_display(),
                is_current: current == Some(i),
            })
            .collect()
    }

    pub fn get_logs(&self, since_index: Option<usize>) -> Vec<LogEntry> {
        self.logs.get(since_index.unwrap_or(0))
    }

    // ── Playlist operations ─────────────────────────────────────────────

    /// Open a single file: append it, move the cursor there, and play it.
    pub fn open_file(&mut self, path: &Path) -> Result<(), String> {
        let entry = Entry::from_path(path)?;
        self.playlist.append(entry);
        let index = self.playlist.len() - 1;
        self.playlist.select(index)?;
        self.load_and_play(index)
    }

    /// Add files to the playlist (file-dialog or drag-and-drop semantics).
    /// The first entry landing in an empty playlist starts playing.
    /// Returns the number of entries added.
    pub fn add_files(&mut self, paths: &[PathBuf]) -> Result<usize, String> {
        let mut added = 0;
        let mut load_wanted = false;
        let mut errors = Vec::new();
        for path in paths {
            match Entry::from_path(path) {
                Ok(entry) => {
                    if self.playlist.append(entry) == AppendOutcome::FirstEntry {
                        load_wanted = true;
                    }
                    added += 1;
                }
                Err(e) => errors.push(e),
            }
        }
        if load_wanted {
            self.load_and_play(0)?;
        }
        if !errors.is_empty() {
            return Err(format!(
                "Added {} file(s); {} failed: {}",
                added,
                errors.len(),
                errors.join("; ")
            ));
        }
        Ok(added)
    }

    /// Clear the playlist and stop playback.
    pub fn clear_playlist(&mut self) {
        self.playlist.clear();
        self.stop();
        self.logs.push("info", "Playlist cleared".to_string());
    }

    pub fn remove_entry(&mut self, index: usize) -> Result<(), String> {
        let entry = self.playlist.remove_at(index)?;
        self.logs
            .push("info", format!("Removed from playlist: {}", entry.title));
        Ok(())
    }

    /// Jump to an entry and play it (double-click semantics).
    pub fn select_entry(&mut self, index: usize) -> Result<(), String> {
        self.playlist.select(index)?;
        self.load_and_play(index)
    }

    // ── Transport ───────────────────────────────────────────────────────

    /// Load the entry at `index` into the engine and start playback.
    /// A load failure leaves the player in the "no media loaded" state.
    fn load_and_play(&mut self, index: usize) -> Result<(), String> {
        let (path, title, artist) = {
            let entry = self
                .playlist
                .get(index)
                .ok_or_else(|| format!("No entry at index {}", index))?;
            (entry.path.clone(), entry.title.clone(), entry.artist.clone())
        };

        self.engine
            .load(&path)
            .map_err(|e| format!("Failed to load media: {}", e))?;
        if let Err(e) = self.engine.play() {
            self.skip("start playback", e);
        }
        self.controller.note_playing();
        self.displayed_time_ms = 0;
        self.logs
            .push("info", format!("Playing: {} — {}", artist, title));
        Ok(())
    }

    /// Toggle play/pause. A missing media handle is logged, never fatal.
    pub fn play_pause(&mut self) {
        match self.controller.play_pause(self.engine.as_mut()) {
            Ok(true) => self.logs.push("info", "Playback resumed".to_string()),
            Ok(false) => self.logs.push("info", "Playback paused".to_string()),
            Err(e) => self.skip("toggle playback", e),
        }
    }

    /// Halt playback, clear the A-B loop, and reset the displayed time.
    pub fn stop(&mut self) {
        if let Err(e) = self.controller.stop(self.engine.as_mut()) {
            self.skip("stop", e);
        }
        self.displayed_time_ms = 0;
        self.logs.push("info", "Playback stopped".to_string());
    }

    /// Move to the next entry, within bounds. Wraparound is the repeat
    /// policy's business, not the button's.
    pub fn next(&mut self) -> Result<(), String> {
        match self.playlist.next() {
            Some(index) => self.load_and_play(index),
            None => Ok(()),
        }
    }

    pub fn previous(&mut self) -> Result<(), String> {
        match self.playlist.previous() {
            Some(index) => self.load_and_play(index),
            None => Ok(()),
        }
    }

    /// Seek to a fraction (0..1) of the media. No-op without media.
    pub fn seek(&mut self, fraction: f64) {
        if let Err(e) = self.controller.seek_fraction(self.engine.as_mut(), fraction) {
            self.skip("seek", e);
        }
    }

    pub fn set_volume(&mut self, volume: u8) {
        let volume = volume.min(100);
        self.settings.volume = volume;
        if let Err(e) = self.engine.set_volume(volume) {
            self.skip("set volume", e);
        }
    }

    pub fn set_rate(&mut self, rate: f32) {
        if let Err(e) = self.engine.set_rate(rate) {
            self.skip("set rate", e);
        }
    }

    pub fn set_playback_mode(&mut self, mode: PlaybackMode) {
        self.controller.set_mode(mode);
        self.settings.playback_mode = mode.code();
        self.logs
            .push("info", format!("Playback mode: {}", mode));
    }

    // ── A-B repeat ──────────────────────────────────────────────────────

    pub fn set_point_a(&mut self) -> Option<i64> {
        let time = self.controller.set_point_a(self.engine.as_mut());
        if let Some(t) = time {
            self.logs
                .push("info", format!("Loop point A at {}", format_clock(t)));
        }
        time
    }

    pub fn set_point_b(&mut self) -> Option<i64> {
        let time = self.controller.set_point_b(self.engine.as_mut());
        if let Some(t) = time {
            self.logs
                .push("info", format!("Loop point B at {}", format_clock(t)));
        }
        time
    }

    // ── Tick ────────────────────────────────────────────────────────────

    /// One step of the ~1 Hz UI timer. Realizes whatever the controller
    /// decided: refresh the clock, wrap the A-B loop, load the next track
    /// under the repeat policy, or halt.
    pub fn tick(&mut self) -> TickOutcome {
        let outcome = self.controller.on_tick(self.engine.as_mut(), &self.playlist);
        match outcome {
            TickOutcome::Progress { time_ms, .. } => {
                self.displayed_time_ms = time_ms;
            }
            TickOutcome::LoopSeek => {
                if let Some(ab) = self.controller.ab_loop() {
                    self.displayed_time_ms = ab.point_a_ms;
                }
            }
            TickOutcome::Load(index) => {
                if self.playlist.select(index).is_err() {
                    return TickOutcome::Halt;
                }
                if let Err(e) = self.load_and_play(index) {
                    self.logs.push("error", e);
                    self.stop();
                    return TickOutcome::Halt;
                }
            }
            TickOutcome::Halt => {
                self.displayed_time_ms = 0;
                self.logs.push("info", "End of playlist".to_string());
            }
            TickOutcome::Idle => {}
        }
        outcome
    }

    // ── Equalizer ───────────────────────────────────────────────────────

    pub fn set_eq_band(&mut self, frequency: f32, amp_db: f32) {
        if let Err(e) = self.equalizer.set_band(self.engine.as_mut(), frequency, amp_db) {
            self.logs.push("warn", format!("Equalizer: {}", e));
        }
    }

    pub fn apply_eq_preset(&mut self, preset: Preset) {
        match self.equalizer.apply_preset(self.engine.as_mut(), preset) {
            Ok(()) => self
                .logs
                .push("info", format!("Equalizer preset: {}", preset)),
            Err(e) => self.logs.push("warn", format!("Equalizer: {}", e)),
        }
    }

    pub fn reset_eq(&mut self) {
        if let Err(e) = self.equalizer.reset(self.engine.as_mut()) {
            self.logs.push("warn", format!("Equalizer: {}", e));
        }
    }

    // ── Video ───────────────────────────────────────────────────────────

    /// Apply a −100..=100 slider value; the stored settings keep the slider
    /// value, the engine receives the native mapping.
    pub fn adjust_video(&mut self, adjustment: VideoAdjustment, value: i32) {
        let value = value.clamp(-100, 100);
        self.settings
            .video_adjustments
            .insert(adjustment.name().to_string(), value);
        let native = adjustment.to_native(value);
        if let Err(e) = self.engine.set_adjustment(adjustment, native) {
            self.skip("adjust video", e);
        }
    }

    pub fn reset_video(&mut self) {
        for adj in ALL_ADJUSTMENTS {
            self.adjust_video(adj, 0);
        }
    }

    pub fn set_deinterlace(&mut self, enabled: bool) {
        if let Err(e) = self.engine.set_deinterlace(enabled) {
            self.skip("set deinterlace", e);
        }
    }

    pub fn set_aspect_ratio(&mut self, choice: &str) {
        if let Err(e) = self.engine.set_aspect_ratio(video::aspect_ratio_arg(choice)) {
            self.skip("set aspect ratio", e);
        }
    }

    // ── Subtitles ───────────────────────────────────────────────────────

    /// UI track list: "Disabled" plus whatever the engine reports.
    pub fn subtitle_selections(&self) -> Vec<String> {
        let tracks = self.engine.subtitle_track_names().unwrap_or_default();
        subtitle::selection_names(&tracks)
    }

    pub fn set_subtitle_selection(&mut self, selection: usize) {
        let track = subtitle::engine_track_for_selection(selection);
        if let Err(e) = self.engine.set_subtitle_track(track) {
            self.skip("select subtitle track", e);
        }
    }

    pub fn set_subtitle_delay(&mut self, delay_ms: i64) {
        if let Err(e) = self.engine.set_subtitle_delay_ms(delay_ms) {
            self.skip("set subtitle delay", e);
        }
    }

    pub fn load_subtitle_file(&mut self, path: &Path) -> Result<(), String> {
        match self.engine.set_subtitle_file(path) {
            Ok(()) => {
                self.logs
                    .push("info", format!("Loaded subtitles: {}", path.display()));
                Ok(())
            }
            Err(EngineError::Failed(msg)) => Err(format!("Failed to load subtitles: {}", msg)),
            Err(e) => {
                self.skip("load subtitle file", e);
                Ok(())
            }
        }
    }

    pub fn set_subtitle_font(&mut self, font: SubtitleFont) {
        let scale = font.engine_scale();
        self.settings.subtitle_font = font;
        if let Err(e) = self.engine.set_subtitle_scale(scale) {
            self.skip("set subtitle scale", e);
        }
    }

    // ── Shutdown ────────────────────────────────────────────────────────

    /// Persist settings. Called once at shutdown.
    pub fn save_settings(&self) -> Result<(), String> {
        self.settings.save_to(&self.settings_path)
    }
}
