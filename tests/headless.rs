//! Headless integration tests: the full player driven through `AppCore`
//! with a scriptable mock engine, the way a GUI or CLI shell would drive it.

use rhythms::app_core::AppCore;
use rhythms::controller::{PlaybackMode, TickOutcome};
use rhythms::equalizer::Preset;
use rhythms::media_engine::{MediaEngine, MockEngine};
use rhythms::playlist::Entry;
use rhythms::settings::Settings;
use std::path::PathBuf;
use std::time::Duration;

/// Write a dummy media file; tags are unreadable, so the entry falls back
/// to the file stem as its title.
fn media_file(dir: &tempfile::TempDir, name: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, b"not really audio").unwrap();
    path
}

/// AppCore over a mock engine with three entries queued and the first one
/// playing, plus the shared probe.
fn core_with_tracks(n: usize) -> (AppCore, MockEngine) {
    let (mut core, probe) = AppCore::new_test();
    for i in 0..n {
        core.playlist.append(Entry {
            path: format!("track{}.mp3", i).into(),
            title: format!("Track {}", i),
            artist: "Tester".into(),
            duration: Duration::new(60, 0),
        });
    }
    core.select_entry(0).unwrap();
    probe.set_length(10_000);
    (core, probe)
}

// ── Playlist and transport ──────────────────────────────────────────────────

#[test]
fn adding_to_empty_playlist_starts_playback() {
    let dir = tempfile::tempdir().unwrap();
    let a = media_file(&dir, "first.mp3");
    let b = media_file(&dir, "second.mp3");

    let (mut core, probe) = AppCore::new_test();
    assert_eq!(core.add_files(&[a, b]).unwrap(), 2);

    let status = core.get_status();
    assert_eq!(status.entry_count, 2);
    assert_eq!(status.current_index, Some(0));
    assert!(status.is_playing);
    assert!(probe.state().loaded.as_ref().unwrap().ends_with("first.mp3"));

    // Later additions never steal playback
    let c = media_file(&dir, "third.mp3");
    core.add_files(&[c]).unwrap();
    assert_eq!(core.get_status().current_index, Some(0));
    assert!(probe.state().loaded.as_ref().unwrap().ends_with("first.mp3"));
}

#[test]
fn add_files_reports_unreadable_paths_but_keeps_the_rest() {
    let dir = tempfile::tempdir().unwrap();
    let good = media_file(&dir, "good.mp3");
    let missing = dir.path().join("missing.mp3");

    let (mut core, _probe) = AppCore::new_test();
    let err = core.add_files(&[good, missing]).unwrap_err();
    assert!(err.contains("1 failed"));
    assert_eq!(core.get_status().entry_count, 1);
}

#[test]
fn next_and_previous_stay_in_bounds() {
    let (mut core, probe) = core_with_tracks(2);

    core.next().unwrap();
    assert_eq!(core.get_status().current_index, Some(1));
    // At the last entry, next is a no-op
    core.next().unwrap();
    assert_eq!(core.get_status().current_index, Some(1));

    core.previous().unwrap();
    assert_eq!(core.get_status().current_index, Some(0));
    core.previous().unwrap();
    assert_eq!(core.get_status().current_index, Some(0));
    assert!(probe.state().loaded.as_ref().unwrap().ends_with("track0.mp3"));
}

#[test]
fn failed_load_is_user_visible_and_leaves_no_media() {
    let (mut core, probe) = core_with_tracks(2);
    core.stop();
    probe.state_mut().loaded = None;
    probe.state_mut().fail_next_load = true;

    let err = core.select_entry(1).unwrap_err();
    assert!(err.starts_with("Failed to load media:"));
    assert!(probe.state().loaded.is_none());
    assert!(!core.get_status().is_playing);
}

#[test]
fn transport_reports_track_metadata_and_clock() {
    let (mut core, probe) = core_with_tracks(1);
    probe.set_time(61_000);
    probe.set_length(180_000);
    core.tick();

    let transport = core.get_transport();
    assert!(transport.is_playing);
    assert_eq!(transport.time_display, "00:01:01");
    assert_eq!(transport.length_display, "00:03:00");
    assert_eq!(transport.track_title.as_deref(), Some("Track 0"));
    assert_eq!(transport.track_artist.as_deref(), Some("Tester"));
}

// ── Repeat policy through the tick loop ─────────────────────────────────────

#[test]
fn repeat_all_advances_and_wraps() {
    let (mut core, probe) = core_with_tracks(3);
    core.set_playback_mode(PlaybackMode::RepeatAll);

    probe.finish_track();
    assert_eq!(core.tick(), TickOutcome::Load(1));
    assert_eq!(core.get_status().current_index, Some(1));
    assert!(core.get_status().is_playing);

    probe.finish_track();
    assert_eq!(core.tick(), TickOutcome::Load(2));
    probe.finish_track();
    assert_eq!(core.tick(), TickOutcome::Load(0));
    assert!(probe.state().loaded.as_ref().unwrap().ends_with("track0.mp3"));
}

#[test]
fn repeat_one_replays_the_current_entry() {
    let (mut core, probe) = core_with_tracks(3);
    core.set_playback_mode(PlaybackMode::RepeatOne);
    core.select_entry(1).unwrap();

    probe.finish_track();
    assert_eq!(core.tick(), TickOutcome::Load(1));
    assert_eq!(core.get_status().current_index, Some(1));
    assert!(probe.state().loaded.as_ref().unwrap().ends_with("track1.mp3"));
}

#[test]
fn normal_mode_halts_at_end_of_playlist() {
    let (mut core, probe) = core_with_tracks(2);
    core.select_entry(1).unwrap();

    probe.finish_track();
    assert_eq!(core.tick(), TickOutcome::Halt);
    let status = core.get_status();
    assert!(!status.is_playing);
    assert_eq!(core.get_transport().time_display, "00:00:00");
    assert!(core
        .get_logs(None)
        .iter()
        .any(|l| l.message == "End of playlist"));
}

#[test]
fn shuffle_loads_a_different_entry() {
    let (mut core, probe) = core_with_tracks(4);
    core.set_playback_mode(PlaybackMode::Shuffle);
    core.select_entry(2).unwrap();

    for _ in 0..50 {
        probe.finish_track();
        match core.tick() {
            TickOutcome::Load(i) => assert_ne!(i, 2),
            other => panic!("expected Load, got {:?}", other),
        }
        core.select_entry(2).unwrap();
    }
}

#[test]
fn failed_reload_under_repeat_halts() {
    let (mut core, probe) = core_with_tracks(2);
    core.set_playback_mode(PlaybackMode::RepeatAll);

    probe.finish_track();
    probe.state_mut().fail_next_load = true;
    assert_eq!(core.tick(), TickOutcome::Halt);
    assert!(!core.get_status().is_playing);
    assert!(core
        .get_logs(None)
        .iter()
        .any(|l| l.level == "error" && l.message.contains("Failed to load media")));
}

// ── A-B repeat ──────────────────────────────────────────────────────────────

#[test]
fn ab_loop_wraps_back_to_exactly_point_a() {
    let (mut core, probe) = core_with_tracks(1);

    probe.set_time(1_000);
    assert_eq!(core.set_point_a(), Some(1_000));
    probe.set_time(5_000);
    assert_eq!(core.set_point_b(), Some(5_000));
    assert!(core.get_status().ab_loop_armed);

    probe.set_time(5_200);
    assert_eq!(core.tick(), TickOutcome::LoopSeek);
    assert_eq!(probe.state().time_ms, 1_000);
    assert_eq!(core.get_transport().time_display, "00:00:01");
}

#[test]
fn point_b_is_rejected_before_point_a() {
    let (mut core, probe) = core_with_tracks(1);

    probe.set_time(5_000);
    core.set_point_a();
    probe.set_time(3_000);
    assert_eq!(core.set_point_b(), None);
    assert!(!core.get_status().ab_loop_armed);
}

#[test]
fn stop_clears_the_loop_and_the_clock() {
    let (mut core, probe) = core_with_tracks(1);
    probe.set_time(1_000);
    core.set_point_a();
    probe.set_time(5_000);
    core.set_point_b();

    core.stop();
    assert!(!core.get_status().ab_loop_armed);
    assert!(!core.get_status().is_playing);
    assert_eq!(core.get_transport().time_display, "00:00:00");

    // The disarmed loop stays gone after playback resumes
    core.select_entry(0).unwrap();
    probe.set_time(9_000);
    assert!(matches!(core.tick(), TickOutcome::Progress { .. }));
}

// ── Settings persistence ────────────────────────────────────────────────────

#[test]
fn saved_settings_are_applied_on_startup() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("player_settings.json");

    let mut settings = Settings::default();
    settings.volume = 75;
    settings.playback_mode = PlaybackMode::Shuffle.code();
    settings.video_adjustments.insert("Contrast".into(), 50);
    settings.save_to(&path).unwrap();

    let probe = MockEngine::new();
    let core = AppCore::new(Box::new(probe.clone()), path);

    assert_eq!(probe.state().volume, 75);
    let status = core.get_status();
    assert_eq!(status.volume, 75);
    assert_eq!(status.playback_mode, "shuffle");
    // Contrast 50 reaches the engine in its native 1.5 form
    assert!(probe
        .state()
        .adjustments
        .iter()
        .any(|(adj, v)| adj.name() == "Contrast" && (*v - 1.5).abs() < 1e-6));
}

#[test]
fn corrupt_settings_fall_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("player_settings.json");
    std::fs::write(&path, "{broken").unwrap();

    let probe = MockEngine::new();
    let core = AppCore::new(Box::new(probe.clone()), path);
    assert_eq!(core.get_status().volume, 50);
    assert_eq!(core.get_status().playback_mode, "normal");
}

#[test]
fn changed_settings_survive_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("player_settings.json");

    {
        let probe = MockEngine::new();
        let mut core = AppCore::new(Box::new(probe.clone()), path.clone());
        core.set_volume(90);
        core.set_playback_mode(PlaybackMode::RepeatAll);
        core.save_settings().unwrap();
    }

    let probe = MockEngine::new();
    let core = AppCore::new(Box::new(probe.clone()), path);
    assert_eq!(core.get_status().volume, 90);
    assert_eq!(core.get_status().playback_mode, "repeat-all");
    assert_eq!(probe.state().volume, 90);
}

// ── Equalizer ───────────────────────────────────────────────────────────────

#[test]
fn rock_preset_reaches_every_band() {
    let (mut core, probe) = core_with_tracks(1);
    core.apply_eq_preset(Preset::Rock);
    assert_eq!(
        probe.state().band_amps,
        vec![8.0, 5.0, -5.0, -8.0, -3.0, 4.0, 8.0, 11.0, 11.0, 11.0]
    );
}

#[test]
fn eq_band_set_by_frequency_then_reset() {
    let (mut core, probe) = core_with_tracks(1);
    core.set_eq_band(1000.0, 6.5);
    assert_eq!(probe.state().band_amps[4], 6.5);

    core.reset_eq();
    assert!(probe.state().band_amps.iter().all(|a| *a == 0.0));
}

// ── Missing capabilities ────────────────────────────────────────────────────

/// An engine with no capabilities at all; every trait method keeps its
/// `Unsupported` default.
struct NullEngine;
impl MediaEngine for NullEngine {}

#[test]
fn unsupported_capabilities_are_skipped_and_logged() {
    let dir = tempfile::tempdir().unwrap();
    let mut core = AppCore::new(Box::new(NullEngine), dir.path().join("settings.json"));

    core.set_volume(80);
    core.set_deinterlace(true);
    core.set_subtitle_delay(500);
    core.apply_eq_preset(Preset::Jazz);

    // The player survives, the settings still track intent
    assert_eq!(core.settings.volume, 80);
    let logs = core.get_logs(None);
    assert!(logs
        .iter()
        .any(|l| l.level == "warn" && l.message.contains("Skipped set volume")));
    assert!(logs
        .iter()
        .any(|l| l.level == "warn" && l.message.contains("not supported")));
}

#[test]
fn subtitle_file_load_respects_capabilities() {
    let (mut core, probe) = core_with_tracks(1);

    // Unsupported: silently skipped
    let mut bare = AppCore::new(
        Box::new(NullEngine),
        tempfile::tempdir().unwrap().path().join("s.json"),
    );
    assert!(bare.load_subtitle_file(std::path::Path::new("subs.srt")).is_ok());

    // Supported and working: recorded by the engine
    core.load_subtitle_file(std::path::Path::new("subs.srt")).unwrap();
    assert!(probe.state().subtitle_file.is_some());
}
