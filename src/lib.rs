//! rhythms — Core library for the Rhythms media player.
//!
//! All playlist, playback-control, and settings logic lives here. The CLI
//! and any GUI shell consume this crate through `AppCore`; decoding and
//! audio output are delegated to an external engine behind `MediaEngine`.

pub mod app_core;
pub mod backend_rodio;
pub mod controller;
pub mod equalizer;
pub mod media_engine;
pub mod playlist;
pub mod settings;
pub mod subtitle;
pub mod video;
