use clap::{Parser, Subcommand};
use rhythms::app_core::AppCore;
use rhythms::backend_rodio::RodioEngine;
use rhythms::controller::{PlaybackMode, TickOutcome};
use rhythms::equalizer::Preset;
use rhythms::playlist::Entry;
use rhythms::settings::{default_settings_path, Settings};
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "rhythms", about = "Rhythms media player CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play media files, honoring the configured playback mode
    Play {
        /// Media file path(s)
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Playback mode (normal, repeat-one, repeat-all, shuffle; overrides config)
        #[arg(short, long)]
        mode: Option<String>,
        /// Volume 0-100 (overrides config)
        #[arg(short, long)]
        volume: Option<u8>,
        /// Playback rate (e.g., 1.5)
        #[arg(short, long)]
        rate: Option<f32>,
        /// Equalizer preset (flat, classical, rock, pop, jazz, electronic)
        #[arg(short, long)]
        preset: Option<String>,
    },
    /// Show metadata for media files without playing them
    Inspect {
        /// Media file path(s)
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Player configuration
    Config {
        #[command(subcommand)]
        action: ConfigCmd,
    },
}

#[derive(Subcommand)]
enum ConfigCmd {
    /// Show current configuration
    Show,
    /// Set the default volume (0-100)
    Volume { value: u8 },
    /// Set the default playback mode
    Mode { mode: String },
}

fn main() {
    let cli = Cli::parse();
    let settings_path = default_settings_path();

    match cli.command {
        Commands::Play {
            files,
            mode,
            volume,
            rate,
            preset,
        } => {
            let mode = mode.map(|m| match PlaybackMode::from_str_loose(&m) {
                Ok(mode) => mode,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            });
            let preset = preset.map(|p| match Preset::from_str_loose(&p) {
                Ok(preset) => preset,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            });

            // Engine initialization failure is fatal
            let engine = match RodioEngine::new() {
                Ok(e) => e,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            };

            if let Some(dir) = settings_path.parent() {
                let _ = std::fs::create_dir_all(dir);
            }
            let mut core = AppCore::new(Box::new(engine), settings_path);

            if let Some(mode) = mode {
                core.set_playback_mode(mode);
            }
            if let Some(volume) = volume {
                core.set_volume(volume);
            }
            if let Some(rate) = rate {
                core.set_rate(rate);
            }
            if let Some(preset) = preset {
                core.apply_eq_preset(preset);
            }

            if let Err(e) = core.add_files(&files) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }

            run_tick_loop(&mut core);

            if let Err(e) = core.save_settings() {
                eprintln!("Warning: could not save settings: {}", e);
            }
        }
        Commands::Inspect { files } => {
            for path in &files {
                match Entry::from_path(path) {
                    Ok(entry) => println!(
                        "{} — {} [{}] ({})",
                        entry.artist,
                        entry.title,
                        entry.duration_display(),
                        entry.path.display()
                    ),
                    Err(e) => eprintln!("Error: {}", e),
                }
            }
        }
        Commands::Config { action } => {
            let mut settings = Settings::load_from(&settings_path);
            match action {
                ConfigCmd::Show => {
                    println!(
                        "Playback mode: {}\nVolume: {}\nSubtitle font: {} {}pt{}{}",
                        PlaybackMode::from_code(settings.playback_mode),
                        settings.volume,
                        settings.subtitle_font.family,
                        settings.subtitle_font.size,
                        if settings.subtitle_font.bold { " bold" } else { "" },
                        if settings.subtitle_font.italic { " italic" } else { "" },
                    );
                    if !settings.video_adjustments.is_empty() {
                        println!("Video adjustments:");
                        for (name, value) in &settings.video_adjustments {
                            println!("  {}: {}", name, value);
                        }
                    }
                    return;
                }
                ConfigCmd::Volume { value } => {
                    if value > 100 {
                        eprintln!("Error: volume must be 0-100");
                        std::process::exit(1);
                    }
                    settings.volume = value;
                    println!("Volume set to {}", value);
                }
                ConfigCmd::Mode { mode } => match PlaybackMode::from_str_loose(&mode) {
                    Ok(parsed) => {
                        settings.playback_mode = parsed.code();
                        println!("Playback mode set to {}", parsed);
                    }
                    Err(e) => {
                        eprintln!("Error: {}", e);
                        std::process::exit(1);
                    }
                },
            }
            if let Some(dir) = settings_path.parent() {
                let _ = std::fs::create_dir_all(dir);
            }
            if let Err(e) = settings.save_to(&settings_path) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    }
}

/// Drive the controller at its ~1 Hz cadence until the repeat policy halts.
fn run_tick_loop(core: &mut AppCore) {
    let mut last_title: Option<String> = None;

    loop {
        let outcome = core.tick();
        let transport = core.get_transport();

        if transport.track_title != last_title {
            if let (Some(title), Some(artist)) = (&transport.track_title, &transport.track_artist) {
                println!("\nNow playing: {} — {}", artist, title);
                last_title = transport.track_title.clone();
            }
        }

        match outcome {
            TickOutcome::Progress { .. } | TickOutcome::LoopSeek => {
                print!(
                    "\r{} / {}",
                    transport.time_display, transport.length_display
                );
                let _ = std::io::stdout().flush();
            }
            TickOutcome::Halt => {
                println!("\nPlayback finished.");
                break;
            }
            TickOutcome::Idle => {
                if !transport.is_playing {
                    break;
                }
            }
            TickOutcome::Load(_) => {}
        }

        std::thread::sleep(Duration::from_secs(1));
    }
}
