//! Default engine backend over rodio.
//!
//! Supports transport, seeking, position, rate, and volume. Equalizer,
//! subtitle, and video calls fall through to the trait's `Unsupported`
//! defaults — rodio has no such controls, and the application is expected
//! to skip those operations rather than fail.

use crate::media_engine::{EngineError, EngineResult, MediaEngine};
use lofty::file::AudioFile;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub struct RodioEngine {
    _stream: OutputStream,
    _handle: OutputStreamHandle,
    sink: Sink,
    loaded: Option<PathBuf>,
    duration: Option<Duration>,
    stopped: bool,
}

impl RodioEngine {
    /// Initialize audio output. Failure here is fatal to the application.
    pub fn new() -> Result<Self, String> {
        let (stream, handle) = OutputStream::try_default()
            .map_err(|e| format!("Failed to open audio output: {}", e))?;
        let sink = Sink::try_new(&handle)
            .map_err(|e| format!("Failed to create audio sink: {}", e))?;
        sink.pause();
        Ok(RodioEngine {
            _stream: stream,
            _handle: handle,
            sink,
            loaded: None,
            duration: None,
            stopped: false,
        })
    }

    fn require_media(&self) -> EngineResult<()> {
        if self.loaded.is_none() {
            return Err(EngineError::NoMedia);
        }
        Ok(())
    }
}

impl MediaEngine for RodioEngine {
    fn load(&mut self, path: &Path) -> EngineResult<()> {
        let file = File::open(path)
            .map_err(|e| EngineError::Failed(format!("Cannot open '{}': {}", path.display(), e)))?;
        let source = Decoder::new(BufReader::new(file)).map_err(|e| {
            EngineError::Failed(format!("Cannot decode '{}': {}", path.display(), e))
        })?;

        // Prefer the decoder's idea of the duration, fall back to tags
        let duration = source.total_duration().or_else(|| {
            lofty::read_from_path(path)
                .ok()
                .map(|f| f.properties().duration())
        });

        self.sink.stop();
        self.sink.append(source);
        self.sink.pause();
        self.loaded = Some(path.to_path_buf());
        self.duration = duration;
        self.stopped = false;
        Ok(())
    }

    fn play(&mut self) -> EngineResult<()> {
        self.require_media()?;
        self.sink.play();
        Ok(())
    }

    fn pause(&mut self) -> EngineResult<()> {
        self.require_media()?;
        self.sink.pause();
        Ok(())
    }

    fn stop(&mut self) -> EngineResult<()> {
        self.sink.stop();
        self.stopped = true;
        Ok(())
    }

    fn is_playing(&self) -> bool {
        self.loaded.is_some() && !self.sink.is_paused() && !self.sink.empty()
    }

    fn end_of_media(&self) -> bool {
        // A user stop also drains the sink; only a natural drain counts.
        self.loaded.is_some() && self.sink.empty() && !self.stopped
    }

    fn seek_fraction(&mut self, fraction: f64) -> EngineResult<()> {
        self.require_media()?;
        let duration = self.duration.ok_or(EngineError::Unsupported)?;
        let target = duration.mul_f64(fraction.clamp(0.0, 1.0));
        self.sink
            .try_seek(target)
            .map_err(|e| EngineError::Failed(format!("Seek failed: {:?}", e)))
    }

    fn position_fraction(&self) -> EngineResult<f64> {
        self.require_media()?;
        match self.duration {
            Some(d) if !d.is_zero() => {
                Ok((self.sink.get_pos().as_secs_f64() / d.as_secs_f64()).clamp(0.0, 1.0))
            }
            _ => Ok(0.0),
        }
    }

    fn time_ms(&self) -> EngineResult<i64> {
        self.require_media()?;
        Ok(self.sink.get_pos().as_millis() as i64)
    }

    fn length_ms(&self) -> EngineResult<i64> {
        self.require_media()?;
        Ok(self.duration.map(|d| d.as_millis() as i64).unwrap_or(0))
    }

    fn set_time_ms(&mut self, time_ms: i64) -> EngineResult<()> {
        self.require_media()?;
        let target = Duration::from_millis(time_ms.max(0) as u64);
        self.sink
            .try_seek(target)
            .map_err(|e| EngineError::Failed(format!("Seek failed: {:?}", e)))
    }

    fn set_rate(&mut self, rate: f32) -> EngineResult<()> {
        self.sink.set_speed(rate.max(0.01));
        Ok(())
    }

    fn set_volume(&mut self, volume: u8) -> EngineResult<()> {
        self.sink.set_volume(volume.min(100) as f32 / 100.0);
        Ok(())
    }
}
