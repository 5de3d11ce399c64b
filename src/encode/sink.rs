use crate::audio::mix::frame_to_sample;
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{CodeReelError, CodeReelResult};
use crate::render::backend::FrameRGBA;
use std::path::PathBuf;

/// Configuration provided to a [`FrameSink`] before the first frame.
#[derive(Debug, Clone, PartialEq)]
pub struct SinkConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Output frames-per-second.
    pub fps: Fps,
    /// Number of frames that will be pushed before `end`.
    pub frames: u64,
    /// Soundtrack, when audio is enabled. Lasts `frames / fps` seconds.
    pub audio: Option<AudioInputConfig>,
}

impl SinkConfig {
    /// Clip duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.fps.frames_to_secs(self.frames)
    }

    /// Sample frames of a soundtrack at `sample_rate` that lasts exactly as long as the video.
    pub fn audio_frames_at(&self, sample_rate: u32) -> u64 {
        frame_to_sample(self.frames, self.fps, sample_rate)
    }

    /// Check what every sink relies on: a non-empty picture at a real frame rate, and a
    /// soundtrack (if any) whose length matches the declared frame count within one sample.
    pub fn validate(&self) -> CodeReelResult<()> {
        if self.fps.num == 0 || self.fps.den == 0 {
            return Err(CodeReelError::encoding("sink fps must be non-zero"));
        }
        if self.width == 0 || self.height == 0 {
            return Err(CodeReelError::encoding("sink width/height must be non-zero"));
        }
        let Some(audio) = &self.audio else {
            return Ok(());
        };
        if audio.sample_rate == 0 || audio.channels == 0 {
            return Err(CodeReelError::encoding(
                "audio sample_rate and channels must be non-zero",
            ));
        }
        let bytes = std::fs::metadata(&audio.path)
            .map_err(|e| {
                CodeReelError::encoding(format!(
                    "audio track '{}' is unreadable: {e}",
                    audio.path.display()
                ))
            })?
            .len();
        let frame_bytes = 4 * u64::from(audio.channels);
        if bytes % frame_bytes != 0 {
            return Err(CodeReelError::encoding(format!(
                "audio track is {bytes} bytes, not a whole number of {}-channel f32 frames",
                audio.channels
            )));
        }
        let got = bytes / frame_bytes;
        let want = self.audio_frames_at(audio.sample_rate);
        if got.abs_diff(want) > 1 {
            return Err(CodeReelError::encoding(format!(
                "audio track holds {got} sample frames but {} video frames at {}/{} fps need {want}",
                self.frames, self.fps.num, self.fps.den
            )));
        }
        Ok(())
    }

    /// Fail unless exactly the declared number of frames arrived.
    pub(crate) fn check_complete(&self, pushed: u64) -> CodeReelResult<()> {
        if pushed != self.frames {
            return Err(CodeReelError::encoding(format!(
                "sink received {pushed} frames, {} were declared",
                self.frames
            )));
        }
        Ok(())
    }
}

/// Raw PCM soundtrack handed to the encoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioInputConfig {
    /// Path to interleaved `f32le` PCM data.
    pub path: PathBuf,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Channel count.
    pub channels: u16,
}

/// Consumer of rendered frames.
///
/// `push_frame` is called in strictly increasing `FrameIndex` order, exactly
/// [`SinkConfig::frames`] times. Any error a sink returns is
/// surfaced to the caller as [`CodeReelError::Encoding`]; the session never retries.
pub trait FrameSink: Send {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> CodeReelResult<()>;
    /// Push one frame in strictly increasing timeline order.
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> CodeReelResult<()>;
    /// Called once after the last frame is pushed.
    fn end(&mut self) -> CodeReelResult<()>;
}

/// Tag a sink error as an encoding failure, keeping the message of errors that already are.
pub(crate) fn encoding_err(e: CodeReelError) -> CodeReelError {
    match e {
        CodeReelError::Encoding(_) => e,
        other => CodeReelError::encoding(other.to_string()),
    }
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    ended: bool,
    frames: Vec<(FrameIndex, FrameRGBA)>,
}

impl InMemorySink {
    /// Create a new in-memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<&SinkConfig> {
        self.cfg.as_ref()
    }

    /// Whether `end` was called after the last `begin`.
    pub fn ended(&self) -> bool {
        self.ended
    }

    /// Captured frames in push order.
    pub fn frames(&self) -> &[(FrameIndex, FrameRGBA)] {
        &self.frames
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> CodeReelResult<()> {
        cfg.validate()?;
        self.cfg = Some(cfg);
        self.ended = false;
        self.frames.clear();
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> CodeReelResult<()> {
        let Some(cfg) = &self.cfg else {
            return Err(CodeReelError::encoding("in-memory sink not started"));
        };
        if self.frames.len() as u64 >= cfg.frames {
            return Err(CodeReelError::encoding(format!(
                "frame {} exceeds the {} declared frames",
                idx.0, cfg.frames
            )));
        }
        if let Some((last, _)) = self.frames.last()
            && idx <= *last
        {
            return Err(CodeReelError::encoding(format!(
                "frame {} pushed after frame {}",
                idx.0, last.0
            )));
        }
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> CodeReelResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| CodeReelError::encoding("in-memory sink not started"))?;
        cfg.check_complete(self.frames.len() as u64)?;
        self.ended = true;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
