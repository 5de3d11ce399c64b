use crate::audio::events::{AudioEvent, SampleId};
use crate::audio::media::{
    AudioPcm, MIX_CHANNELS, MIX_SAMPLE_RATE, decode_audio_f32_stereo, list_samples,
};
use crate::audio::mix::{AudioManifest, AudioSegment, frame_to_sample, mix_manifest, write_mix_to_f32le_file};
use crate::audio::synth;
use crate::foundation::core::{Fps, FrameIndex, FrameRange};
use crate::foundation::error::{CodeReelError, CodeReelResult};
use crate::foundation::math::Rng64;
use crate::timeline::schedule::Timeline;
use std::path::Path;
use std::sync::Arc;

/// Gain of a user-supplied ambient track under the keystrokes.
pub const AMBIENT_VOLUME: f32 = 0.12;
/// Fade in and out of the ambient bed.
pub const AMBIENT_FADE_SECS: f64 = 1.0;

/// Mixed stereo soundtrack covering the whole clip.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioTrack {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Channel count.
    pub channels: u16,
    /// Interleaved samples in `[-1, 1]`.
    pub samples: Vec<f32>,
}

impl AudioTrack {
    /// Sample frames (one value per channel).
    pub fn frames(&self) -> usize {
        self.samples.len() / usize::from(self.channels.max(1))
    }

    /// Track length in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.frames() as f64 / f64::from(self.sample_rate)
    }

    /// Part of the track under `range` of a clip at `fps`.
    ///
    /// Cut points are rounded to the nearest sample frame, so consecutive ranges tile the track.
    pub fn slice(&self, range: FrameRange, fps: Fps) -> AudioTrack {
        let ch = usize::from(self.channels.max(1));
        let at = |f: FrameIndex| {
            let s = frame_to_sample(f.0, fps, self.sample_rate);
            usize::try_from(s).unwrap_or(usize::MAX).min(self.frames())
        };
        let start = at(range.start);
        let end = at(range.end).max(start);
        AudioTrack {
            sample_rate: self.sample_rate,
            channels: self.channels,
            samples: self.samples[start * ch..end * ch].to_vec(),
        }
    }

    /// Write the track as raw interleaved `f32le`, the format the encoder reads.
    pub fn write_f32le(&self, path: &Path) -> CodeReelResult<()> {
        write_mix_to_f32le_file(&self.samples, path)
    }
}

/// Sound sources for one render: keystroke pool, enter key and optional ambient bed.
#[derive(Clone, Debug)]
pub(crate) struct AudioAssets {
    pub(crate) keys: Vec<Arc<AudioPcm>>,
    pub(crate) enter: Arc<AudioPcm>,
    pub(crate) ambient: Option<Arc<AudioPcm>>,
}

impl AudioAssets {
    /// Synthesized clicks and enter key, no ambient track.
    pub(crate) fn synthesized(rng: &mut Rng64) -> Self {
        Self {
            keys: synth::click_pool(rng).into_iter().map(Arc::new).collect(),
            enter: Arc::new(synth::thock(synth::ThockShape::enter(), rng)),
            ambient: None,
        }
    }

    /// Load user assets where configured, degrading to synthesized sounds. Never fails.
    pub(crate) fn load(samples_dir: Option<&Path>, ambient: Option<&Path>, rng: &mut Rng64) -> Self {
        let mut assets = Self::synthesized(rng);
        if let Some(dir) = samples_dir {
            match load_key_samples(dir) {
                Ok(keys) => {
                    tracing::debug!(dir = %dir.display(), count = keys.len(), "loaded keystroke samples");
                    assets.keys = keys;
                }
                Err(e) => tracing::info!(error = %e, "using synthesized keystrokes"),
            }
        }
        if let Some(path) = ambient {
            match decode_audio_f32_stereo(path, MIX_SAMPLE_RATE) {
                Ok(pcm) => assets.ambient = Some(Arc::new(pcm)),
                Err(e) => tracing::info!(error = %e, "using synthesized ambient pad"),
            }
        }
        assets
    }
}

fn load_key_samples(dir: &Path) -> CodeReelResult<Vec<Arc<AudioPcm>>> {
    let keys: Vec<Arc<AudioPcm>> = list_samples(dir)?
        .iter()
        .filter_map(|p| match decode_audio_f32_stereo(p, MIX_SAMPLE_RATE) {
            Ok(pcm) => Some(Arc::new(pcm)),
            Err(e) => {
                tracing::debug!(path = %p.display(), error = %e, "skipping keystroke sample");
                None
            }
        })
        .collect();
    if keys.is_empty() {
        return Err(CodeReelError::asset_missing(format!(
            "no decodable samples in '{}'",
            dir.display()
        )));
    }
    Ok(keys)
}

/// Mix the cue sounds over a full-length background bed.
///
/// The track is exactly `total_frames / fps` long, rounded to the nearest sample.
pub(crate) fn compose_audio(
    timeline: &Timeline,
    events: &[AudioEvent],
    assets: &AudioAssets,
) -> CodeReelResult<AudioTrack> {
    if assets.keys.is_empty() {
        return Err(CodeReelError::render("keystroke pool is empty"));
    }
    let fps = timeline.fps();
    let total_samples = frame_to_sample(timeline.total_frames(), fps, MIX_SAMPLE_RATE);

    let bed = match &assets.ambient {
        Some(src) => AudioSegment {
            start_sample: 0,
            end_sample: total_samples,
            volume: AMBIENT_VOLUME,
            fade_in_sec: AMBIENT_FADE_SECS,
            fade_out_sec: AMBIENT_FADE_SECS,
            looped: true,
            source: Arc::clone(src),
        },
        None => AudioSegment::one_shot(0, Arc::new(synth::pad(total_samples as usize)), 1.0),
    };

    let mut segments = Vec::with_capacity(events.len() + 1);
    segments.push(bed);
    for ev in events {
        let source = match ev.sample {
            SampleId::Key(i) => &assets.keys[i % assets.keys.len()],
            SampleId::Enter | SampleId::Submit => &assets.enter,
        };
        let start = frame_to_sample(ev.frame.0, fps, MIX_SAMPLE_RATE);
        segments.push(AudioSegment::one_shot(start, Arc::clone(source), 1.0));
    }

    let manifest = AudioManifest {
        sample_rate: MIX_SAMPLE_RATE,
        channels: MIX_CHANNELS,
        total_samples,
        segments,
    };
    let samples = mix_manifest(&manifest);
    tracing::debug!(
        total_samples,
        cues = events.len(),
        ambient = assets.ambient.is_some(),
        "audio mixed"
    );
    Ok(AudioTrack {
        sample_rate: MIX_SAMPLE_RATE,
        channels: MIX_CHANNELS,
        samples,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/audio/compose.rs"]
mod tests;
