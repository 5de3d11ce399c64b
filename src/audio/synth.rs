//! Procedural fallback sounds: keyboard clicks, the enter key and an ambient pad.

use crate::audio::media::{AudioPcm, MIX_SAMPLE_RATE};
use crate::foundation::math::Rng64;
use std::f64::consts::TAU;

/// Pitches of the default keystroke pool.
pub const CLICK_PITCHES_HZ: [f64; 4] = [400.0, 385.0, 415.0, 430.0];

const PAD_CHORD_HZ: [f64; 3] = [110.0, 164.81, 220.0];
const PAD_AMPLITUDE: f64 = 0.02;
const PAD_LFO_HZ: f64 = 0.2;
const PAD_LFO_DEPTH: f64 = 0.3;
const PAD_FADE_SECS: f64 = 1.0;

/// Shape of a percussive "thock": a sine tone plus a white-noise transient, faded out.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ThockShape {
    /// Tone pitch.
    pub tone_hz: f64,
    /// Tone length.
    pub tone_ms: u32,
    /// Tone level in dBFS.
    pub tone_db: f64,
    /// Noise burst length.
    pub noise_ms: u32,
    /// Noise level in dBFS.
    pub noise_db: f64,
    /// Linear fade-out at the end.
    pub fade_ms: u32,
}

impl ThockShape {
    /// Short mechanical key click.
    pub fn click(tone_hz: f64) -> Self {
        Self {
            tone_hz,
            tone_ms: 30,
            tone_db: -5.0,
            noise_ms: 15,
            noise_db: -10.0,
            fade_ms: 10,
        }
    }

    /// Heavier enter key.
    pub fn enter() -> Self {
        Self {
            tone_hz: 300.0,
            tone_ms: 60,
            tone_db: -3.0,
            noise_ms: 30,
            noise_db: -8.0,
            fade_ms: 20,
        }
    }
}

fn db_to_gain(db: f64) -> f64 {
    10f64.powf(db / 20.0)
}

fn ms_to_samples(ms: u32) -> usize {
    (u64::from(ms) * u64::from(MIX_SAMPLE_RATE) / 1000) as usize
}

/// Render a thock as stereo PCM. Noise comes from `rng`.
pub fn thock(shape: ThockShape, rng: &mut Rng64) -> AudioPcm {
    let sr = f64::from(MIX_SAMPLE_RATE);
    let tone_len = ms_to_samples(shape.tone_ms);
    let noise_len = ms_to_samples(shape.noise_ms);
    let len = tone_len.max(noise_len);
    let fade_len = ms_to_samples(shape.fade_ms).min(len);
    let tone_gain = db_to_gain(shape.tone_db);
    let noise_gain = db_to_gain(shape.noise_db);

    let mono: Vec<f32> = (0..len)
        .map(|i| {
            let mut v = 0.0;
            if i < tone_len {
                v += (TAU * shape.tone_hz * i as f64 / sr).sin() * tone_gain;
            }
            if i < noise_len {
                v += (rng.next_f64_01() * 2.0 - 1.0) * noise_gain;
            }
            let from_end = len - i;
            if from_end <= fade_len {
                v *= (from_end - 1) as f64 / fade_len as f64;
            }
            v as f32
        })
        .collect();
    AudioPcm::stereo_from_mono(&mono)
}

/// Default keystroke pool, one click per entry of [`CLICK_PITCHES_HZ`].
pub fn click_pool(rng: &mut Rng64) -> Vec<AudioPcm> {
    CLICK_PITCHES_HZ
        .iter()
        .map(|&hz| thock(ThockShape::click(hz), rng))
        .collect()
}

/// Low ambient chord with a slow tremolo and 1 s fades, exactly `frames` sample frames long.
pub fn pad(frames: usize) -> AudioPcm {
    let sr = f64::from(MIX_SAMPLE_RATE);
    let fade = (PAD_FADE_SECS * sr).min(frames as f64 / 2.0);
    let mono: Vec<f32> = (0..frames)
        .map(|i| {
            let t = i as f64 / sr;
            let chord: f64 = PAD_CHORD_HZ.iter().map(|hz| (TAU * hz * t).sin()).sum();
            let lfo = 1.0 - PAD_LFO_DEPTH * 0.5 * (1.0 - (TAU * PAD_LFO_HZ * t).cos());
            let pos = i as f64;
            let env = if fade > 0.0 {
                (pos / fade).min((frames as f64 - 1.0 - pos) / fade).clamp(0.0, 1.0)
            } else {
                1.0
            };
            (chord * PAD_AMPLITUDE * lfo * env) as f32
        })
        .collect();
    AudioPcm::stereo_from_mono(&mono)
}

#[cfg(test)]
#[path = "../../tests/unit/audio/synth.rs"]
mod tests;
