use crate::audio::media::AudioPcm;
use crate::foundation::core::Fps;
use crate::foundation::error::{CodeReelError, CodeReelResult};
use std::path::Path;
use std::sync::Arc;

#[derive(Clone, Debug)]
/// One scheduled sound in timeline sample space.
pub(crate) struct AudioSegment {
    pub(crate) start_sample: u64,
    /// Exclusive; clamped to the track length when mixing.
    pub(crate) end_sample: u64,
    pub(crate) volume: f32,
    pub(crate) fade_in_sec: f64,
    pub(crate) fade_out_sec: f64,
    /// Restart the source when it runs out before `end_sample`.
    pub(crate) looped: bool,
    pub(crate) source: Arc<AudioPcm>,
}

impl AudioSegment {
    /// Play `source` once from `start_sample`.
    pub(crate) fn one_shot(start_sample: u64, source: Arc<AudioPcm>, volume: f32) -> Self {
        Self {
            start_sample,
            end_sample: start_sample + source.frames() as u64,
            volume,
            fade_in_sec: 0.0,
            fade_out_sec: 0.0,
            looped: false,
            source,
        }
    }
}

#[derive(Clone, Debug)]
/// Everything to mix into one track.
pub(crate) struct AudioManifest {
    pub(crate) sample_rate: u32,
    pub(crate) channels: u16,
    pub(crate) total_samples: u64,
    pub(crate) segments: Vec<AudioSegment>,
}

/// Mix all manifest segments into interleaved output PCM clamped to `[-1, 1]`.
pub(crate) fn mix_manifest(manifest: &AudioManifest) -> Vec<f32> {
    let frames = manifest.total_samples as usize;
    let mut out = vec![0.0f32; frames * usize::from(manifest.channels)];

    for seg in &manifest.segments {
        mix_segment(&mut out, manifest, seg);
    }

    for s in &mut out {
        *s = s.clamp(-1.0, 1.0);
    }
    out
}

fn mix_segment(out: &mut [f32], manifest: &AudioManifest, seg: &AudioSegment) {
    let end = seg.end_sample.min(manifest.total_samples);
    if end <= seg.start_sample {
        return;
    }
    let seg_len_samples = end - seg.start_sample;

    let src = &seg.source;
    let src_frames = src.frames();
    if src_frames == 0 {
        return;
    }
    let src_ch = usize::from(src.channels);
    let out_ch = usize::from(manifest.channels);

    for dst_sample in seg.start_sample..end {
        let rel = (dst_sample - seg.start_sample) as usize;
        let src_frame = if seg.looped {
            rel % src_frames
        } else if rel < src_frames {
            rel
        } else {
            break;
        };

        let rel_sec = rel as f64 / f64::from(manifest.sample_rate);
        let gain = fade_gain(seg, rel_sec, seg_len_samples, manifest.sample_rate) * seg.volume;
        let i = src_frame * src_ch;
        let (l, r) = if src_ch == 1 {
            (src.interleaved_f32[i], src.interleaved_f32[i])
        } else {
            (src.interleaved_f32[i], src.interleaved_f32[i + 1])
        };

        let dst_idx = dst_sample as usize * out_ch;
        out[dst_idx] += l * gain;
        if out_ch > 1 {
            out[dst_idx + 1] += r * gain;
        }
    }
}

fn fade_gain(seg: &AudioSegment, rel_sec: f64, seg_len_samples: u64, sample_rate: u32) -> f32 {
    let mut gain = 1.0f32;
    if seg.fade_in_sec > 0.0 {
        let t = (rel_sec / seg.fade_in_sec).clamp(0.0, 1.0) as f32;
        gain *= t;
    }
    if seg.fade_out_sec > 0.0 {
        let seg_len_sec = (seg_len_samples as f64) / f64::from(sample_rate);
        let rem = (seg_len_sec - rel_sec).max(0.0);
        let t = (rem / seg.fade_out_sec).clamp(0.0, 1.0) as f32;
        gain *= t;
    }
    gain
}

/// Write interleaved `f32` PCM samples to raw little-endian `.f32le` file.
pub(crate) fn write_mix_to_f32le_file(
    samples_interleaved: &[f32],
    out_path: &Path,
) -> CodeReelResult<()> {
    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            CodeReelError::encoding(format!(
                "failed to create audio mix output directory '{}': {e}",
                parent.display()
            ))
        })?;
    }

    let mut bytes = Vec::<u8>::with_capacity(samples_interleaved.len() * 4);
    for &sample in samples_interleaved {
        bytes.extend_from_slice(&sample.to_le_bytes());
    }
    std::fs::write(out_path, bytes).map_err(|e| {
        CodeReelError::encoding(format!(
            "failed to write mixed audio file '{}': {e}",
            out_path.display()
        ))
    })
}

/// Convert a frame count to the nearest sample index at `sample_rate`.
pub(crate) fn frame_to_sample(frames: u64, fps: Fps, sample_rate: u32) -> u64 {
    let num = u128::from(frames) * u128::from(sample_rate) * u128::from(fps.den);
    let den = u128::from(fps.num);
    ((num + (den / 2)) / den) as u64
}

#[cfg(test)]
#[path = "../../tests/unit/audio/mix.rs"]
mod tests;
