use crate::foundation::error::{CodeReelError, CodeReelResult};
use std::path::{Path, PathBuf};

/// Sample rate of the mix and of every decoded or synthesized source.
pub const MIX_SAMPLE_RATE: u32 = 48_000;
/// Channel count of the mix.
pub const MIX_CHANNELS: u16 = 2;

const SAMPLE_EXTENSIONS: &[&str] = &["wav", "mp3", "ogg", "flac", "m4a"];

#[derive(Clone, Debug, PartialEq)]
/// Decoded interleaved floating-point PCM.
pub struct AudioPcm {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Channel count.
    pub channels: u16,
    /// Interleaved `f32` PCM samples.
    pub interleaved_f32: Vec<f32>,
}

impl AudioPcm {
    /// Stereo PCM at the mix rate from a mono signal.
    pub fn stereo_from_mono(mono: &[f32]) -> Self {
        Self {
            sample_rate: MIX_SAMPLE_RATE,
            channels: MIX_CHANNELS,
            interleaved_f32: mono.iter().flat_map(|&v| [v, v]).collect(),
        }
    }

    /// Number of sample frames (one value per channel).
    pub fn frames(&self) -> usize {
        self.interleaved_f32.len() / usize::from(self.channels.max(1))
    }
}

/// Audio files in `dir`, sorted by name so the pool order is stable.
pub(crate) fn list_samples(dir: &Path) -> CodeReelResult<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|e| {
        CodeReelError::asset_missing(format!("read samples dir '{}': {e}", dir.display()))
    })?;
    let mut out: Vec<PathBuf> = entries
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| SAMPLE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        })
        .collect();
    out.sort();
    Ok(out)
}

#[cfg(feature = "media-ffmpeg")]
/// Decode any audio file to stereo interleaved `f32` PCM at `sample_rate` through `ffmpeg`.
pub fn decode_audio_f32_stereo(path: &Path, sample_rate: u32) -> CodeReelResult<AudioPcm> {
    if !path.is_file() {
        return Err(CodeReelError::asset_missing(format!(
            "audio file '{}' not found",
            path.display()
        )));
    }
    let out = std::process::Command::new("ffmpeg")
        .args(["-v", "error", "-i"])
        .arg(path)
        .args([
            "-vn",
            "-f",
            "f32le",
            "-acodec",
            "pcm_f32le",
            "-ac",
            "2",
            "-ar",
            &sample_rate.to_string(),
            "pipe:1",
        ])
        .output()
        .map_err(|e| {
            CodeReelError::asset_missing(format!("failed to run ffmpeg for audio decode: {e}"))
        })?;

    if !out.status.success() {
        let msg = String::from_utf8_lossy(&out.stderr);
        return Err(CodeReelError::asset_missing(format!(
            "ffmpeg audio decode failed for '{}': {}",
            path.display(),
            msg.trim()
        )));
    }
    if !out.stdout.len().is_multiple_of(4) {
        return Err(CodeReelError::asset_missing(
            "decoded audio byte length is not aligned to f32 samples",
        ));
    }

    let pcm = out
        .stdout
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect::<Vec<_>>();
    if pcm.is_empty() {
        return Err(CodeReelError::asset_missing(format!(
            "'{}' has no audio",
            path.display()
        )));
    }
    Ok(AudioPcm {
        sample_rate,
        channels: 2,
        interleaved_f32: pcm,
    })
}

#[cfg(not(feature = "media-ffmpeg"))]
/// Decode audio from media source to stereo interleaved `f32` PCM.
///
/// Returns an error when `media-ffmpeg` feature is disabled.
pub fn decode_audio_f32_stereo(_path: &Path, _sample_rate: u32) -> CodeReelResult<AudioPcm> {
    Err(CodeReelError::asset_missing(
        "audio assets require the 'media-ffmpeg' feature",
    ))
}

// No unit tests for decoding: it shells out to `ffmpeg` and is exercised by the composer tests
// through the fallback path.
#[cfg(test)]
#[path = "../../tests/unit/audio/media.rs"]
mod tests;
