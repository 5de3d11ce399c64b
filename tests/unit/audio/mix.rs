use super::*;
use crate::audio::media::{MIX_CHANNELS, MIX_SAMPLE_RATE};

fn constant(frames: usize, v: f32) -> Arc<AudioPcm> {
    Arc::new(AudioPcm::stereo_from_mono(&vec![v; frames]))
}

fn manifest(total: u64, segments: Vec<AudioSegment>) -> AudioManifest {
    AudioManifest {
        sample_rate: MIX_SAMPLE_RATE,
        channels: MIX_CHANNELS,
        total_samples: total,
        segments,
    }
}

#[test]
fn frame_to_sample_uses_rational_fps() {
    let fps = Fps {
        num: 30_000,
        den: 1001,
    };
    assert_eq!(frame_to_sample(0, fps, 48_000), 0);
    assert_eq!(frame_to_sample(1, fps, 48_000), 1602);
    assert_eq!(frame_to_sample(30, Fps { num: 30, den: 1 }, 48_000), 48_000);
}

#[test]
fn one_shot_lands_at_its_offset() {
    let m = manifest(10, vec![AudioSegment::one_shot(4, constant(3, 0.5), 1.0)]);
    let out = mix_manifest(&m);
    assert_eq!(out.len(), 20);
    let left: Vec<f32> = out.iter().step_by(2).copied().collect();
    assert_eq!(left, vec![0.0, 0.0, 0.0, 0.0, 0.5, 0.5, 0.5, 0.0, 0.0, 0.0]);
}

#[test]
fn segments_past_the_end_are_truncated() {
    let m = manifest(5, vec![AudioSegment::one_shot(3, constant(10, 0.25), 1.0)]);
    let out = mix_manifest(&m);
    assert_eq!(out.len(), 10);
    assert_eq!(out[8], 0.25);
}

#[test]
fn looped_source_fills_the_segment() {
    let src = Arc::new(AudioPcm::stereo_from_mono(&[0.1, 0.2]));
    let mut seg = AudioSegment::one_shot(0, src, 1.0);
    seg.end_sample = 5;
    seg.looped = true;
    let out = mix_manifest(&manifest(5, vec![seg]));
    let left: Vec<f32> = out.iter().step_by(2).copied().collect();
    assert_eq!(left, vec![0.1, 0.2, 0.1, 0.2, 0.1]);
}

#[test]
fn overlapping_segments_sum_and_clamp() {
    let m = manifest(
        2,
        vec![
            AudioSegment::one_shot(0, constant(2, 0.7), 1.0),
            AudioSegment::one_shot(0, constant(2, 0.7), 1.0),
        ],
    );
    assert!(mix_manifest(&m).iter().all(|&v| v == 1.0));
}

#[test]
fn mix_applies_fade_in() {
    let mut seg = AudioSegment::one_shot(0, constant(48_000, 1.0), 1.0);
    seg.fade_in_sec = 1.0;
    let out = mix_manifest(&manifest(48_000, vec![seg]));
    assert!(out[0].abs() < 1e-6);
    assert!(out[out.len() - 2] > 0.5);
}

#[test]
fn f32le_file_has_four_bytes_per_sample() {
    let path = std::env::temp_dir()
        .join(format!("codereel-mix-{}", std::process::id()))
        .join("mix.f32le");
    write_mix_to_f32le_file(&[0.5, -1.0, 0.0], &path).unwrap();
    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(bytes.len(), 12);
    assert_eq!(f32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]), -1.0);
    let _ = std::fs::remove_dir_all(path.parent().unwrap());
}
