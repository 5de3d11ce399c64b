use super::*;

fn cfg() -> SinkConfig {
    cfg_frames(2)
}

fn cfg_frames(frames: u64) -> SinkConfig {
    SinkConfig {
        width: 2,
        height: 2,
        fps: Fps::new(30, 1).unwrap(),
        frames,
        audio: None,
    }
}

fn f32le_file(name: &str, sample_frames: usize, channels: u16) -> PathBuf {
    let path = std::env::temp_dir().join(format!("codereel-sink-{}-{name}.f32le", std::process::id()));
    let bytes = vec![0u8; sample_frames * 4 * usize::from(channels)];
    std::fs::write(&path, bytes).unwrap();
    path
}

fn with_audio(frames: u64, path: PathBuf) -> SinkConfig {
    SinkConfig {
        audio: Some(AudioInputConfig {
            path,
            sample_rate: 48_000,
            channels: 2,
        }),
        ..cfg_frames(frames)
    }
}

fn frame() -> FrameRGBA {
    FrameRGBA {
        width: 2,
        height: 2,
        data: vec![0; 16],
        premultiplied: true,
    }
}

#[test]
fn in_memory_sink_captures_frames_in_order() {
    let mut sink = InMemorySink::new();
    sink.begin(cfg()).unwrap();
    sink.push_frame(FrameIndex(0), &frame()).unwrap();
    sink.push_frame(FrameIndex(3), &frame()).unwrap();
    sink.end().unwrap();
    assert!(sink.ended());
    assert_eq!(sink.config(), Some(&cfg()));
    let idx: Vec<u64> = sink.frames().iter().map(|(i, _)| i.0).collect();
    assert_eq!(idx, vec![0, 3]);
}

#[test]
fn in_memory_sink_rejects_out_of_order_frames() {
    let mut sink = InMemorySink::new();
    sink.begin(cfg()).unwrap();
    sink.push_frame(FrameIndex(2), &frame()).unwrap();
    let err = sink.push_frame(FrameIndex(2), &frame()).unwrap_err();
    assert!(matches!(err, CodeReelError::Encoding(_)));
}

#[test]
fn in_memory_sink_requires_begin() {
    let mut sink = InMemorySink::new();
    assert!(sink.push_frame(FrameIndex(0), &frame()).is_err());
}

#[test]
fn begin_resets_previous_run() {
    let mut sink = InMemorySink::new();
    sink.begin(cfg_frames(1)).unwrap();
    sink.push_frame(FrameIndex(0), &frame()).unwrap();
    sink.end().unwrap();
    sink.begin(cfg()).unwrap();
    assert!(sink.frames().is_empty());
    assert!(!sink.ended());
}

#[test]
fn encoding_err_wraps_other_kinds() {
    let e = encoding_err(CodeReelError::render("boom"));
    assert!(matches!(e, CodeReelError::Encoding(ref m) if m.contains("boom")));
    let e = encoding_err(CodeReelError::encoding("pipe closed"));
    assert_eq!(e.to_string(), "encoding failure: pipe closed");
}

#[test]
fn end_rejects_missing_frames() {
    let mut sink = InMemorySink::new();
    sink.begin(cfg_frames(3)).unwrap();
    sink.push_frame(FrameIndex(0), &frame()).unwrap();
    let err = sink.end().unwrap_err();
    assert!(matches!(err, CodeReelError::Encoding(ref m) if m.contains("1 frames, 3")));
    assert!(!sink.ended());
}

#[test]
fn extra_frames_are_rejected() {
    let mut sink = InMemorySink::new();
    sink.begin(cfg_frames(1)).unwrap();
    sink.push_frame(FrameIndex(0), &frame()).unwrap();
    assert!(sink.push_frame(FrameIndex(1), &frame()).is_err());
}

#[test]
fn audio_of_matching_length_is_accepted() {
    // 45 frames at 30 fps = 1.5 s = 72000 sample frames; one sample of slack either way.
    for n in [71_999, 72_000, 72_001] {
        let path = f32le_file(&format!("ok{n}"), n, 2);
        let cfg = with_audio(45, path.clone());
        assert_eq!(cfg.audio_frames_at(48_000), 72_000);
        cfg.validate().unwrap();
        let _ = std::fs::remove_file(path);
    }
}

#[test]
fn audio_of_wrong_length_is_rejected() {
    let path = f32le_file("short", 48_000, 2);
    let mut sink = InMemorySink::new();
    let err = sink.begin(with_audio(45, path.clone())).unwrap_err();
    assert!(matches!(err, CodeReelError::Encoding(ref m) if m.contains("48000 sample frames")));
    assert!(sink.config().is_none());
    let _ = std::fs::remove_file(path);
}

#[test]
fn audio_with_partial_sample_frames_is_rejected() {
    let path = std::env::temp_dir().join(format!("codereel-sink-{}-odd.f32le", std::process::id()));
    std::fs::write(&path, [0u8; 12]).unwrap();
    let err = with_audio(1, path.clone()).validate().unwrap_err();
    assert!(matches!(err, CodeReelError::Encoding(_)));
    let _ = std::fs::remove_file(path);
}

#[test]
fn missing_audio_file_is_an_encoding_error() {
    let path = std::env::temp_dir().join("codereel-sink-does-not-exist.f32le");
    let err = with_audio(1, path).validate().unwrap_err();
    assert!(matches!(err, CodeReelError::Encoding(_)));
}

#[test]
fn zero_sized_picture_is_rejected() {
    let cfg = SinkConfig { width: 0, ..cfg() };
    assert!(InMemorySink::new().begin(cfg).is_err());
}
