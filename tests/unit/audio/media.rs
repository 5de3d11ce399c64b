use super::*;

#[test]
fn stereo_from_mono_duplicates_channels() {
    let pcm = AudioPcm::stereo_from_mono(&[0.25, -0.5]);
    assert_eq!(pcm.interleaved_f32, vec![0.25, 0.25, -0.5, -0.5]);
    assert_eq!(pcm.frames(), 2);
    assert_eq!(pcm.sample_rate, MIX_SAMPLE_RATE);
}

#[test]
fn list_samples_filters_and_sorts() {
    let dir = std::env::temp_dir().join(format!("codereel-samples-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    for name in ["b.WAV", "a.mp3", "notes.txt"] {
        std::fs::write(dir.join(name), b"x").unwrap();
    }
    let found = list_samples(&dir).unwrap();
    let names: Vec<_> = found
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["a.mp3", "b.WAV"]);
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn list_samples_missing_dir_is_asset_missing() {
    let err = list_samples(Path::new("/definitely/not/a/dir")).unwrap_err();
    assert!(matches!(err, CodeReelError::AssetMissing(_)));
}

#[cfg(not(feature = "media-ffmpeg"))]
#[test]
fn decode_without_feature_is_asset_missing() {
    let err = decode_audio_f32_stereo(Path::new("x.wav"), MIX_SAMPLE_RATE).unwrap_err();
    assert!(matches!(err, CodeReelError::AssetMissing(_)));
}
