use super::*;

#[test]
fn missing_font_file_is_asset_missing() {
    let err = FontFace::from_path("/definitely/not/here.ttf").unwrap_err();
    assert!(matches!(err, CodeReelError::AssetMissing(_)));
}

#[test]
fn garbage_bytes_are_rejected() {
    let err = FontFace::from_bytes(PathBuf::from("junk.ttf"), vec![0u8; 64]).unwrap_err();
    assert!(matches!(err, CodeReelError::AssetMissing(_)));
}

#[test]
fn discovered_font_is_measured_as_monospace() {
    let Some(face) = FontFace::discover() else {
        eprintln!("no system monospace font, skipping");
        return;
    };
    let ratio = face.advance_ratio();
    assert!(ratio > 0.3 && ratio < 1.0, "unexpected advance ratio {ratio}");

    let mut shaper = face.shaper().unwrap();
    let narrow = shaper.shape("iiii", 48.0, Rgba8::default()).width();
    let wide = shaper.shape("MMMM", 48.0, Rgba8::default()).width();
    assert!((narrow - wide).abs() < 0.5, "{narrow} vs {wide}");
}
