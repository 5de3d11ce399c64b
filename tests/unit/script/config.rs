use super::*;

#[test]
fn defaults_are_valid() {
    let cfg = Config::default();
    cfg.validate().unwrap();
    assert_eq!(cfg.fps, 30);
    assert_eq!(cfg.canvas().width, 1080);
    assert_eq!(cfg.canvas().height, 1920);
    assert_eq!(cfg.fps().unwrap().num, 30);
}

#[test]
fn partial_json_keeps_defaults() {
    let cfg = Config::from_reader(r#"{"fps": 24, "language": "python"}"#.as_bytes()).unwrap();
    assert_eq!(cfg.fps, 24);
    assert_eq!(cfg.per_char_ms, 50);
    assert_eq!(cfg.language, Some(LanguageFamily::Python));
}

#[test]
fn invalid_values_are_rejected() {
    for json in [
        r#"{"fps": 0}"#,
        r#"{"per_char_ms": 0}"#,
        r#"{"canvas_width": 1081}"#,
        r#"{"canvas_height": 0}"#,
        r#"{"canvas_width": 70000}"#,
        r#"{"wrap_width_chars": 0}"#,
    ] {
        let err = Config::from_reader(json.as_bytes()).unwrap_err();
        assert!(
            matches!(err, CodeReelError::InvalidConfig(_)),
            "{json}: {err}"
        );
    }
}

#[test]
fn unknown_keys_are_rejected() {
    let err = Config::from_reader(r#"{"frame_rate": 30}"#.as_bytes()).unwrap_err();
    assert!(matches!(err, CodeReelError::Serde(_)));
}
