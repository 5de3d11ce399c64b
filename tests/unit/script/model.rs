use super::*;

fn sample() -> Script {
    Script::new(
        "Add two numbers",
        "a+b",
        "run",
        "3",
        CursorStyle::Block,
    )
    .unwrap()
}

#[test]
fn accessors_return_fields() {
    let s = sample();
    assert_eq!(s.question(), "Add two numbers");
    assert_eq!(s.code(), "a+b");
    assert_eq!(s.command(), "run");
    assert_eq!(s.output(), "3");
    assert_eq!(s.cursor_style(), CursorStyle::Block);
}

#[test]
fn empty_code_is_invalid_script() {
    let err = Script::new("q", "", "run", "", CursorStyle::Underscore).unwrap_err();
    assert!(matches!(err, CodeReelError::InvalidScript(_)));
    assert!(err.to_string().contains("code"));

    let err = Script::new("q", "  \n ", "run", "", CursorStyle::Underscore).unwrap_err();
    assert!(matches!(err, CodeReelError::InvalidScript(_)));
}

#[test]
fn empty_question_or_command_is_invalid_but_output_may_be_empty() {
    assert!(Script::new("", "x", "run", "", CursorStyle::Bar).is_err());
    assert!(Script::new("q", "x", " ", "", CursorStyle::Bar).is_err());
    assert!(Script::new("q", "x", "run", "", CursorStyle::Bar).is_ok());
}

#[test]
fn crlf_is_normalized() {
    let s = Script::new("q", "a\r\nb", "run", "1\r\n2", CursorStyle::Bar).unwrap();
    assert_eq!(s.code(), "a\nb");
    assert_eq!(s.output(), "1\n2");
}

#[test]
fn cursor_style_parses_glyphs_and_names() {
    assert_eq!(CursorStyle::parse("_").unwrap(), CursorStyle::Underscore);
    assert_eq!(CursorStyle::parse("|").unwrap(), CursorStyle::Bar);
    assert_eq!(CursorStyle::parse("block").unwrap(), CursorStyle::Block);
    assert_eq!(CursorStyle::parse("█").unwrap(), CursorStyle::Block);
    let err = CursorStyle::parse("blink-fast").unwrap_err();
    assert!(matches!(err, CodeReelError::InvalidScript(_)));
}

#[test]
fn json_parsing_validates() {
    let ok = r#"{"question":"Q","code":"let x = 5;","command":"node index.js","output":"5","cursor_style":"|"}"#;
    let s = Script::from_reader(ok.as_bytes()).unwrap();
    assert_eq!(s.cursor_style(), CursorStyle::Bar);

    let empty_code = r#"{"question":"Q","code":"","command":"node index.js"}"#;
    let err = Script::from_reader(empty_code.as_bytes()).unwrap_err();
    assert!(matches!(err, CodeReelError::InvalidScript(_)));

    let bad_cursor = r#"{"question":"Q","code":"x","command":"c","cursor_style":"?"}"#;
    let err = Script::from_reader(bad_cursor.as_bytes()).unwrap_err();
    assert!(matches!(err, CodeReelError::InvalidScript(_)));
}

#[test]
fn json_round_trips_through_serialize() {
    let s = sample();
    let json = serde_json::to_string(&s).unwrap();
    assert!(json.contains("\"cursor_style\":\"block\""));
    let back: Script = serde_json::from_str(&json).unwrap();
    assert_eq!(back, s);
}
