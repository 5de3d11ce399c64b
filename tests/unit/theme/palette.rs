use super::*;

#[test]
fn token_colors_follow_categories() {
    let p = Palette::default();
    assert_eq!(p.token_color(TokenKind::Keyword, 'l'), Rgba8::rgb(198, 120, 221));
    assert_eq!(p.token_color(TokenKind::Function, 'f'), p.function);
    assert_eq!(p.token_color(TokenKind::Identifier, 'x'), p.text);
    assert_eq!(p.token_color(TokenKind::Plain, '¤'), p.text);
    assert_eq!(p.token_color(TokenKind::Punctuation, '='), p.operator);
    assert_eq!(p.token_color(TokenKind::Punctuation, '('), p.bracket);
}

#[test]
fn output_color_flags_failures() {
    let p = Palette::default();
    assert_eq!(p.output_color("5"), p.string);
    assert_eq!(p.output_color(""), p.string);
    assert_eq!(
        p.output_color("Traceback (most recent call last):\n  x"),
        p.error
    );
    assert_eq!(p.output_color("ReferenceError: y is not defined"), p.error);
}
