use super::*;

fn kinds(code: &str, lang: LanguageFamily) -> Vec<(TokenKind, String)> {
    let chars: Vec<char> = code.chars().collect();
    tokenize(code, lang)
        .into_iter()
        .map(|t| (t.kind, chars[t.span.start..t.span.end].iter().collect()))
        .collect()
}

fn assert_covers(code: &str, lang: LanguageFamily) {
    let tokens = tokenize(code, lang);
    let mut at = 0;
    for t in &tokens {
        assert_eq!(t.span.start, at, "gap or overlap in {code:?}: {tokens:?}");
        assert!(t.span.end > t.span.start, "empty token in {code:?}");
        at = t.span.end;
    }
    assert_eq!(at, code.chars().count(), "tokens do not reach the end of {code:?}");
}

#[test]
fn simple_declaration() {
    use TokenKind::*;
    let got = kinds("let x = 5;", LanguageFamily::JavaScript);
    let want: Vec<(TokenKind, std::string::String)> = [
        (Keyword, "let"),
        (Whitespace, " "),
        (Identifier, "x"),
        (Whitespace, " "),
        (Punctuation, "="),
        (Whitespace, " "),
        (Number, "5"),
        (Punctuation, ";"),
    ]
    .into_iter()
    .map(|(k, s)| (k, s.to_string()))
    .collect();
    assert_eq!(got, want);
}

#[test]
fn keywords_match_whole_words_only() {
    let got = kinds("for format", LanguageFamily::JavaScript);
    assert_eq!(got[0], (TokenKind::Keyword, "for".to_string()));
    assert_eq!(got[2], (TokenKind::Identifier, "format".to_string()));
}

#[test]
fn call_sites_are_functions() {
    let got = kinds("console.log(sum(1, 2))", LanguageFamily::JavaScript);
    assert_eq!(got[0], (TokenKind::Identifier, "console".to_string()));
    assert_eq!(got[2], (TokenKind::Function, "log".to_string()));
    assert_eq!(got[4], (TokenKind::Function, "sum".to_string()));
}

#[test]
fn strings_respect_escapes_and_hide_contents() {
    let got = kinds(r#"s = "a \" for 1" + 'x'"#, LanguageFamily::JavaScript);
    assert!(got.contains(&(TokenKind::String, r#""a \" for 1""#.to_string())));
    assert!(got.contains(&(TokenKind::String, "'x'".to_string())));
    assert!(!got.iter().any(|(k, _)| *k == TokenKind::Keyword));
}

#[test]
fn unterminated_string_stops_at_line_end() {
    let got = kinds("x = 'abc\ny", LanguageFamily::JavaScript);
    assert!(got.contains(&(TokenKind::String, "'abc".to_string())));
    assert_eq!(got.last().unwrap(), &(TokenKind::Identifier, "y".to_string()));
}

#[test]
fn backticks_span_lines_in_javascript_only() {
    let js = kinds("`a\nb`", LanguageFamily::JavaScript);
    assert_eq!(js, vec![(TokenKind::String, "`a\nb`".to_string())]);
    let py = kinds("`a`", LanguageFamily::Python);
    assert!(py.iter().all(|(k, _)| *k != TokenKind::String));
}

#[test]
fn comments() {
    let js = kinds("x // note\n/* a\nb */ y", LanguageFamily::JavaScript);
    assert!(js.contains(&(TokenKind::Comment, "// note".to_string())));
    assert!(js.contains(&(TokenKind::Comment, "/* a\nb */".to_string())));

    let py = kinds("x = 1  # one", LanguageFamily::Python);
    assert_eq!(py.last().unwrap(), &(TokenKind::Comment, "# one".to_string()));
}

#[test]
fn signs_are_absorbed_only_outside_operands() {
    let got = kinds("a = -5", LanguageFamily::JavaScript);
    assert_eq!(got.last().unwrap(), &(TokenKind::Number, "-5".to_string()));

    let got = kinds("a-5", LanguageFamily::JavaScript);
    assert_eq!(
        got,
        vec![
            (TokenKind::Identifier, "a".to_string()),
            (TokenKind::Punctuation, "-".to_string()),
            (TokenKind::Number, "5".to_string()),
        ]
    );

    let got = kinds("x+=-2.5", LanguageFamily::JavaScript);
    assert_eq!(got[1], (TokenKind::Punctuation, "+=".to_string()));
    assert_eq!(got[2], (TokenKind::Number, "-2.5".to_string()));
}

#[test]
fn decimals_and_member_access() {
    let got = kinds("3.14 + a.b", LanguageFamily::JavaScript);
    assert_eq!(got[0], (TokenKind::Number, "3.14".to_string()));
    assert!(got.contains(&(TokenKind::Punctuation, ".".to_string())));
}

#[test]
fn unknown_characters_fall_back_to_plain() {
    let got = kinds("x = \"ok\" ¤¤", LanguageFamily::JavaScript);
    assert_eq!(got.last().unwrap(), &(TokenKind::Plain, "¤¤".to_string()));
}

#[test]
fn spans_are_char_offsets() {
    let tokens = tokenize("é = 1", LanguageFamily::JavaScript);
    assert_eq!(tokens[0].span, Span { start: 0, end: 1 });
    assert_eq!(tokens.last().unwrap().span, Span { start: 4, end: 5 });
}

#[test]
fn every_character_is_covered_once() {
    let samples = [
        ("const add = (a, b) => a + b;\nconsole.log(add(2, 3));\n", LanguageFamily::JavaScript),
        ("def f(n):\n    \"\"\"doc\n    \"\"\"\n    return n ** -2  # sq\n", LanguageFamily::Python),
        ("package main\nfunc main() {\n\tfmt.Println(`raw`, 0x1F)\n}", LanguageFamily::Go),
        ("class A { /* open comment", LanguageFamily::Java),
        ("\"never closed \\", LanguageFamily::JavaScript),
        ("", LanguageFamily::JavaScript),
    ];
    for (code, lang) in samples {
        assert_covers(code, lang);
    }
}

#[test]
fn tokenization_is_deterministic() {
    let code = "for (let i = 0; i < 10; i++) { sum += i * -1; }";
    assert_eq!(
        tokenize(code, LanguageFamily::JavaScript),
        tokenize(code, LanguageFamily::JavaScript)
    );
}
