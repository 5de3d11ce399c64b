use crate::highlight::language::LanguageFamily;

/// Half-open `[start, end)` range in **character** offsets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Span {
    /// First character.
    pub start: usize,
    /// One past the last character.
    pub end: usize,
}

impl Span {
    /// Number of characters covered.
    pub fn len(self) -> usize {
        self.end - self.start
    }

    /// `true` for a zero-length span.
    pub fn is_empty(self) -> bool {
        self.start == self.end
    }

    /// Intersection with `other`, if non-empty.
    pub fn intersect(self, other: Span) -> Option<Span> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (start < end).then_some(Span { start, end })
    }
}

/// Lexical category of a token, used to pick its color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// Reserved word of the language family.
    Keyword,
    /// Identifier directly followed by `(`.
    Function,
    /// Any other word.
    Identifier,
    /// Quoted literal, delimiters included.
    String,
    /// Numeric literal, including an absorbed sign.
    Number,
    /// Line or block comment.
    Comment,
    /// Operators, brackets and delimiters.
    Punctuation,
    /// Spaces, tabs and line breaks.
    Whitespace,
    /// Characters that fit no other class.
    Plain,
}

/// A classified run of source characters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Token {
    /// Category.
    pub kind: TokenKind,
    /// Character span in the source text.
    pub span: Span,
}

const OPERATOR_CHARS: &[char] = &[
    '+', '-', '*', '/', '%', '=', '<', '>', '!', '&', '|', '^', '~', '?', ':',
];
const DELIMITER_CHARS: &[char] = &['(', ')', '[', ']', '{', '}', ',', ';', '.', '@'];

/// Classify `code` into tokens.
///
/// The result covers every character exactly once, in order, with no empty tokens. Unknown
/// characters become [`TokenKind::Plain`]; tokenization never fails.
pub fn tokenize(code: &str, lang: LanguageFamily) -> Vec<Token> {
    let chars: Vec<char> = code.chars().collect();
    let mut out: Vec<Token> = Vec::new();
    let mut i = 0usize;

    let line_comment: Vec<char> = lang.line_comment().chars().collect();

    while i < chars.len() {
        let c = chars[i];
        let start = i;

        if c.is_whitespace() {
            while i < chars.len() && chars[i].is_whitespace() {
                i += 1;
            }
            push(&mut out, TokenKind::Whitespace, start, i);
            continue;
        }

        if starts_with_at(&chars, i, &line_comment) {
            while i < chars.len() && chars[i] != '\n' {
                i += 1;
            }
            push(&mut out, TokenKind::Comment, start, i);
            continue;
        }

        if lang.has_block_comments() && starts_with_at(&chars, i, &['/', '*']) {
            i += 2;
            while i < chars.len() && !starts_with_at(&chars, i, &['*', '/']) {
                i += 1;
            }
            i = (i + 2).min(chars.len());
            push(&mut out, TokenKind::Comment, start, i);
            continue;
        }

        if c == '"' || c == '\'' || (c == '`' && lang.has_backtick_strings()) {
            i = scan_string(&chars, i, lang);
            push(&mut out, TokenKind::String, start, i);
            continue;
        }

        let signed = (c == '-' || c == '+')
            && chars.get(i + 1).is_some_and(|d| d.is_ascii_digit())
            && !previous_ends_operand(&out, &chars);
        if c.is_ascii_digit() || signed {
            i = scan_number(&chars, i + usize::from(signed));
            push(&mut out, TokenKind::Number, start, i);
            continue;
        }

        if is_word_start(c) {
            while i < chars.len() && is_word_continue(chars[i]) {
                i += 1;
            }
            let word: String = chars[start..i].iter().collect();
            let kind = if lang.is_keyword(&word) {
                TokenKind::Keyword
            } else if chars.get(i) == Some(&'(') {
                TokenKind::Function
            } else {
                TokenKind::Identifier
            };
            push(&mut out, kind, start, i);
            continue;
        }

        if OPERATOR_CHARS.contains(&c) {
            i += 1;
            while i < chars.len() && OPERATOR_CHARS.contains(&chars[i]) {
                // Leave a following signed literal (`=-1`) for the number rule.
                if matches!(chars[i], '-' | '+')
                    && chars.get(i + 1).is_some_and(|d| d.is_ascii_digit())
                {
                    break;
                }
                if starts_with_at(&chars, i, &line_comment)
                    || (lang.has_block_comments() && starts_with_at(&chars, i, &['/', '*']))
                {
                    break;
                }
                i += 1;
            }
            push(&mut out, TokenKind::Punctuation, start, i);
            continue;
        }

        if DELIMITER_CHARS.contains(&c) {
            push(&mut out, TokenKind::Punctuation, start, start + 1);
            i += 1;
            continue;
        }

        i += 1;
        match out.last_mut() {
            Some(prev) if prev.kind == TokenKind::Plain && prev.span.end == start => {
                prev.span.end = i;
            }
            _ => push(&mut out, TokenKind::Plain, start, i),
        }
    }

    out
}

fn push(out: &mut Vec<Token>, kind: TokenKind, start: usize, end: usize) {
    out.push(Token {
        kind,
        span: Span { start, end },
    });
}

fn starts_with_at(chars: &[char], i: usize, pat: &[char]) -> bool {
    !pat.is_empty() && chars.get(i..i + pat.len()) == Some(pat)
}

fn is_word_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_word_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

fn previous_ends_operand(out: &[Token], chars: &[char]) -> bool {
    let Some(prev) = out
        .iter()
        .rev()
        .find(|t| !matches!(t.kind, TokenKind::Whitespace | TokenKind::Comment))
    else {
        return false;
    };
    match prev.kind {
        TokenKind::Identifier | TokenKind::Function | TokenKind::Number | TokenKind::String => {
            true
        }
        TokenKind::Punctuation => matches!(chars[prev.span.end - 1], ')' | ']' | '}'),
        TokenKind::Keyword | TokenKind::Whitespace | TokenKind::Comment | TokenKind::Plain => {
            false
        }
    }
}

fn scan_number(chars: &[char], mut i: usize) -> usize {
    while i < chars.len() && chars[i].is_ascii_digit() {
        i += 1;
    }
    if chars.get(i) == Some(&'.') && chars.get(i + 1).is_some_and(|d| d.is_ascii_digit()) {
        i += 1;
        while i < chars.len() && chars[i].is_ascii_digit() {
            i += 1;
        }
    }
    // Radix prefixes, exponents and type suffixes (`0x1F`, `1e9`, `10L`).
    while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
        i += 1;
    }
    i
}

fn scan_string(chars: &[char], start: usize, lang: LanguageFamily) -> usize {
    let quote = chars[start];

    if lang == LanguageFamily::Python && starts_with_at(chars, start, &[quote; 3]) {
        let mut i = start + 3;
        while i < chars.len() {
            if chars[i] == '\\' {
                i += 2;
                continue;
            }
            if starts_with_at(chars, i, &[quote; 3]) {
                return i + 3;
            }
            i += 1;
        }
        return chars.len();
    }

    let multiline = quote == '`';
    let mut i = start + 1;
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 2,
            '\n' if !multiline => return i,
            c if c == quote => return i + 1,
            _ => i += 1,
        }
    }
    chars.len()
}

#[cfg(test)]
#[path = "../../tests/unit/highlight/lexer.rs"]
mod tests;
