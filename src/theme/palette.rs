use crate::foundation::core::Rgba8;
use crate::highlight::lexer::TokenKind;

/// Fixed color table (One Dark flavored).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Palette {
    /// Canvas background.
    pub background: Rgba8,
    /// Default text, identifiers and the terminal title.
    pub text: Rgba8,
    /// Keywords; also the question text.
    pub keyword: Rgba8,
    /// Call sites.
    pub function: Rgba8,
    /// String literals; also the terminal prompt and successful output.
    pub string: Rgba8,
    /// Numeric literals.
    pub number: Rgba8,
    /// Comments and the editor file name.
    pub comment: Rgba8,
    /// Operators.
    pub operator: Rgba8,
    /// Brackets and delimiters.
    pub bracket: Rgba8,
    /// Output that looks like an error.
    pub error: Rgba8,
    /// Caret.
    pub cursor: Rgba8,
    /// Line numbers.
    pub gutter: Rgba8,
    /// Terminal body.
    pub terminal_body: Rgba8,
    /// Terminal title bar.
    pub terminal_header: Rgba8,
    /// Window control dots, left to right.
    pub window_dots: [Rgba8; 3],
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: Rgba8::rgb(30, 34, 40),
            text: Rgba8::rgb(220, 223, 228),
            keyword: Rgba8::rgb(198, 120, 221),
            function: Rgba8::rgb(97, 175, 239),
            string: Rgba8::rgb(152, 195, 121),
            number: Rgba8::rgb(209, 154, 102),
            comment: Rgba8::rgb(120, 120, 120),
            operator: Rgba8::rgb(86, 182, 194),
            bracket: Rgba8::rgb(220, 223, 228),
            error: Rgba8::rgb(224, 108, 117),
            cursor: Rgba8::rgb(82, 139, 255),
            gutter: Rgba8::rgb(92, 99, 112),
            terminal_body: Rgba8::rgb(20, 20, 20),
            terminal_header: Rgba8::rgb(40, 40, 40),
            window_dots: [
                Rgba8::rgb(255, 95, 86),
                Rgba8::rgb(255, 189, 46),
                Rgba8::rgb(39, 201, 63),
            ],
        }
    }
}

impl Palette {
    /// Color of a token whose first character is `first`.
    ///
    /// Punctuation splits into operators and brackets/delimiters.
    pub fn token_color(&self, kind: TokenKind, first: char) -> Rgba8 {
        match kind {
            TokenKind::Keyword => self.keyword,
            TokenKind::Function => self.function,
            TokenKind::String => self.string,
            TokenKind::Number => self.number,
            TokenKind::Comment => self.comment,
            TokenKind::Punctuation => {
                if matches!(first, '(' | ')' | '[' | ']' | '{' | '}' | ',' | ';' | '.') {
                    self.bracket
                } else {
                    self.operator
                }
            }
            TokenKind::Identifier | TokenKind::Whitespace | TokenKind::Plain => self.text,
        }
    }

    /// Color used for program output. Tracebacks and `Error:` lines read as failures.
    pub fn output_color(&self, output: &str) -> Rgba8 {
        let failed = output.lines().any(|l| {
            let t = l.trim_start();
            t.starts_with("Traceback")
                || t.starts_with("panic:")
                || t.contains("Error:")
                || t.starts_with("Exception in thread")
        });
        if failed { self.error } else { self.string }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/theme/palette.rs"]
mod tests;
