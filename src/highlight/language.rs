use serde::{Deserialize, Serialize};

/// Language family used to pick keywords, comment markers and the editor file name.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageFamily {
    /// JavaScript (and TypeScript-ish snippets).
    #[default]
    JavaScript,
    /// Python 3.
    Python,
    /// Go.
    Go,
    /// Java.
    Java,
}

const JS_KEYWORDS: &[&str] = &[
    "async", "await", "break", "case", "catch", "class", "const", "continue", "default", "delete",
    "do", "else", "export", "extends", "false", "finally", "for", "function", "if", "import",
    "in", "instanceof", "let", "new", "null", "of", "return", "static", "super", "switch", "this",
    "throw", "true", "try", "typeof", "undefined", "var", "void", "while", "yield",
];

const PY_KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global", "if",
    "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return", "try",
    "while", "with", "yield",
];

const GO_KEYWORDS: &[&str] = &[
    "break", "case", "chan", "const", "continue", "default", "defer", "else", "fallthrough",
    "false", "for", "func", "go", "goto", "if", "import", "interface", "map", "nil", "package",
    "range", "return", "select", "struct", "switch", "true", "type", "var",
];

const JAVA_KEYWORDS: &[&str] = &[
    "abstract", "boolean", "break", "byte", "case", "catch", "char", "class", "continue",
    "default", "do", "double", "else", "enum", "extends", "false", "final", "finally", "float",
    "for", "if", "implements", "import", "instanceof", "int", "interface", "long", "new", "null",
    "package", "private", "protected", "public", "return", "short", "static", "super", "switch",
    "this", "throw", "throws", "true", "try", "var", "void", "while",
];

impl LanguageFamily {
    /// Reserved words highlighted as keywords.
    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            Self::JavaScript => JS_KEYWORDS,
            Self::Python => PY_KEYWORDS,
            Self::Go => GO_KEYWORDS,
            Self::Java => JAVA_KEYWORDS,
        }
    }

    /// Whole-word keyword test.
    pub fn is_keyword(self, word: &str) -> bool {
        self.keywords().contains(&word)
    }

    /// Marker that starts a comment running to end of line.
    pub fn line_comment(self) -> &'static str {
        match self {
            Self::Python => "#",
            Self::JavaScript | Self::Go | Self::Java => "//",
        }
    }

    /// Whether `/* ... */` comments exist.
    pub fn has_block_comments(self) -> bool {
        !matches!(self, Self::Python)
    }

    /// Whether backtick-delimited runs are string literals.
    pub fn has_backtick_strings(self) -> bool {
        matches!(self, Self::JavaScript | Self::Go)
    }

    /// File name shown in the editor header.
    pub fn file_name(self) -> &'static str {
        match self {
            Self::JavaScript => "index.js",
            Self::Python => "main.py",
            Self::Go => "main.go",
            Self::Java => "Main.java",
        }
    }

    /// Human readable name.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::JavaScript => "JavaScript",
            Self::Python => "Python",
            Self::Go => "Go",
            Self::Java => "Java",
        }
    }

    /// Guess the family from cheap textual signals. Falls back to JavaScript.
    pub fn infer(code: &str) -> Self {
        if code.contains("public class")
            || code.contains("System.out")
            || code.contains("public static void")
        {
            return Self::Java;
        }
        if code.contains("package ") || code.contains("func ") || code.contains(":=") {
            return Self::Go;
        }
        let python_block = code.lines().any(|l| {
            let t = l.trim_start();
            (t.starts_with("def ") || t.starts_with("class ") || t.starts_with("elif "))
                && t.trim_end().ends_with(':')
        });
        let python_import = code.lines().any(|l| {
            let t = l.trim_start();
            (t.starts_with("import ") || t.starts_with("from "))
                && !t.contains(';')
                && !t.contains(['\'', '"'])
        });
        if python_block || python_import || (code.contains("print(") && !code.contains(';')) {
            return Self::Python;
        }
        Self::JavaScript
    }
}

#[cfg(test)]
#[path = "../../tests/unit/highlight/language.rs"]
mod tests;
