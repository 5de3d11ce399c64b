use crate::foundation::error::{CodeReelError, CodeReelResult};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Caret shape drawn at the reveal boundary.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CursorStyle {
    /// `_` under the next cell.
    #[default]
    Underscore,
    /// Thin `|` bar before the next cell.
    Bar,
    /// Translucent full-cell block.
    Block,
}

impl CursorStyle {
    /// Parse a cursor style from its glyph (`_`, `|`, `█`) or its name.
    pub fn parse(s: &str) -> CodeReelResult<Self> {
        match s.trim() {
            "_" | "underscore" => Ok(Self::Underscore),
            "|" | "bar" | "line" => Ok(Self::Bar),
            "█" | "block" => Ok(Self::Block),
            other => Err(CodeReelError::invalid_script(format!(
                "unsupported cursor style '{other}' (expected '_', '|', 'block')"
            ))),
        }
    }

    /// Canonical name used in JSON.
    pub fn name(self) -> &'static str {
        match self {
            Self::Underscore => "underscore",
            Self::Bar => "bar",
            Self::Block => "block",
        }
    }
}

impl TryFrom<String> for CursorStyle {
    type Error = CodeReelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CursorStyle> for String {
    fn from(value: CursorStyle) -> Self {
        value.name().to_string()
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ScriptDef {
    question: String,
    code: String,
    command: String,
    #[serde(default)]
    output: String,
    #[serde(default)]
    cursor_style: CursorStyle,
}

/// Immutable input of one generation: what is typed and what the terminal prints.
///
/// Construction validates the script, so every `Script` value is renderable content-wise
/// (layout fit is checked later against a concrete canvas).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ScriptDef")]
pub struct Script {
    question: String,
    code: String,
    command: String,
    output: String,
    cursor_style: CursorStyle,
}

impl Script {
    /// Build and validate a script.
    ///
    /// `\r\n` line endings are normalized to `\n` before validation, so character counts (and
    /// therefore typing durations) are platform independent.
    pub fn new(
        question: impl Into<String>,
        code: impl Into<String>,
        command: impl Into<String>,
        output: impl Into<String>,
        cursor_style: CursorStyle,
    ) -> CodeReelResult<Self> {
        let script = Self {
            question: normalize_newlines(question.into()),
            code: normalize_newlines(code.into()),
            command: normalize_newlines(command.into()),
            output: normalize_newlines(output.into()),
            cursor_style,
        };
        script.validate()?;
        Ok(script)
    }

    /// Parse a script from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> CodeReelResult<Self> {
        serde_json::from_reader(r).map_err(|e| {
            if e.is_data() {
                CodeReelError::invalid_script(format!("script JSON: {e}"))
            } else {
                CodeReelError::serde(format!("parse script JSON: {e}"))
            }
        })
    }

    /// Parse a script from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> CodeReelResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            CodeReelError::invalid_script(format!("open script JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Check required fields.
    ///
    /// `question`, `code` and `command` must contain visible text; `output` may be empty
    /// (programs that print nothing).
    pub fn validate(&self) -> CodeReelResult<()> {
        for (name, value) in [
            ("question", &self.question),
            ("code", &self.code),
            ("command", &self.command),
        ] {
            if value.trim().is_empty() {
                return Err(CodeReelError::invalid_script(format!(
                    "{name} must not be empty"
                )));
            }
        }
        Ok(())
    }

    /// Question typed at the top of the clip.
    pub fn question(&self) -> &str {
        &self.question
    }

    /// Source code typed into the editor area.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Command typed at the terminal prompt.
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Program output revealed after the command runs.
    pub fn output(&self) -> &str {
        &self.output
    }

    /// Caret shape.
    pub fn cursor_style(&self) -> CursorStyle {
        self.cursor_style
    }
}

impl TryFrom<ScriptDef> for Script {
    type Error = CodeReelError;

    fn try_from(def: ScriptDef) -> Result<Self, Self::Error> {
        Self::new(
            def.question,
            def.code,
            def.command,
            def.output,
            def.cursor_style,
        )
    }
}

fn normalize_newlines(s: String) -> String {
    if s.contains('\r') {
        s.replace("\r\n", "\n").replace('\r', "\n")
    } else {
        s
    }
}

#[cfg(test)]
#[path = "../../tests/unit/script/model.rs"]
mod tests;
