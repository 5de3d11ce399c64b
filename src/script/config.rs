use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{CodeReelError, CodeReelResult};
use crate::highlight::language::LanguageFamily;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Render configuration.
///
/// Every field has a default; a JSON config file only needs the keys it overrides. Changing any
/// value never weakens the timing contracts (exact frame totals, audio length matching video).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Output frame rate.
    pub fps: u32,
    /// Time to type one character, in milliseconds.
    pub per_char_ms: u32,
    /// Canvas width in pixels.
    pub canvas_width: u32,
    /// Canvas height in pixels.
    pub canvas_height: u32,
    /// Soft wrap width of the code block, in characters.
    pub wrap_width_chars: u32,
    /// Word-wrap width of the question block, in characters.
    pub question_wrap_chars: u32,
    /// Fixed language family; inferred from the code when unset.
    pub language: Option<LanguageFamily>,
    /// Seed for keystroke sample selection and synthesized noise.
    pub seed: u64,
    /// Monospace TTF/OTF used for all text. System locations are searched when unset.
    pub font_path: Option<PathBuf>,
    /// Optional ambient/background track.
    pub ambient_path: Option<PathBuf>,
    /// Optional directory of keystroke samples.
    pub samples_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fps: 30,
            per_char_ms: 50,
            canvas_width: 1080,
            canvas_height: 1920,
            wrap_width_chars: 30,
            question_wrap_chars: 25,
            language: None,
            seed: 0x5EED_C0DE,
            font_path: None,
            ambient_path: None,
            samples_dir: None,
        }
    }
}

impl Config {
    /// Parse a config from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> CodeReelResult<Self> {
        let cfg: Self = serde_json::from_reader(r)
            .map_err(|e| CodeReelError::serde(format!("parse config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse a config from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> CodeReelResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            CodeReelError::config(format!("open config JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Reject values that cannot produce a valid render.
    pub fn validate(&self) -> CodeReelResult<()> {
        if self.fps == 0 {
            return Err(CodeReelError::config("fps must be > 0"));
        }
        if self.per_char_ms == 0 {
            return Err(CodeReelError::config("per_char_ms must be > 0"));
        }
        if self.canvas_width == 0 || self.canvas_height == 0 {
            return Err(CodeReelError::config("canvas dimensions must be non-zero"));
        }
        if self.canvas_width > u32::from(u16::MAX) || self.canvas_height > u32::from(u16::MAX) {
            return Err(CodeReelError::config(format!(
                "canvas dimensions must be <= {}",
                u16::MAX
            )));
        }
        // yuv420p output needs even dimensions.
        if !self.canvas_width.is_multiple_of(2) || !self.canvas_height.is_multiple_of(2) {
            return Err(CodeReelError::config("canvas dimensions must be even"));
        }
        if self.wrap_width_chars == 0 || self.question_wrap_chars == 0 {
            return Err(CodeReelError::config("wrap widths must be > 0"));
        }
        Ok(())
    }

    /// Frame rate as a validated [`Fps`].
    pub fn fps(&self) -> CodeReelResult<Fps> {
        Fps::new(self.fps, 1)
    }

    /// Canvas dimensions.
    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.canvas_width,
            height: self.canvas_height,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/script/config.rs"]
mod tests;
