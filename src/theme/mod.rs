pub(crate) mod font;
pub(crate) mod palette;

use crate::theme::font::{DEFAULT_ADVANCE_RATIO, FontFace};
use crate::theme::palette::Palette;
use std::path::Path;

/// Size and monospace metrics of one text block.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextStyle {
    /// Font size in pixels.
    pub size_px: f32,
    /// Horizontal advance of one character cell.
    pub cell_width: f64,
    /// Distance between consecutive line tops.
    pub line_height: f64,
}

impl TextStyle {
    fn new(size_px: f32, line_height: f64, advance_ratio: f64) -> Self {
        Self {
            size_px,
            cell_width: f64::from(size_px) * advance_ratio,
            line_height,
        }
    }

    pub(crate) fn scaled(self, s: f64) -> Self {
        Self {
            size_px: (f64::from(self.size_px) * s) as f32,
            cell_width: self.cell_width * s,
            line_height: self.line_height * s,
        }
    }
}

/// Immutable colors, font and text metrics for a render.
///
/// Loaded once and shared by `Arc` between the session and its workers.
#[derive(Clone, Debug)]
pub struct Theme {
    /// Color table.
    pub palette: Palette,
    /// Question block.
    pub question: TextStyle,
    /// Code block and line numbers.
    pub code: TextStyle,
    /// Prompt, command and output.
    pub terminal: TextStyle,
    /// Editor file name and terminal title.
    pub header: TextStyle,
    font: Option<FontFace>,
}

impl Theme {
    /// Theme using `font`, or solid cell blocks when `None`.
    pub fn new(font: Option<FontFace>) -> Self {
        let ratio = font
            .as_ref()
            .map_or(DEFAULT_ADVANCE_RATIO, FontFace::advance_ratio);
        Self {
            palette: Palette::default(),
            question: TextStyle::new(55.0, 80.0, ratio),
            code: TextStyle::new(48.0, 70.0, ratio),
            terminal: TextStyle::new(42.0, 50.0, ratio),
            header: TextStyle::new(40.0, 60.0, ratio),
            font,
        }
    }

    /// Load the theme font from `font_path`, falling back to system fonts and finally to
    /// block glyphs. Never fails.
    pub fn load(font_path: Option<&Path>) -> Self {
        if let Some(path) = font_path {
            match FontFace::from_path(path) {
                Ok(face) => return Self::new(Some(face)),
                Err(e) => tracing::info!(
                    error = %e,
                    "configured font unavailable, searching system fonts"
                ),
            }
        }
        match FontFace::discover() {
            Some(face) => {
                tracing::debug!(
                    font = %face.source().display(),
                    family = face.family(),
                    "using system font"
                );
                Self::new(Some(face))
            }
            None => {
                tracing::info!("no monospace font found, rendering text as cell blocks");
                Self::new(None)
            }
        }
    }

    /// Same theme with every text metric multiplied by `s` (canvas width / 1080).
    pub fn scaled(&self, s: f64) -> Self {
        Self {
            palette: self.palette,
            question: self.question.scaled(s),
            code: self.code.scaled(s),
            terminal: self.terminal.scaled(s),
            header: self.header.scaled(s),
            font: self.font.clone(),
        }
    }

    /// Font used for glyph rendering, if any.
    pub fn font(&self) -> Option<&FontFace> {
        self.font.as_ref()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/theme/theme.rs"]
mod tests;
