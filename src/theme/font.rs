use crate::foundation::core::Rgba8;
use crate::foundation::error::{CodeReelError, CodeReelResult};
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Advance width of one cell as a fraction of the font size when no font could be measured
/// (DejaVu Sans Mono: 1233 / 2048 units).
pub const DEFAULT_ADVANCE_RATIO: f64 = 0.6021;

const SYSTEM_MONOSPACE_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSansMono-Bold.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf",
    "/usr/share/fonts/TTF/DejaVuSansMono.ttf",
    "/usr/share/fonts/dejavu/DejaVuSansMono.ttf",
    "/usr/share/fonts/dejavu-sans-mono-fonts/DejaVuSansMono.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationMono-Regular.ttf",
    "/usr/share/fonts/liberation-mono/LiberationMono-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Courier New.ttf",
    "/Library/Fonts/Courier New.ttf",
    "C:\\Windows\\Fonts\\consola.ttf",
];

/// A loaded monospace font, shared read-only by all render workers.
#[derive(Clone, Debug)]
pub struct FontFace {
    source: PathBuf,
    bytes: Arc<Vec<u8>>,
    family: String,
    data: vello_cpu::peniko::FontData,
    advance_ratio: f64,
}

impl FontFace {
    /// Load and measure a font file.
    pub fn from_path(path: impl AsRef<Path>) -> CodeReelResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| {
            CodeReelError::asset_missing(format!("read font '{}': {e}", path.display()))
        })?;
        Self::from_bytes(path.to_path_buf(), bytes)
    }

    /// Build a face from raw TTF/OTF bytes. `source` is informational only.
    pub fn from_bytes(source: PathBuf, bytes: Vec<u8>) -> CodeReelResult<Self> {
        let bytes = Arc::new(bytes);
        let mut shaper = TextShaper::with_bytes(&bytes)?;
        let family = shaper.family.clone();
        let advance_ratio = shaper.measure_advance_ratio();
        let data = vello_cpu::peniko::FontData::new(
            vello_cpu::peniko::Blob::from(bytes.as_ref().clone()),
            0,
        );
        Ok(Self {
            source,
            bytes,
            family,
            data,
            advance_ratio,
        })
    }

    /// Search the usual system locations for a monospace font.
    pub fn discover() -> Option<Self> {
        SYSTEM_MONOSPACE_FONTS.iter().find_map(|p| {
            let path = Path::new(p);
            if !path.is_file() {
                return None;
            }
            match Self::from_path(path) {
                Ok(face) => Some(face),
                Err(e) => {
                    tracing::debug!(path = %path.display(), error = %e, "skipping system font");
                    None
                }
            }
        })
    }

    /// File the face was loaded from.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Family name as registered with the shaper.
    pub fn family(&self) -> &str {
        &self.family
    }

    /// Raster font handle for `vello_cpu` glyph runs.
    pub fn data(&self) -> &vello_cpu::peniko::FontData {
        &self.data
    }

    /// Cell advance divided by font size.
    pub fn advance_ratio(&self) -> f64 {
        self.advance_ratio
    }

    /// Create a fresh shaper for one worker.
    pub fn shaper(&self) -> CodeReelResult<TextShaper> {
        TextShaper::with_bytes(&self.bytes)
    }
}

/// Per-worker Parley contexts with the face's family pre-registered.
pub struct TextShaper {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<Rgba8>,
    family: String,
}

impl TextShaper {
    fn with_bytes(bytes: &Arc<Vec<u8>>) -> CodeReelResult<Self> {
        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(bytes.as_ref().clone()), None);
        let family_id = families
            .first()
            .map(|(id, _)| *id)
            .ok_or_else(|| CodeReelError::asset_missing("no font families in font file"))?;
        let family = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| CodeReelError::asset_missing("registered font family has no name"))?
            .to_string();
        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            family,
        })
    }

    /// Shape a single unwrapped line of text.
    fn shape(&mut self, text: &str, size_px: f32, brush: Rgba8) -> parley::Layout<Rgba8> {
        self.shape_runs(text, size_px, brush, &[])
    }

    /// Shape a single line where byte ranges in `runs` override the default brush.
    pub fn shape_runs(
        &mut self,
        text: &str,
        size_px: f32,
        brush: Rgba8,
        runs: &[(Range<usize>, Rgba8)],
    ) -> parley::Layout<Rgba8> {
        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(self.family.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));
        for (range, color) in runs {
            builder.push(parley::style::StyleProperty::Brush(*color), range.clone());
        }

        let mut layout: parley::Layout<Rgba8> = builder.build(text);
        layout.break_all_lines(None);
        layout
    }

    fn measure_advance_ratio(&mut self) -> f64 {
        const SAMPLE: &str = "0000000000";
        const SIZE: f32 = 100.0;
        let layout = self.shape(SAMPLE, SIZE, Rgba8::default());
        let width = f64::from(layout.width());
        if width.is_finite() && width > 0.0 {
            width / (SAMPLE.len() as f64 * f64::from(SIZE))
        } else {
            DEFAULT_ADVANCE_RATIO
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/theme/font.rs"]
mod tests;
