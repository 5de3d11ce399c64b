use crate::foundation::core::{Rect, Rgba8};
use crate::foundation::error::{CodeReelError, CodeReelResult};
use crate::layout::engine::{PROMPT, TextBlock, cell_span};
use crate::render::backend::FrameRGBA;
use crate::script::model::CursorStyle;
use crate::session::storyboard::{ColorRun, Storyboard};
use crate::theme::TextStyle;
use crate::theme::font::TextShaper;
use crate::timeline::schedule::TypingTarget;
use crate::timeline::state::RenderState;
use smallvec::SmallVec;
use std::ops::Range;

const BLOCK_CARET_ALPHA: u8 = 140;
const TERMINAL_TITLE: &str = "Terminal";

/// CPU rasterizer for storyboard frames, one per worker thread.
///
/// Holds a `vello_cpu` context, the target pixmap and (when the theme has a font) a Parley
/// shaper. Rendering is a pure function of the storyboard and the render state.
pub(crate) struct FrameRenderer {
    width: u32,
    height: u32,
    ctx: vello_cpu::RenderContext,
    pixmap: vello_cpu::Pixmap,
    shaper: Option<TextShaper>,
}

impl FrameRenderer {
    pub(crate) fn new(board: &Storyboard) -> CodeReelResult<Self> {
        let canvas = board.layout.canvas;
        let w: u16 = canvas
            .width
            .try_into()
            .map_err(|_| CodeReelError::render("canvas width exceeds u16"))?;
        let h: u16 = canvas
            .height
            .try_into()
            .map_err(|_| CodeReelError::render("canvas height exceeds u16"))?;
        let shaper = board.theme.font().map(|f| f.shaper()).transpose()?;
        Ok(Self {
            width: canvas.width,
            height: canvas.height,
            ctx: vello_cpu::RenderContext::new(w, h),
            pixmap: vello_cpu::Pixmap::new(w, h),
            shaper,
        })
    }

    pub(crate) fn render(
        &mut self,
        board: &Storyboard,
        st: &RenderState,
    ) -> CodeReelResult<FrameRGBA> {
        self.ctx.reset();
        let palette = &board.theme.palette;
        let (w, h) = (f64::from(self.width), f64::from(self.height));

        self.fill_rect(Rect::new(0.0, 0.0, w, h), palette.background);
        self.draw_header(board);
        self.draw_question(board, st);
        self.draw_code(board, st);
        if let Some(y) = st.terminal_y {
            self.draw_terminal(board, st, f64::from(y));
        }
        if let Some(caret) = st.caret.filter(|c| c.visible) {
            self.draw_caret(board, st, caret.target);
        }

        self.ctx.flush();
        self.ctx.render_to_pixmap(&mut self.pixmap);
        Ok(FrameRGBA {
            width: self.width,
            height: self.height,
            data: self.pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }

    fn draw_header(&mut self, board: &Storyboard) {
        let header = &board.layout.header;
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        for (r, color) in header.dots.iter().zip(board.theme.palette.window_dots) {
            let rect = vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1);
            let path = vello_cpu::kurbo::Shape::to_path(
                &vello_cpu::kurbo::Ellipse::from_rect(rect),
                0.1,
            );
            self.ctx.set_paint(paint(color));
            self.ctx.fill_path(&path);
        }
        let piece = Piece::plain(header.file_name);
        self.draw_piece(
            board,
            &piece,
            header.file_name_origin.x,
            header.file_name_origin.y,
            board.theme.header,
            board.theme.palette.comment,
        );
    }

    fn draw_question(&mut self, board: &Storyboard, st: &RenderState) {
        let block = &board.layout.question;
        let color = board.theme.palette.keyword;
        for (i, line) in block.lines.iter().enumerate() {
            let end = line.end.min(st.question_chars);
            if end <= line.start {
                continue;
            }
            let piece = Piece::from_chars(&board.question, line.start..end, &[]);
            self.draw_piece(
                board,
                &piece,
                block.origin.x,
                block.line_top(i),
                board.theme.question,
                color,
            );
        }
    }

    fn draw_code(&mut self, board: &Storyboard, st: &RenderState) {
        let block = &board.layout.code;
        let style = board.layout.code_style;
        let palette = board.theme.palette;
        let digits = board.layout.gutter.digits;
        for (i, line) in block.lines.iter().enumerate() {
            let top = block.line_top(i);
            let entered =
                line.start < st.code_chars || (st.code_chars > 0 && line.start == st.code_chars);
            if let Some(n) = line.number
                && entered
            {
                let label = format!("{n:>digits$}");
                let piece = Piece::plain(&label);
                self.draw_piece(
                    board,
                    &piece,
                    board.layout.gutter.x,
                    top,
                    style,
                    palette.gutter,
                );
            }

            let end = line.end.min(st.code_chars);
            if end <= line.start {
                continue;
            }
            let piece = Piece::from_chars(&board.code, line.start..end, &board.code_runs[i]);
            self.draw_piece(board, &piece, block.origin.x, top, style, palette.text);
        }
    }

    fn draw_terminal(&mut self, board: &Storyboard, st: &RenderState, y: f64) {
        let term = &board.layout.terminal;
        let palette = board.theme.palette;
        let w = f64::from(self.width);
        let h = f64::from(self.height);
        let dy = y - f64::from(term.rest_y);

        self.fill_rect(Rect::new(0.0, y, w, h.max(y + term.height)), palette.terminal_body);
        self.fill_rect(
            Rect::new(0.0, y, w, y + term.header_height),
            palette.terminal_header,
        );
        let title = Piece::plain(TERMINAL_TITLE);
        self.draw_piece(
            board,
            &title,
            term.title_offset.x,
            y + term.title_offset.y,
            board.theme.header,
            palette.text,
        );

        let style = board.theme.terminal;
        let prompt = Piece::plain(PROMPT);
        self.draw_piece(
            board,
            &prompt,
            term.prompt_origin.x,
            term.prompt_origin.y + dy,
            style,
            palette.string,
        );
        self.draw_plain_block(
            board,
            &term.command,
            &board.command,
            st.command_chars,
            dy,
            style,
            palette.string,
        );
        if st.output_visible {
            self.draw_plain_block(
                board,
                &term.output,
                &board.output,
                board.output.len(),
                dy,
                style,
                board.output_color,
            );
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_plain_block(
        &mut self,
        board: &Storyboard,
        block: &TextBlock,
        chars: &[char],
        shown: usize,
        dy: f64,
        style: TextStyle,
        color: Rgba8,
    ) {
        for (i, line) in block.lines.iter().enumerate() {
            let end = line.end.min(shown);
            if end <= line.start {
                continue;
            }
            let piece = Piece::from_chars(chars, line.start..end, &[]);
            self.draw_piece(
                board,
                &piece,
                block.origin.x,
                block.line_top(i) + dy,
                style,
                color,
            );
        }
    }

    fn draw_caret(&mut self, board: &Storyboard, st: &RenderState, target: TypingTarget) {
        let theme = &board.theme;
        let (block, chars, shown, style) = match target {
            TypingTarget::Question => (
                &board.layout.question,
                &board.question,
                st.question_chars,
                theme.question,
            ),
            TypingTarget::Code => (
                &board.layout.code,
                &board.code,
                st.code_chars,
                board.layout.code_style,
            ),
            TypingTarget::Command => (
                &board.layout.terminal.command,
                &board.command,
                st.command_chars,
                theme.terminal,
            ),
        };
        let dy = match (target, st.terminal_y) {
            (TypingTarget::Command, Some(y)) => f64::from(y - board.layout.terminal.rest_y),
            (TypingTarget::Command, None) => return,
            _ => 0.0,
        };

        let (row, col) = block.locate(chars, shown);
        let x = block.column_x(col);
        let size = f64::from(style.size_px);
        let glyph_top = block.line_top(row) + dy + (style.line_height - size) / 2.0;
        let glyph_bottom = glyph_top + size;
        let cell = style.cell_width;
        let thickness = (size * 0.08).max(1.0);

        let cursor = theme.palette.cursor;
        match board.script.cursor_style() {
            CursorStyle::Underscore => self.fill_rect(
                Rect::new(x, glyph_bottom - thickness, x + cell, glyph_bottom),
                cursor,
            ),
            CursorStyle::Bar => self.fill_rect(
                Rect::new(x, glyph_top, x + thickness.max(2.0), glyph_bottom),
                cursor,
            ),
            CursorStyle::Block => self.fill_rect(
                Rect::new(x, glyph_top, x + cell, glyph_bottom),
                cursor.with_alpha(BLOCK_CARET_ALPHA),
            ),
        }
    }

    fn fill_rect(&mut self, r: Rect, color: Rgba8) {
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_paint(paint(color));
        self.ctx
            .fill_rect(&vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1));
    }

    /// Draw one row of text with its first cell at `(x, line_top)`.
    fn draw_piece(
        &mut self,
        board: &Storyboard,
        piece: &Piece,
        x: f64,
        line_top: f64,
        style: TextStyle,
        default: Rgba8,
    ) {
        if piece.text.is_empty() {
            return;
        }
        let (Some(shaper), Some(font)) = (self.shaper.as_mut(), board.theme.font()) else {
            self.draw_piece_blocks(piece, x, line_top, style, default);
            return;
        };
        let layout = shaper.shape_runs(&piece.text, style.size_px, default, &piece.runs);
        let y = line_top + (style.line_height - f64::from(layout.height())) / 2.0;
        self.ctx
            .set_transform(vello_cpu::kurbo::Affine::translate((x, y)));
        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                self.ctx.set_paint(paint(run.style().brush));
                let glyphs = run.glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                self.ctx
                    .glyph_run(font.data())
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
    }

    /// Fallback without a font: one solid block per visible character cell.
    fn draw_piece_blocks(
        &mut self,
        piece: &Piece,
        x: f64,
        line_top: f64,
        style: TextStyle,
        default: Rgba8,
    ) {
        let size = f64::from(style.size_px);
        let cell = style.cell_width;
        let top = line_top + (style.line_height - size * 0.7) / 2.0;
        for (col, (byte, c)) in piece.text.char_indices().enumerate() {
            if c.is_whitespace() {
                continue;
            }
            let color = piece
                .runs
                .iter()
                .find(|(r, _)| r.contains(&byte))
                .map_or(default, |(_, c)| *c);
            let x0 = x + col as f64 * cell + cell * 0.15;
            self.fill_rect(Rect::new(x0, top, x0 + cell * 0.7, top + size * 0.7), color);
        }
    }
}

fn paint(c: Rgba8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

/// One row of display text (tabs expanded) with byte-range colors.
#[derive(Debug, Default)]
struct Piece {
    text: String,
    runs: SmallVec<[(Range<usize>, Rgba8); 8]>,
}

impl Piece {
    fn plain(text: &str) -> Self {
        Self {
            text: text.to_owned(),
            runs: SmallVec::new(),
        }
    }

    /// Build from `chars[range]`, mapping char-span colors onto the expanded text.
    fn from_chars(chars: &[char], range: Range<usize>, runs: &[ColorRun]) -> Self {
        let mut text = String::with_capacity(range.len());
        let mut byte_at = Vec::with_capacity(range.len() + 1);
        let mut col = 0usize;
        for &c in &chars[range.clone()] {
            byte_at.push(text.len());
            let span = cell_span(c, col);
            if c == '\t' {
                text.extend(std::iter::repeat_n(' ', span));
            } else {
                text.push(c);
            }
            col += span;
        }
        byte_at.push(text.len());

        let runs = runs
            .iter()
            .filter_map(|(span, color)| {
                let s = span.start.max(range.start);
                let e = span.end.min(range.end);
                (s < e).then(|| (byte_at[s - range.start]..byte_at[e - range.start], *color))
            })
            .collect();
        Self { text, runs }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
