use crate::foundation::core::{Canvas, Point, Rect};
use crate::foundation::error::{CodeReelError, CodeReelResult};
use crate::highlight::language::LanguageFamily;
use crate::theme::{TextStyle, Theme};
use smallvec::SmallVec;

/// Canvas width the geometry constants are expressed for; other widths scale uniformly.
pub const REFERENCE_WIDTH: f64 = 1080.0;
/// Columns a tab advances to.
pub const TAB_WIDTH: usize = 4;

const MARGIN_X: f64 = 60.0;
const HEADER_Y: f64 = 100.0;
const DOT_SIZE: f64 = 25.0;
const DOT_SPACING: f64 = 60.0;
const FILE_NAME_INSET: f64 = 100.0;
const QUESTION_Y: f64 = 200.0;
const CODE_Y_MIN: f64 = 500.0;
const BLOCK_GAP: f64 = 40.0;
const BOTTOM_MARGIN: f64 = 60.0;
const TERMINAL_HEIGHT: f64 = 600.0;
const TERMINAL_HEADER: f64 = 60.0;
const TERMINAL_TITLE_Y: f64 = 10.0;
const PROMPT_Y: f64 = 100.0;
const OUTPUT_GAP: f64 = 60.0;
/// Smallest code row, in pixels, before a script is rejected as unrenderable.
const MIN_CODE_LINE_HEIGHT: f64 = 2.0;
const MAX_FIT_PASSES: usize = 8;

/// Prompt drawn before the command.
pub const PROMPT: &str = "$ ";

/// One rendered row of a block: a char span into the block's source text.
///
/// Line breaks never belong to a visual line; neither does whitespace dropped at a word wrap.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VisualLine {
    /// First char offset.
    pub start: usize,
    /// One past the last char offset.
    pub end: usize,
    /// 1-based source line number; `None` on wrap continuations.
    pub number: Option<u32>,
}

/// A positioned, wrapped block of monospace text.
#[derive(Clone, Debug, PartialEq)]
pub struct TextBlock {
    /// Top-left of the first character cell.
    pub origin: Point,
    /// Horizontal advance of one cell.
    pub cell_width: f64,
    /// Distance between line tops.
    pub line_height: f64,
    /// Rows, top to bottom.
    pub lines: SmallVec<[VisualLine; 8]>,
}

impl TextBlock {
    /// Y of the top of row `line`.
    pub fn line_top(&self, line: usize) -> f64 {
        self.origin.y + self.line_height * line as f64
    }

    /// Y just below the last row.
    pub fn bottom(&self) -> f64 {
        self.line_top(self.lines.len())
    }

    /// X of column `col`.
    pub fn column_x(&self, col: usize) -> f64 {
        self.origin.x + self.cell_width * col as f64
    }

    /// Row and column of the caret placed before char `offset`.
    ///
    /// `chars` is the block's source text.
    pub fn locate(&self, chars: &[char], offset: usize) -> (usize, usize) {
        let idx = self.lines.partition_point(|l| l.start <= offset);
        let Some(line_idx) = idx.checked_sub(1) else {
            return (0, 0);
        };
        let line = self.lines[line_idx];
        let end = offset.min(line.end);
        (line_idx, columns(&chars[line.start..end]))
    }
}

/// Editor chrome above the question.
#[derive(Clone, Debug, PartialEq)]
pub struct HeaderLayout {
    /// Window control dots, left to right.
    pub dots: [Rect; 3],
    /// File name shown in the title bar.
    pub file_name: &'static str,
    /// Top-left of the file name.
    pub file_name_origin: Point,
}

/// Line-number gutter left of the code.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Gutter {
    /// X of the first digit cell.
    pub x: f64,
    /// Digits of the largest line number.
    pub digits: usize,
}

/// Terminal panel that slides up from the bottom edge.
#[derive(Clone, Debug, PartialEq)]
pub struct TerminalLayout {
    /// Panel height.
    pub height: f64,
    /// Title bar height.
    pub header_height: f64,
    /// Panel top once the slide finished.
    pub rest_y: i32,
    /// Panel top before the slide (just below the canvas).
    pub offscreen_y: i32,
    /// Title position relative to the panel top-left.
    pub title_offset: Point,
    /// Top-left of the `$ ` prompt at rest.
    pub prompt_origin: Point,
    /// Command text, placed after the prompt.
    pub command: TextBlock,
    /// Program output below the command.
    pub output: TextBlock,
}

/// Complete frame geometry for one script on one canvas.
#[derive(Clone, Debug, PartialEq)]
pub struct Layout {
    /// Output canvas.
    pub canvas: Canvas,
    /// Uniform scale relative to [`REFERENCE_WIDTH`].
    pub scale: f64,
    /// Editor chrome.
    pub header: HeaderLayout,
    /// Question rows.
    pub question: TextBlock,
    /// Code rows.
    pub code: TextBlock,
    /// Code and line-number metrics; smaller than the theme's when long code was shrunk to fit.
    pub code_style: TextStyle,
    /// Line numbers.
    pub gutter: Gutter,
    /// Terminal panel.
    pub terminal: TerminalLayout,
}

/// Wrapping inputs for [`compute_layout`].
#[derive(Clone, Copy, Debug)]
pub struct LayoutInput<'a> {
    /// Output canvas.
    pub canvas: Canvas,
    /// Question text.
    pub question: &'a [char],
    /// Code text.
    pub code: &'a [char],
    /// Command text.
    pub command: &'a [char],
    /// Output text.
    pub output: &'a [char],
    /// Language, for the header file name.
    pub language: LanguageFamily,
    /// Code soft wrap width in columns.
    pub wrap_width_chars: usize,
    /// Question word wrap width in characters.
    pub question_wrap_chars: usize,
}

/// Wrap and place every block.
///
/// Code too tall for the canvas is drawn with a smaller font. Fails with `InvalidScript`
/// only when the canvas is too small for any legible rendition.
///
/// `theme` must already be scaled to the canvas (see [`Theme::scaled`]).
pub fn compute_layout(input: &LayoutInput<'_>, theme: &Theme) -> CodeReelResult<Layout> {
    let canvas = input.canvas;
    let w = f64::from(canvas.width);
    let h = f64::from(canvas.height);
    let s = w / REFERENCE_WIDTH;
    let margin = MARGIN_X * s;

    let header = HeaderLayout {
        dots: std::array::from_fn(|i| {
            let x = margin + DOT_SPACING * s * i as f64;
            Rect::new(x, HEADER_Y * s, x + DOT_SIZE * s, (HEADER_Y + DOT_SIZE) * s)
        }),
        file_name: input.language.file_name(),
        file_name_origin: Point::new(w / 2.0 - FILE_NAME_INSET * s, (HEADER_Y - 5.0) * s),
    };

    let q_cols = fit_columns(w - 2.0 * margin, theme.question, "question")?
        .min(input.question_wrap_chars);
    let question = TextBlock {
        origin: Point::new(margin, QUESTION_Y * s),
        cell_width: theme.question.cell_width,
        line_height: theme.question.line_height,
        lines: word_wrap(input.question, q_cols),
    };

    let last_number = hard_lines(input.code).count();
    let digits = decimal_digits(last_number);
    let code_y = (CODE_Y_MIN * s).max(question.bottom() + BLOCK_GAP * s);
    let limit = h - BOTTOM_MARGIN * s;
    if limit - code_y < MIN_CODE_LINE_HEIGHT {
        return Err(CodeReelError::invalid_script(format!(
            "question ends at {:.0}px and leaves no room for code above {limit:.0}px",
            question.bottom()
        )));
    }

    // Long code shrinks instead of overflowing. A smaller cell never adds rows, so each
    // pass needs at most one more to absorb the rounding of the column count.
    let mut code_style = theme.code;
    let mut code_cols;
    let mut code;
    let mut passes = 0;
    loop {
        let code_x = margin + (digits + 1) as f64 * code_style.cell_width;
        code_cols =
            fit_columns(w - code_x - margin, code_style, "code")?.min(input.wrap_width_chars);
        code = TextBlock {
            origin: Point::new(code_x, code_y),
            cell_width: code_style.cell_width,
            line_height: code_style.line_height,
            lines: char_wrap(input.code, code_cols, true),
        };
        if code.bottom() <= limit {
            break;
        }
        passes += 1;
        let needed = code.bottom() - code_y;
        let factor = (limit - code_y) / needed;
        code_style = code_style.scaled(if passes > 1 { factor * 0.99 } else { factor });
        if code_style.line_height < MIN_CODE_LINE_HEIGHT || passes > MAX_FIT_PASSES {
            return Err(CodeReelError::invalid_script(format!(
                "{} code rows cannot fit between {code_y:.0}px and {limit:.0}px",
                code.lines.len()
            )));
        }
    }
    if passes > 0 {
        tracing::debug!(
            size_px = code_style.size_px,
            rows = code.lines.len(),
            "code font shrunk to fit the canvas"
        );
    }

    let term_height = TERMINAL_HEIGHT * s;
    let rest_y = (h - term_height).round();
    let t_cols = fit_columns(w - 2.0 * margin, theme.terminal, "terminal")?;
    let prompt_cols = PROMPT.chars().count();
    let cmd_cols = t_cols.checked_sub(prompt_cols).filter(|c| *c > 0).ok_or_else(|| {
        CodeReelError::invalid_script("terminal is too narrow for the command prompt")
    })?;
    let prompt_origin = Point::new(margin, rest_y + PROMPT_Y * s);
    let command = TextBlock {
        origin: Point::new(
            margin + prompt_cols as f64 * theme.terminal.cell_width,
            prompt_origin.y,
        ),
        cell_width: theme.terminal.cell_width,
        line_height: theme.terminal.line_height,
        lines: char_wrap(input.command, cmd_cols, false),
    };
    let last_cmd_top = command.line_top(command.lines.len().saturating_sub(1));
    let output = TextBlock {
        origin: Point::new(margin, last_cmd_top + OUTPUT_GAP * s),
        cell_width: theme.terminal.cell_width,
        line_height: theme.terminal.line_height,
        lines: char_wrap(input.output, t_cols, false),
    };
    if output.bottom() > h {
        return Err(CodeReelError::invalid_script(format!(
            "output needs {} lines, terminal fits {}",
            output.lines.len(),
            ((h - output.origin.y) / output.line_height).floor().max(0.0)
        )));
    }

    let layout = Layout {
        canvas,
        scale: s,
        header,
        question,
        code,
        code_style,
        gutter: Gutter { x: margin, digits },
        terminal: TerminalLayout {
            height: term_height,
            header_height: TERMINAL_HEADER * s,
            rest_y: rest_y as i32,
            offscreen_y: canvas.height as i32,
            title_offset: Point::new(margin, TERMINAL_TITLE_Y * s),
            prompt_origin,
            command,
            output,
        },
    };
    tracing::debug!(
        question_lines = layout.question.lines.len(),
        code_lines = layout.code.lines.len(),
        code_wrap = code_cols,
        output_lines = layout.terminal.output.lines.len(),
        "layout computed"
    );
    Ok(layout)
}

fn fit_columns(width_px: f64, style: TextStyle, block: &str) -> CodeReelResult<usize> {
    let cols = (width_px / style.cell_width).floor();
    if !cols.is_finite() || cols < 1.0 {
        return Err(CodeReelError::invalid_script(format!(
            "canvas too narrow for the {block} block"
        )));
    }
    Ok(cols as usize)
}

fn decimal_digits(mut n: usize) -> usize {
    let mut d = 1;
    while n >= 10 {
        n /= 10;
        d += 1;
    }
    d
}

/// Cells occupied by `c` when it starts at column `col`.
pub fn cell_span(c: char, col: usize) -> usize {
    if c == '\t' {
        TAB_WIDTH - col % TAB_WIDTH
    } else {
        1
    }
}

/// Total cells of a run of chars starting at column 0.
pub fn columns(chars: &[char]) -> usize {
    chars.iter().fold(0, |col, &c| col + cell_span(c, col))
}

/// `[start, end)` of every `\n`-separated line. Always yields at least one line.
pub fn hard_lines(chars: &[char]) -> impl Iterator<Item = (usize, usize)> + '_ {
    let mut start = Some(0usize);
    std::iter::from_fn(move || {
        let s = start?;
        match chars[s..].iter().position(|&c| c == '\n') {
            Some(rel) => {
                start = Some(s + rel + 1);
                Some((s, s + rel))
            }
            None => {
                start = None;
                Some((s, chars.len()))
            }
        }
    })
}

/// Break each hard line into rows of at most `width` columns.
pub fn char_wrap(chars: &[char], width: usize, numbered: bool) -> SmallVec<[VisualLine; 8]> {
    let width = width.max(1);
    let mut out = SmallVec::new();
    for (n, (hs, he)) in hard_lines(chars).enumerate() {
        let number = |first: bool| (numbered && first).then_some(n as u32 + 1);
        let mut start = hs;
        let mut col = 0usize;
        for i in hs..he {
            if i > start && col + cell_span(chars[i], col) > width {
                out.push(VisualLine {
                    start,
                    end: i,
                    number: number(start == hs),
                });
                start = i;
                col = 0;
            }
            col += cell_span(chars[i], col);
        }
        out.push(VisualLine {
            start,
            end: he,
            number: number(start == hs),
        });
    }
    out
}

/// Greedy word wrap at `width` characters; words longer than a row are split.
pub fn word_wrap(chars: &[char], width: usize) -> SmallVec<[VisualLine; 8]> {
    let width = width.max(1);
    let mut out = SmallVec::new();
    for (hs, he) in hard_lines(chars) {
        let mut line: Option<(usize, usize)> = None;
        let mut i = hs;
        while i < he {
            if chars[i].is_whitespace() {
                i += 1;
                continue;
            }
            let mut word_start = i;
            while i < he && !chars[i].is_whitespace() {
                i += 1;
            }
            let word_end = i;

            if let Some((ls, le)) = line {
                if word_end - ls <= width {
                    line = Some((ls, word_end));
                    continue;
                }
                push_line(&mut out, ls, le);
            }
            while word_end - word_start > width {
                push_line(&mut out, word_start, word_start + width);
                word_start += width;
            }
            line = Some((word_start, word_end));
        }
        match line {
            Some((ls, le)) => push_line(&mut out, ls, le),
            None => push_line(&mut out, hs, hs),
        }
    }
    out
}

fn push_line(out: &mut SmallVec<[VisualLine; 8]>, start: usize, end: usize) {
    out.push(VisualLine {
        start,
        end,
        number: None,
    });
}

#[cfg(test)]
#[path = "../../tests/unit/layout/engine.rs"]
mod tests;
