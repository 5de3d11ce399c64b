use crate::foundation::core::{FrameIndex, Rgba8};
use crate::foundation::error::CodeReelResult;
use crate::highlight::language::LanguageFamily;
use crate::highlight::lexer::{Span, Token, tokenize};
use crate::layout::engine::{Layout, LayoutInput, REFERENCE_WIDTH, compute_layout};
use crate::script::config::Config;
use crate::script::model::Script;
use crate::theme::Theme;
use crate::timeline::schedule::{Timeline, TypingLengths};
use crate::timeline::state::{RenderState, SlidePath};
use smallvec::SmallVec;
use std::sync::Arc;

/// Colored char span of one code row.
pub(crate) type ColorRun = (Span, Rgba8);

/// Everything precomputed for one script: tokens, geometry, timeline and theme.
///
/// Immutable after construction and shared by all render workers.
#[derive(Debug)]
pub(crate) struct Storyboard {
    pub(crate) script: Script,
    pub(crate) language: LanguageFamily,
    pub(crate) question: Vec<char>,
    pub(crate) code: Vec<char>,
    pub(crate) command: Vec<char>,
    pub(crate) output: Vec<char>,
    pub(crate) tokens: Vec<Token>,
    /// Token colors clipped to each code row (parallel to `layout.code.lines`).
    pub(crate) code_runs: Vec<SmallVec<[ColorRun; 8]>>,
    pub(crate) output_color: Rgba8,
    pub(crate) layout: Layout,
    pub(crate) timeline: Timeline,
    pub(crate) theme: Arc<Theme>,
}

impl Storyboard {
    pub(crate) fn new(script: Script, config: &Config, theme: &Arc<Theme>) -> CodeReelResult<Self> {
        config.validate()?;
        let fps = config.fps()?;
        let canvas = config.canvas();

        let language = config
            .language
            .unwrap_or_else(|| LanguageFamily::infer(script.code()));
        let question: Vec<char> = script.question().chars().collect();
        let code: Vec<char> = script.code().chars().collect();
        let command: Vec<char> = script.command().chars().collect();
        let output: Vec<char> = script.output().chars().collect();

        let scale = f64::from(canvas.width) / REFERENCE_WIDTH;
        let theme = if scale == 1.0 {
            Arc::clone(theme)
        } else {
            Arc::new(theme.scaled(scale))
        };

        let layout = compute_layout(
            &LayoutInput {
                canvas,
                question: &question,
                code: &code,
                command: &command,
                output: &output,
                language,
                wrap_width_chars: config.wrap_width_chars as usize,
                question_wrap_chars: config.question_wrap_chars as usize,
            },
            &theme,
        )?;

        let timeline = Timeline::build(
            TypingLengths {
                question: question.len(),
                code: code.len(),
                command: command.len(),
            },
            fps,
            config.per_char_ms,
        )?;

        let tokens = tokenize(script.code(), language);
        let code_runs = layout
            .code
            .lines
            .iter()
            .map(|line| {
                let row = Span {
                    start: line.start,
                    end: line.end,
                };
                tokens
                    .iter()
                    .filter_map(|t| {
                        let span = t.span.intersect(row)?;
                        let color = theme.palette.token_color(t.kind, code[t.span.start]);
                        Some((span, color))
                    })
                    .collect()
            })
            .collect();
        let output_color = theme.palette.output_color(script.output());

        Ok(Self {
            script,
            language,
            question,
            code,
            command,
            output,
            tokens,
            code_runs,
            output_color,
            layout,
            timeline,
            theme,
        })
    }

    pub(crate) fn slide_path(&self) -> SlidePath {
        SlidePath {
            from_y: self.layout.terminal.offscreen_y,
            to_y: self.layout.terminal.rest_y,
        }
    }

    pub(crate) fn state_at(&self, frame: FrameIndex) -> CodeReelResult<RenderState> {
        self.timeline.state_at(frame, self.slide_path())
    }
}
