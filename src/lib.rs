//! codereel renders short vertical coding clips: a question is typed, the answer's code is typed
//! with syntax highlighting, then a terminal slides up and runs it.
//!
//! Everything about a clip is decided before the first frame:
//!
//! - Load a [`Script`] and a [`Config`]
//! - Create a [`RenderSession`] (tokenize, lay out, build the [`Timeline`])
//! - Render single frames, iterate [`RenderSession::frames`], or stream a range into a
//!   [`FrameSink`] together with the composed soundtrack
//!
//! Frames are a pure function of their index, so parallel rendering produces the same bytes as a
//! sequential pass.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

pub(crate) mod animation;
pub(crate) mod audio;
pub(crate) mod encode;
pub(crate) mod highlight;
pub(crate) mod layout;
pub(crate) mod render;
pub(crate) mod script;
pub(crate) mod session;
pub(crate) mod theme;
pub(crate) mod timeline;

pub use crate::foundation::core::{Canvas, Fps, FrameIndex, FrameRange, Point, Rect, Rgba8};
pub use crate::foundation::error::{CodeReelError, CodeReelResult};
pub use crate::foundation::math::Rng64;

pub use crate::animation::ease::Ease;
pub use crate::audio::compose::AudioTrack;
pub use crate::audio::events::{AudioEvent, SampleId};
pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, is_ffmpeg_on_path};
pub use crate::encode::sink::{AudioInputConfig, FrameSink, InMemorySink, SinkConfig};
pub use crate::highlight::language::LanguageFamily;
pub use crate::highlight::lexer::{Span, Token, TokenKind, tokenize};
pub use crate::layout::engine::{
    Gutter, HeaderLayout, Layout, TerminalLayout, TextBlock, VisualLine,
};
pub use crate::render::backend::FrameRGBA;
pub use crate::render::fingerprint::{FrameFingerprint, fingerprint_state};
pub use crate::render::png::write_png;
pub use crate::script::config::Config;
pub use crate::script::model::{CursorStyle, Script};
pub use crate::session::render_session::{Frames, RenderSession, RenderSessionOpts, RenderStats};
pub use crate::theme::font::FontFace;
pub use crate::theme::palette::Palette;
pub use crate::theme::{TextStyle, Theme};
pub use crate::timeline::schedule::{
    EventKind, EventPayload, Timeline, TimelineEvent, TypingLengths, TypingTarget,
};
pub use crate::timeline::state::{Caret, RenderState, SlidePath};
