use super::*;
use crate::foundation::core::FrameIndex;
use crate::script::config::Config;
use crate::script::model::Script;
use crate::theme::Theme;
use crate::timeline::schedule::EventKind;
use std::sync::Arc;

fn board(cursor: CursorStyle) -> Storyboard {
    let script = Script::new(
        "Add two numbers",
        "function add(a, b) {\n  return a + b;\n}",
        "node index.js",
        "3",
        cursor,
    )
    .unwrap();
    let cfg = Config {
        canvas_width: 216,
        canvas_height: 384,
        ..Config::default()
    };
    Storyboard::new(script, &cfg, &Arc::new(Theme::new(None))).unwrap()
}

fn render(b: &Storyboard, frame: u64) -> FrameRGBA {
    let st = b.state_at(FrameIndex(frame)).unwrap();
    FrameRenderer::new(b).unwrap().render(b, &st).unwrap()
}

fn opaque(c: Rgba8) -> [u8; 4] {
    [c.r, c.g, c.b, 255]
}

#[test]
fn frame_has_canvas_size_and_background() {
    let b = board(CursorStyle::Underscore);
    let f = render(&b, 0);
    assert_eq!((f.width, f.height), (216, 384));
    assert_eq!(f.data.len(), 216 * 384 * 4);
    assert!(f.premultiplied);
    assert_eq!(f.pixel(1, 1), Some(opaque(b.theme.palette.background)));
}

#[test]
fn rendering_twice_is_byte_identical() {
    let b = board(CursorStyle::Bar);
    let mut r = FrameRenderer::new(&b).unwrap();
    for frame in [0, 40, 120, b.timeline.total_frames() - 1] {
        let st = b.state_at(FrameIndex(frame)).unwrap();
        let first = r.render(&b, &st).unwrap();
        let second = r.render(&b, &st).unwrap();
        assert_eq!(first, second, "frame {frame}");
        assert_eq!(first, render(&b, frame), "fresh renderer, frame {frame}");
    }
}

#[test]
fn cursor_styles_draw_differently() {
    let frame = 5;
    let frames: Vec<FrameRGBA> = [
        CursorStyle::Underscore,
        CursorStyle::Bar,
        CursorStyle::Block,
    ]
    .into_iter()
    .map(|c| render(&board(c), frame))
    .collect();
    assert_ne!(frames[0], frames[1]);
    assert_ne!(frames[1], frames[2]);
    assert_ne!(frames[0], frames[2]);
}

#[test]
fn blink_off_frame_hides_the_caret() {
    let b = board(CursorStyle::Block);
    let pause = *b.timeline.events().get(1).unwrap();
    assert_eq!(pause.kind, EventKind::Pause);
    let on = render(&b, pause.start.0);
    let off = render(&b, pause.start.0 + 8);
    assert_ne!(on, off);
    // Same reveal, no caret: identical to the next blink-off frame.
    assert_eq!(off, render(&b, pause.start.0 + 9));
}

#[test]
fn terminal_slides_in_and_rests() {
    let b = board(CursorStyle::Underscore);
    let body = opaque(b.theme.palette.terminal_body);
    let slide = *b.timeline.find(EventKind::SlideTerminal).unwrap();
    let before = render(&b, slide.start.0 - 1);
    assert_eq!(before.pixel(1, 380), Some(opaque(b.theme.palette.background)));

    let last = render(&b, b.timeline.total_frames() - 1);
    assert_eq!(last.pixel(1, 380), Some(body));
    let header_y = b.layout.terminal.rest_y as u32 + 1;
    assert_eq!(
        last.pixel(1, header_y),
        Some(opaque(b.theme.palette.terminal_header))
    );
}

#[test]
fn code_blocks_use_token_colors() {
    let b = board(CursorStyle::Underscore);
    let f = render(&b, b.timeline.total_frames() - 1);
    let keyword = opaque(b.theme.palette.keyword);
    let block = &b.layout.code;
    let style = b.layout.code_style;
    // Middle of the first cell of `function`.
    let x = (block.column_x(0) + style.cell_width / 2.0) as u32;
    let y = (block.line_top(0) + style.line_height / 2.0) as u32;
    assert_eq!(f.pixel(x, y), Some(keyword));
}

#[test]
fn piece_maps_char_runs_through_tabs() {
    let chars: Vec<char> = "\tab".chars().collect();
    let red = Rgba8::rgb(255, 0, 0);
    let runs = [(
        crate::highlight::lexer::Span { start: 1, end: 3 },
        red,
    )];
    let piece = Piece::from_chars(&chars, 0..3, &runs);
    assert_eq!(piece.text, "    ab");
    assert_eq!(piece.runs.as_slice(), &[(4..6, red)]);

    let clipped = Piece::from_chars(&chars, 0..2, &runs);
    assert_eq!(clipped.text, "    a");
    assert_eq!(clipped.runs.as_slice(), &[(4..5, red)]);
}
