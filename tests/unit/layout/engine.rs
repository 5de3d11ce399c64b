use super::*;

fn chars(s: &str) -> Vec<char> {
    s.chars().collect()
}

fn spans(lines: &[VisualLine]) -> Vec<(usize, usize)> {
    lines.iter().map(|l| (l.start, l.end)).collect()
}

fn layout_for(code: &str, output: &str, canvas: Canvas) -> CodeReelResult<Layout> {
    let q = chars("Add two numbers");
    let c = chars(code);
    let cmd = chars("node index.js");
    let o = chars(output);
    let theme = Theme::new(None).scaled(f64::from(canvas.width) / REFERENCE_WIDTH);
    compute_layout(
        &LayoutInput {
            canvas,
            question: &q,
            code: &c,
            command: &cmd,
            output: &o,
            language: LanguageFamily::JavaScript,
            wrap_width_chars: 30,
            question_wrap_chars: 25,
        },
        &theme,
    )
}

const FULL_HD: Canvas = Canvas {
    width: 1080,
    height: 1920,
};

#[test]
fn word_wrap_breaks_between_words() {
    assert_eq!(spans(&word_wrap(&chars("Add two numbers"), 25)), vec![(0, 15)]);
    assert_eq!(
        spans(&word_wrap(&chars("aaa bbb ccc"), 7)),
        vec![(0, 7), (8, 11)]
    );
}

#[test]
fn word_wrap_splits_long_words_and_keeps_blank_lines() {
    assert_eq!(
        spans(&word_wrap(&chars("abcdefghij x"), 4)),
        vec![(0, 4), (4, 8), (8, 12)]
    );
    assert_eq!(
        spans(&word_wrap(&chars("ab\n\ncd"), 10)),
        vec![(0, 2), (3, 3), (4, 6)]
    );
}

#[test]
fn char_wrap_numbers_only_first_rows() {
    let lines = char_wrap(&chars("abcdef\n\nxy"), 4, true);
    assert_eq!(spans(&lines), vec![(0, 4), (4, 6), (7, 7), (8, 10)]);
    let numbers: Vec<Option<u32>> = lines.iter().map(|l| l.number).collect();
    assert_eq!(numbers, vec![Some(1), None, Some(2), Some(3)]);
}

#[test]
fn char_wrap_counts_tab_columns() {
    assert_eq!(columns(&chars("\tx")), 5);
    assert_eq!(columns(&chars("ab\tx")), 5);
    let lines = char_wrap(&chars("\tx"), 4, false);
    assert_eq!(spans(&lines), vec![(0, 1), (1, 2)]);
}

#[test]
fn locate_places_caret_in_rows() {
    let text = chars("ab\ncd");
    let block = TextBlock {
        origin: Point::new(0.0, 0.0),
        cell_width: 10.0,
        line_height: 20.0,
        lines: char_wrap(&text, 10, true),
    };
    assert_eq!(block.locate(&text, 0), (0, 0));
    assert_eq!(block.locate(&text, 2), (0, 2));
    assert_eq!(block.locate(&text, 3), (1, 0));
    assert_eq!(block.locate(&text, 5), (1, 2));
    assert_eq!(block.line_top(1), 20.0);
    assert_eq!(block.column_x(2), 20.0);
}

#[test]
fn default_canvas_geometry() {
    let l = layout_for("a+b", "3", FULL_HD).unwrap();
    assert_eq!(l.scale, 1.0);
    assert_eq!(l.header.file_name, "index.js");
    assert_eq!(l.question.origin, Point::new(60.0, 200.0));
    assert_eq!(l.question.lines.len(), 1);
    assert_eq!(l.code.origin.y, 500.0);
    assert_eq!(l.gutter.digits, 1);
    assert!(l.code.origin.x > l.gutter.x);
    assert_eq!(l.terminal.rest_y, 1320);
    assert_eq!(l.terminal.offscreen_y, 1920);
    assert_eq!(l.terminal.prompt_origin.y, 1420.0);
    assert_eq!(l.terminal.output.origin.y, 1480.0);
}

#[test]
fn gutter_grows_with_line_count() {
    let code = (1..=12).map(|i| format!("x{i}")).collect::<Vec<_>>().join("\n");
    let l = layout_for(&code, "", FULL_HD).unwrap();
    assert_eq!(l.gutter.digits, 2);
    assert_eq!(l.code.lines.len(), 12);
}

#[test]
fn long_lines_wrap_instead_of_truncating() {
    let code = "x".repeat(75);
    let l = layout_for(&code, "", FULL_HD).unwrap();
    assert_eq!(spans(&l.code.lines), vec![(0, 30), (30, 60), (60, 75)]);
}

fn code_limit(l: &Layout) -> f64 {
    f64::from(l.canvas.height) - 60.0 * l.scale
}

#[test]
fn short_code_keeps_the_theme_size() {
    let l = layout_for("a+b", "", FULL_HD).unwrap();
    assert_eq!(l.code_style, Theme::new(None).code);
}

#[test]
fn twenty_five_lines_shrink_to_fit() {
    let code: String = (1..=25).map(|i| format!("let x{i} = {i};\n")).collect();
    let l = layout_for(&code, "", FULL_HD).unwrap();
    let theme = Theme::new(None);
    // Trailing newline adds an empty 26th row.
    assert_eq!(l.code.lines.len(), 26);
    assert!(l.code.bottom() <= code_limit(&l));
    assert!(l.code_style.size_px < theme.code.size_px);
    assert_eq!(l.code.line_height, l.code_style.line_height);
    assert_eq!(l.code.cell_width, l.code_style.cell_width);
    let ratio = l.code_style.cell_width / l.code_style.line_height;
    assert!((ratio - theme.code.cell_width / theme.code.line_height).abs() < 1e-9);
}

#[test]
fn shrinking_never_drops_rows_or_the_gutter() {
    let code = vec!["x"; 40].join("\n");
    let l = layout_for(&code, "", FULL_HD).unwrap();
    assert_eq!(l.code.lines.len(), 40);
    assert_eq!(l.gutter.digits, 2);
    assert!(l.code.origin.x > l.gutter.x);
    assert!(l.code.bottom() <= code_limit(&l));
}

#[test]
fn wrapped_code_shrinks_too() {
    let code = vec!["y".repeat(75); 12].join("\n");
    let l = layout_for(&code, "", FULL_HD).unwrap();
    assert_eq!(l.code.lines.len(), 36);
    assert!(l.code.bottom() <= code_limit(&l));
}

#[test]
fn unrenderable_code_is_rejected() {
    let code = vec!["x"; 2000].join("\n");
    let err = layout_for(&code, "", FULL_HD).unwrap_err();
    assert!(matches!(err, CodeReelError::InvalidScript(_)));
}

#[test]
fn output_must_fit_the_terminal() {
    let fits = vec!["ok"; 8].join("\n");
    assert!(layout_for("a", &fits, FULL_HD).is_ok());
    let spills = vec!["ok"; 9].join("\n");
    let err = layout_for("a", &spills, FULL_HD).unwrap_err();
    assert!(matches!(err, CodeReelError::InvalidScript(_)));
}

#[test]
fn small_canvas_scales_geometry() {
    let l = layout_for(
        "a+b",
        "3",
        Canvas {
            width: 216,
            height: 384,
        },
    )
    .unwrap();
    assert!((l.scale - 0.2).abs() < 1e-12);
    assert!((l.question.origin.y - 40.0).abs() < 1e-9);
    assert_eq!(l.terminal.rest_y, 264);
    assert!(l.code.bottom() < 384.0);
}
