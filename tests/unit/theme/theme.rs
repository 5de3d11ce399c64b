use super::*;

#[test]
fn block_theme_uses_default_metrics() {
    let t = Theme::new(None);
    assert!(t.font().is_none());
    assert_eq!(t.code.size_px, 48.0);
    assert_eq!(t.code.line_height, 70.0);
    assert!((t.code.cell_width - 48.0 * DEFAULT_ADVANCE_RATIO).abs() < 1e-9);
    assert_eq!(t.question.line_height, 80.0);
    assert_eq!(t.terminal.line_height, 50.0);
}

#[test]
fn load_never_fails() {
    let t = Theme::load(Some(Path::new("/no/such/font.ttf")));
    assert!(t.code.cell_width > 0.0);
}

#[test]
fn scaling_multiplies_metrics() {
    let t = Theme::new(None);
    let half = t.scaled(0.5);
    assert_eq!(half.code.size_px, 24.0);
    assert_eq!(half.code.line_height, 35.0);
    assert!((half.code.cell_width * 2.0 - t.code.cell_width).abs() < 1e-9);
    assert_eq!(half.palette, t.palette);
}
