use super::*;

fn engine() -> TextLayoutEngine {
    TextLayoutEngine::new(&crate::assets::fonts::fixture_font_set()).expect("engine")
}

#[test]
fn blank_text_shapes_to_nothing() {
    let mut engine = engine();
    let shaped = engine.shape("   ", 24.0, 500, Some(100.0), None).unwrap();
    assert_eq!(shaped, ShapedText::default());
}

#[test]
fn invalid_size_is_a_render_error() {
    let mut engine = engine();
    let err = engine.shape("hi", 0.0, 500, None, None).unwrap_err();
    assert!(matches!(err, ThumbnailError::Render(_)), "{err}");
}

#[test]
fn narrow_width_wraps_onto_several_lines() {
    let mut engine = engine();
    let text = "one two three four five six seven eight";
    let single = engine.shape(text, 24.0, 500, None, None).unwrap();
    assert_eq!(single.lines.len(), 1);

    let wrapped = engine.shape(text, 24.0, 500, Some(150.0), None).unwrap();
    assert!(wrapped.lines.len() > 1);
    assert!(wrapped.height > single.height);
    assert!(wrapped.lines.windows(2).all(|w| w[1].baseline > w[0].baseline));
    let rejoined = wrapped
        .lines
        .iter()
        .map(|l| l.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    assert_eq!(rejoined, text);
}

#[test]
fn clamped_text_ends_with_ellipsis_and_fits() {
    let mut engine = engine();
    let text = "lorem ipsum dolor sit amet ".repeat(10);
    let shaped = engine.shape(&text, 24.0, 500, Some(200.0), Some(2)).unwrap();
    assert_eq!(shaped.lines.len(), 2);
    let last = shaped.lines.last().unwrap();
    assert!(last.text.ends_with(ELLIPSIS), "{:?}", last.text);
    assert!(last.width <= 200.0 + 0.5, "{}", last.width);
}

#[test]
fn bold_text_is_not_narrower_than_regular() {
    let mut engine = engine();
    let regular = engine.measure_line("Created by Alice", 24.0, 400).unwrap();
    let bold = engine.measure_line("Created by Alice", 24.0, 800).unwrap();
    assert!(regular > 0.0);
    assert!(bold >= regular * 0.95);
}
