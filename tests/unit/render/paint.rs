use super::*;
use crate::{
    assets::fonts::{FamilyRoles, FontLibrary},
    foundation::core::TextMetrics,
    render::{CoverSettings, layout::layout_cover},
    style::sheet::StyleSheet,
};

#[derive(Debug, PartialEq)]
enum Call {
    Rect(Rect, Rgba8),
    Text(Point, String, Rgba8),
}

#[derive(Default)]
struct Recorder {
    calls: Vec<Call>,
}

impl TextMeasure for Recorder {
    fn measure_text(
        &mut self,
        text: &str,
        _font: &LoadedFont,
        size_px: f32,
    ) -> CoverResult<TextMetrics> {
        Ok(TextMetrics {
            left: 0.0,
            top: 0.0,
            width: text.chars().count() as f64 * f64::from(size_px),
            height: f64::from(size_px),
        })
    }
}

impl CoverCanvas for Recorder {
    fn fill_rect(&mut self, rect: Rect, color: Rgba8) -> CoverResult<()> {
        self.calls.push(Call::Rect(rect, color));
        Ok(())
    }

    fn draw_text(
        &mut self,
        origin: Point,
        text: &str,
        _font: &LoadedFont,
        _size_px: f32,
        color: Rgba8,
    ) -> CoverResult<()> {
        self.calls.push(Call::Text(origin, text.to_string(), color));
        Ok(())
    }
}

fn record(css: &str, texts: &[&str]) -> Vec<Call> {
    let mut canvas = Recorder::default();
    let layout = layout_cover(
        &mut canvas,
        720,
        1280,
        texts,
        &StyleSheet::parse(css),
        &FontLibrary::new(LoadedFont::from_bytes(vec![0; 4])),
        &FamilyRoles::default(),
        &CoverSettings::default(),
    )
    .unwrap();
    paint_cover(&mut canvas, &layout).unwrap();
    canvas.calls
}

#[test]
fn background_then_shadows_then_text() {
    let calls = record(
        ".text-block p { font-size: 10px; color: #fff; background-color: #000; text-shadow: 1px 0px 0 red, 0px 1px 0 blue }",
        &["hi"],
    );
    assert_eq!(calls.len(), 4);
    assert!(matches!(calls[0], Call::Rect(_, c) if c == Rgba8::BLACK));
    assert!(matches!(&calls[1], Call::Text(_, t, c) if t == "hi" && *c == Rgba8::opaque(255, 0, 0)));
    assert!(matches!(&calls[2], Call::Text(_, _, c) if *c == Rgba8::opaque(0, 0, 255)));
    assert!(matches!(&calls[3], Call::Text(_, _, c) if *c == Rgba8::WHITE));

    let (Call::Text(shadow, ..), Call::Text(main, ..)) = (&calls[1], &calls[3]) else {
        panic!("expected text draws");
    };
    assert_eq!(shadow.x - main.x, 1.0);
    assert_eq!(shadow.y, main.y);
}

#[test]
fn lines_paint_in_input_order() {
    let calls = record(".text-block p { font-size: 10px }", &["one", "two"]);
    let texts: Vec<&str> = calls
        .iter()
        .map(|c| match c {
            Call::Text(_, t, _) => t.as_str(),
            Call::Rect(..) => "rect",
        })
        .collect();
    assert_eq!(texts, vec!["one", "two"]);
}

#[test]
fn plain_line_is_a_single_draw() {
    let calls = record("", &["x"]);
    assert_eq!(calls.len(), 1);
    assert!(matches!(&calls[0], Call::Text(_, _, c) if *c == Rgba8::WHITE));
}
