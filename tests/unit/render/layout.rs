use super::*;
use crate::assets::fonts::FontRole;

/// Every character advances by the font size; every row is one font size tall.
struct FixedAdvance {
    left: f64,
    top: f64,
}

impl FixedAdvance {
    fn new() -> Self {
        Self {
            left: 0.0,
            top: 0.0,
        }
    }
}

impl TextMeasure for FixedAdvance {
    fn measure_text(
        &mut self,
        text: &str,
        _font: &LoadedFont,
        size_px: f32,
    ) -> CoverResult<TextMetrics> {
        let size = f64::from(size_px);
        let widest = text.split('\n').map(|l| l.chars().count()).max().unwrap_or(0);
        let rows = text.split('\n').count();
        Ok(TextMetrics {
            left: self.left,
            top: self.top,
            width: widest as f64 * size,
            height: rows as f64 * size,
        })
    }
}

fn fake(tag: u8) -> LoadedFont {
    LoadedFont::from_bytes(vec![tag; 4])
}

fn fonts() -> FontLibrary {
    FontLibrary::new(fake(1))
}

fn layout(css: &str, width: u32, height: u32, texts: &[&str]) -> CoverLayout {
    layout_cover(
        &mut FixedAdvance::new(),
        width,
        height,
        texts,
        &StyleSheet::parse(css),
        &fonts(),
        &FamilyRoles::default(),
        &CoverSettings::default(),
    )
    .unwrap()
}

#[test]
fn wrap_splits_one_past_capacity() {
    let mut m = FixedAdvance::new();
    let lines = wrap_chars(&mut m, "abcde", &fake(1), 20.0, 80.0).unwrap();
    assert_eq!(lines, vec!["abcd".to_string(), "e".to_string()]);
}

#[test]
fn wrap_keeps_oversized_characters() {
    let mut m = FixedAdvance::new();
    let lines = wrap_chars(&mut m, "字字", &fake(1), 50.0, 10.0).unwrap();
    assert_eq!(lines, vec!["字".to_string(), "字".to_string()]);
    assert!(wrap_chars(&mut m, "", &fake(1), 50.0, 10.0).unwrap().is_empty());
}

#[test]
fn wrap_respects_left_bearing() {
    let mut m = FixedAdvance {
        left: 5.0,
        top: 0.0,
    };
    // "ab" is 40 wide but its right edge sits at 45.
    let lines = wrap_chars(&mut m, "ab", &fake(1), 20.0, 40.0).unwrap();
    assert_eq!(lines, vec!["a".to_string(), "b".to_string()]);
}

#[test]
fn single_line_is_centered_horizontally() {
    let out = layout(".text-block p { font-size: 40px }", 720, 1000, &["abc"]);
    assert_eq!(out.scale_factor, 1.0);
    let line = &out.lines[0];
    assert_eq!(line.size_px, 40.0);
    assert_eq!(line.text_box.width(), 120.0);
    assert_eq!(line.text_box.x0, 300.0);
    assert_eq!(line.text_box.y0, 500.0 - 150.0);
}

#[test]
fn percent_width_wraps_into_multiple_rows() {
    let out = layout(
        ".text-block p { font-size: 40px; width: 50% }",
        720,
        1000,
        &["aaaaaaaaaa"],
    );
    let line = &out.lines[0];
    assert_eq!(line.text, "aaaaaaaaa\na");
    assert_eq!(line.text_box.width(), 360.0);
    assert_eq!(line.text_box.height(), 80.0);
}

#[test]
fn layout_scales_with_image_width() {
    let css = r#"
        .text-block p { font-size: 40px; margin-top: 10px; background-color: black; text-shadow: 2px 3px 0 red }
        .text-block p.line2 { font-size: 30px }
    "#;
    let small = layout(css, 720, 900, &["ab", "cde"]);
    let large = layout(css, 1440, 1800, &["ab", "cde"]);
    assert_eq!(large.scale_factor, 2.0);

    for (s, l) in small.lines.iter().zip(&large.lines) {
        assert_eq!(l.size_px, s.size_px * 2.0);
        assert!((l.text_box.x0 - 2.0 * s.text_box.x0).abs() < 1e-9);
        assert!((l.text_box.y0 - 2.0 * s.text_box.y0).abs() < 1e-9);
        assert!((l.text_box.width() - 2.0 * s.text_box.width()).abs() < 1e-9);

        let (sb, lb) = (s.background.unwrap(), l.background.unwrap());
        assert!((lb.rect.x0 - 2.0 * sb.rect.x0).abs() < 1e-9);
        assert!((lb.rect.y1 - 2.0 * sb.rect.y1).abs() < 1e-9);

        let (ss, ls) = (s.shadows[0], l.shadows[0]);
        assert!((ls.origin.x - 2.0 * ss.origin.x).abs() < 1e-9);
        assert!((ls.origin.y - 2.0 * ss.origin.y).abs() < 1e-9);
    }
}

#[test]
fn lines_advance_by_previous_font_size_times_own_line_height() {
    let css = r#"
        .text-block p { font-size: 40px }
        .text-block p.line2 { font-size: 10px; line-height: 2; margin-top: 6px }
        .text-block p.line3 { font-size: 10px }
    "#;
    let out = layout(css, 720, 1000, &["a", "b", "c"]);
    let ys: Vec<f64> = out.lines.iter().map(|l| l.text_box.y0).collect();
    assert_eq!(ys[1] - ys[0], 40.0 * 2.0 + 6.0);
    assert!((ys[2] - ys[1] - 10.0 * 1.3).abs() < 1e-9);
}

#[test]
fn fourth_line_uses_base_rule_only() {
    let css = r#"
        .text-block p { font-size: 30px }
        .text-block p.line3 { font-size: 50px }
    "#;
    let out = layout(css, 720, 1000, &["a", "b", "c", "d"]);
    let sizes: Vec<f32> = out.lines.iter().map(|l| l.size_px).collect();
    assert_eq!(sizes, vec![30.0, 30.0, 50.0, 30.0]);
    assert_eq!(out.lines[3].line_number, 4);
}

#[test]
fn italic_without_italic_face_keeps_role_font() {
    let lib = FontLibrary::new(fake(1)).with_font(FontRole::Zongyi, fake(2));
    let out = layout_cover(
        &mut FixedAdvance::new(),
        720,
        1000,
        &["x"],
        &StyleSheet::parse(r#".text-block p { font-family: "综艺体"; font-style: italic }"#),
        &lib,
        &FamilyRoles::default(),
        &CoverSettings::default(),
    )
    .unwrap();
    assert_eq!(out.lines[0].font.bytes[0], 2);
}

#[test]
fn bearings_shift_the_draw_origin_not_the_box() {
    let mut m = FixedAdvance {
        left: 3.0,
        top: 7.0,
    };
    let out = layout_cover(
        &mut m,
        720,
        1000,
        &["ab"],
        &StyleSheet::parse(".text-block p { font-size: 20px; text-shadow: 4px 4px 0 black }"),
        &fonts(),
        &FamilyRoles::default(),
        &CoverSettings::default(),
    )
    .unwrap();
    let line = &out.lines[0];
    assert_eq!(line.text_box.x0, 340.0);
    assert_eq!(line.origin, Point::new(337.0, line.text_box.y0 - 7.0));
    assert_eq!(line.shadows[0].origin, Point::new(341.0, line.text_box.y0 - 3.0));
}

#[test]
fn background_is_padded_by_scaled_padding() {
    let out = layout(
        ".text-block p { font-size: 20px; background-color: #00000080 }",
        1080,
        1920,
        &["ab"],
    );
    let line = &out.lines[0];
    let bg = line.background.unwrap();
    assert_eq!(bg.color, Rgba8::new(0, 0, 0, 128));
    assert_eq!(bg.rect.x0, line.text_box.x0 - 30.0);
    assert_eq!(bg.rect.y1, line.text_box.y1 + 30.0);
}

#[test]
fn malformed_font_size_uses_default() {
    let out = layout(".text-block p { font-size: big }", 720, 1000, &["a"]);
    assert_eq!(out.lines[0].size_px, 80.0);
}

#[test]
fn empty_input_and_degenerate_images() {
    assert!(layout("", 720, 1000, &[]).lines.is_empty());

    let err = layout_cover(
        &mut FixedAdvance::new(),
        0,
        10,
        &["a"],
        &StyleSheet::default(),
        &fonts(),
        &FamilyRoles::default(),
        &CoverSettings::default(),
    )
    .unwrap_err();
    assert!(matches!(err, CoverError::Validation(_)));
}
