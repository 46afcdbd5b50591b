use super::*;
use crate::assets::fonts::system_default_font;

fn solid(width: u32, height: u32, px: [u8; 4]) -> PreparedImage {
    PreparedImage {
        width,
        height,
        rgba8_premul: std::sync::Arc::new(px.repeat((width * height) as usize)),
    }
}

#[test]
fn pixmap_conversion_rejects_bad_inputs() {
    assert!(image_premul_bytes_to_pixmap(&[0; 8], 1, 1).is_err());
    assert!(image_premul_bytes_to_pixmap(&[], 0, 4).is_err());
    assert!(image_premul_bytes_to_pixmap(&[], 70_000, 1).is_err());
    let p = image_premul_bytes_to_pixmap(&[1, 2, 3, 255, 4, 5, 6, 255], 2, 1).unwrap();
    assert_eq!((p.width(), p.height()), (2, 1));
}

#[test]
fn untouched_canvas_reproduces_source() {
    let canvas = CpuCanvas::new(&solid(8, 4, [10, 120, 200, 255])).unwrap();
    let frame = canvas.finish();
    assert_eq!((frame.width, frame.height), (8, 4));
    assert!(frame.premultiplied);
    for px in frame.data.chunks_exact(4) {
        assert!(px[0].abs_diff(10) <= 1, "{px:?}");
        assert!(px[1].abs_diff(120) <= 1, "{px:?}");
        assert!(px[2].abs_diff(200) <= 1, "{px:?}");
        assert_eq!(px[3], 255);
    }
}

#[test]
fn fill_rect_covers_only_its_area() {
    let mut canvas = CpuCanvas::new(&solid(10, 10, [0, 0, 0, 255])).unwrap();
    canvas
        .fill_rect(Rect::new(0.0, 0.0, 5.0, 10.0), Rgba8::opaque(255, 0, 0))
        .unwrap();
    let frame = canvas.finish();
    let at = |x: usize, y: usize| {
        let i = (y * 10 + x) * 4;
        [frame.data[i], frame.data[i + 1], frame.data[i + 2], frame.data[i + 3]]
    };
    assert_eq!(at(2, 5), [255, 0, 0, 255]);
    assert_eq!(at(8, 5), [0, 0, 0, 255]);
}

#[test]
fn draw_text_marks_pixels() {
    let Some(font) = system_default_font() else {
        return;
    };
    let mut canvas = CpuCanvas::new(&solid(200, 100, [0, 0, 0, 255])).unwrap();
    let metrics = canvas.measure_text("Hi", &font, 40.0).unwrap();
    assert!(metrics.width > 0.0 && metrics.height > 0.0);

    canvas
        .draw_text(Point::new(20.0, 20.0), "Hi", &font, 40.0, Rgba8::WHITE)
        .unwrap();
    let frame = canvas.finish();
    let lit = frame.data.chunks_exact(4).filter(|px| px[0] > 128).count();
    assert!(lit > 0, "expected some white glyph pixels");
}
