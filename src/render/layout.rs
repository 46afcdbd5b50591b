use crate::{
    assets::fonts::{FamilyRoles, FontLibrary, LoadedFont},
    foundation::{
        core::{Point, Rect, Rgba8, TextMetrics, Vec2},
        error::{CoverError, CoverResult},
    },
    render::CoverSettings,
    style::{line::ResolvedLineStyle, sheet::StyleSheet},
};

/// Text measurement seam between layout and the rasterizer.
pub trait TextMeasure {
    /// Bounding box of `text` drawn with `font` at `size_px`.
    fn measure_text(
        &mut self,
        text: &str,
        font: &LoadedFont,
        size_px: f32,
    ) -> CoverResult<TextMetrics>;
}

/// Background block behind a line.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Backdrop {
    /// Text box grown by the scaled padding on every side.
    pub rect: Rect,
    /// Fill color.
    pub color: Rgba8,
}

/// One shadow draw of a line.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShadowDraw {
    /// Draw origin, already offset from the main text origin.
    pub origin: Point,
    /// Fill color.
    pub color: Rgba8,
}

/// A fully positioned text line, ready to paint.
#[derive(Clone, Debug)]
pub struct PlacedLine {
    /// 1-based line number.
    pub line_number: usize,
    /// Text after wrapping; segments are joined with `\n`.
    pub text: String,
    /// Face used for measuring and drawing.
    pub font: LoadedFont,
    /// Scaled, rounded font size.
    pub size_px: f32,
    /// Main text color.
    pub color: Rgba8,
    /// Measured text box in image pixels.
    pub text_box: Rect,
    /// Where the text is drawn so that its box lands on `text_box`.
    pub origin: Point,
    /// Optional background block, painted first.
    pub background: Option<Backdrop>,
    /// Shadows in source order, painted before the main text.
    pub shadows: Vec<ShadowDraw>,
}

/// Layout of every line on one image.
#[derive(Clone, Debug)]
pub struct CoverLayout {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// `width / reference_width`.
    pub scale_factor: f64,
    /// Lines in input order.
    pub lines: Vec<PlacedLine>,
}

/// Vertical state carried from one line to the next.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutCursor {
    /// Top of the most recently placed line.
    pub current_y: f64,
    /// Scaled font size of the most recently placed line.
    pub previous_font_px: Option<f64>,
}

impl LayoutCursor {
    /// Cursor before the first line: `initial_offset_px` (scaled) above the vertical center.
    pub fn start(height: u32, scale_factor: f64, settings: &CoverSettings) -> Self {
        Self {
            current_y: f64::from(height) / 2.0 - settings.initial_offset_px * scale_factor,
            previous_font_px: None,
        }
    }
}

/// Per-image constants shared by every line.
#[derive(Clone, Copy, Debug)]
pub struct FrameGeometry {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// `width / reference_width`.
    pub scale_factor: f64,
    /// Scaled and rounded background padding.
    pub background_padding_px: f64,
}

impl FrameGeometry {
    /// Geometry for a `width`x`height` image; both must be non-zero.
    pub fn new(width: u32, height: u32, settings: &CoverSettings) -> CoverResult<Self> {
        if width == 0 || height == 0 {
            return Err(CoverError::validation("image width/height must be non-zero"));
        }
        let scale_factor = f64::from(width) / settings.reference_width;
        Ok(Self {
            width,
            height,
            scale_factor,
            background_padding_px: (settings.background_padding_px * scale_factor).round(),
        })
    }

    /// `px` reference pixels as a rounded, strictly positive font size.
    pub fn font_px(&self, px: f64) -> f64 {
        (px * self.scale_factor).round().max(1.0)
    }
}

/// Break `text` into segments no wider than `max_width`, one character at a time.
///
/// A character that does not fit on its own still gets a segment, so the
/// result is never empty for non-empty input and no character is dropped.
pub fn wrap_chars<M: TextMeasure + ?Sized>(
    measure: &mut M,
    text: &str,
    font: &LoadedFont,
    size_px: f32,
    max_width: f64,
) -> CoverResult<Vec<String>> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for ch in text.chars() {
        let mut candidate = current.clone();
        candidate.push(ch);
        if measure.measure_text(&candidate, font, size_px)?.right() <= max_width {
            current = candidate;
        } else {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            current.push(ch);
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    Ok(lines)
}

/// Position one line below the cursor and advance it.
pub fn place_line<M: TextMeasure + ?Sized>(
    measure: &mut M,
    cursor: LayoutCursor,
    line_number: usize,
    text: &str,
    style: &ResolvedLineStyle,
    fonts: &FontLibrary,
    geometry: &FrameGeometry,
) -> CoverResult<(LayoutCursor, PlacedLine)> {
    let font = fonts.font_for(style.role, style.italic).clone();
    let font_px = geometry.font_px(style.font_size_px);
    let size_px = font_px as f32;

    let text = match style.width_percent {
        Some(percent) => {
            let max_width = f64::from(geometry.width) * percent / 100.0;
            wrap_chars(measure, text, &font, size_px, max_width)?.join("\n")
        }
        None => text.to_string(),
    };
    let metrics = measure.measure_text(&text, &font, size_px)?;

    let margin = style.margin_top_px * geometry.scale_factor;
    let current_y = match cursor.previous_font_px {
        None => cursor.current_y + margin,
        Some(prev) => cursor.current_y + prev * style.line_height + margin,
    };

    let x = (f64::from(geometry.width) - metrics.width) / 2.0;
    let text_box = Rect::new(x, current_y, x + metrics.width, current_y + metrics.height);
    let origin = Point::new(x - metrics.left, current_y - metrics.top);

    let pad = geometry.background_padding_px;
    let background = style.background.map(|color| Backdrop {
        rect: text_box.inflate(pad, pad),
        color,
    });
    let shadows = style
        .shadows
        .iter()
        .map(|s| ShadowDraw {
            origin: origin
                + Vec2::new(s.dx * geometry.scale_factor, s.dy * geometry.scale_factor),
            color: s.color,
        })
        .collect();

    tracing::debug!(
        line = line_number,
        y = current_y,
        width = metrics.width,
        height = metrics.height,
        size_px,
        "placed line"
    );

    let next = LayoutCursor {
        current_y,
        previous_font_px: Some(font_px),
    };
    Ok((
        next,
        PlacedLine {
            line_number,
            text,
            font,
            size_px,
            color: style.color,
            text_box,
            origin,
            background,
            shadows,
        },
    ))
}

/// Lay out `texts` on a `width`x`height` image.
#[allow(clippy::too_many_arguments)]
pub fn layout_cover<M, S>(
    measure: &mut M,
    width: u32,
    height: u32,
    texts: &[S],
    sheet: &StyleSheet,
    fonts: &FontLibrary,
    roles: &FamilyRoles,
    settings: &CoverSettings,
) -> CoverResult<CoverLayout>
where
    M: TextMeasure + ?Sized,
    S: AsRef<str>,
{
    let geometry = FrameGeometry::new(width, height, settings)?;
    tracing::debug!(
        width,
        height,
        scale_factor = geometry.scale_factor,
        lines = texts.len(),
        "laying out cover"
    );

    let start = LayoutCursor::start(height, geometry.scale_factor, settings);
    let (_, lines) = texts.iter().enumerate().try_fold(
        (start, Vec::with_capacity(texts.len())),
        |(cursor, mut placed), (i, text)| {
            let line_number = i + 1;
            let style = ResolvedLineStyle::from_style(
                &sheet.resolve(line_number),
                line_number,
                roles,
                settings,
            );
            let (cursor, line) = place_line(
                measure,
                cursor,
                line_number,
                text.as_ref(),
                &style,
                fonts,
                &geometry,
            )?;
            placed.push(line);
            Ok::<_, CoverError>((cursor, placed))
        },
    )?;

    Ok(CoverLayout {
        width,
        height,
        scale_factor: geometry.scale_factor,
        lines,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/layout.rs"]
mod tests;
