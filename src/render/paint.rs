use crate::{
    assets::fonts::LoadedFont,
    foundation::{
        core::{Point, Rect, Rgba8},
        error::CoverResult,
    },
    render::layout::{CoverLayout, TextMeasure},
};

/// Drawing surface a [`CoverLayout`] is painted onto.
///
/// Draw calls are applied in call order; later draws cover earlier ones.
pub trait CoverCanvas: TextMeasure {
    /// Fill `rect` with `color` (straight alpha).
    fn fill_rect(&mut self, rect: Rect, color: Rgba8) -> CoverResult<()>;

    /// Draw `text` so that its layout origin sits at `origin`.
    fn draw_text(
        &mut self,
        origin: Point,
        text: &str,
        font: &LoadedFont,
        size_px: f32,
        color: Rgba8,
    ) -> CoverResult<()>;
}

/// Paint every line: background block, then shadows in order, then the text.
pub fn paint_cover<C: CoverCanvas + ?Sized>(
    canvas: &mut C,
    layout: &CoverLayout,
) -> CoverResult<()> {
    for line in &layout.lines {
        if let Some(bg) = line.background {
            canvas.fill_rect(bg.rect, bg.color)?;
        }
        for shadow in &line.shadows {
            canvas.draw_text(
                shadow.origin,
                &line.text,
                &line.font,
                line.size_px,
                shadow.color,
            )?;
        }
        canvas.draw_text(line.origin, &line.text, &line.font, line.size_px, line.color)?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/render/paint.rs"]
mod tests;
