use std::collections::HashMap;

use crate::{
    assets::{PreparedImage, fonts::LoadedFont},
    foundation::{
        core::{Point, Rect, Rgba8, TextMetrics},
        error::{CoverError, CoverResult},
    },
    render::{FrameRGBA, layout::TextMeasure, paint::CoverCanvas},
    text::engine::TextLayoutEngine,
};

/// CPU rasterizer for one cover: the source image with text drawn on top.
pub struct CpuCanvas {
    width: u16,
    height: u16,
    ctx: vello_cpu::RenderContext,
    text: TextLayoutEngine,
    font_cache: HashMap<u32, vello_cpu::peniko::FontData>,
}

impl CpuCanvas {
    /// Start a canvas covered by `source`.
    pub fn new(source: &PreparedImage) -> CoverResult<Self> {
        let pixmap = image_premul_bytes_to_pixmap(
            source.rgba8_premul.as_slice(),
            source.width,
            source.height,
        )?;
        let (width, height) = (pixmap.width(), pixmap.height());

        let mut ctx = vello_cpu::RenderContext::new(width, height);
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(std::sync::Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        });
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(width),
            f64::from(height),
        ));

        Ok(Self {
            width,
            height,
            ctx,
            text: TextLayoutEngine::new(),
            font_cache: HashMap::new(),
        })
    }

    /// Rasterize every queued draw and return premultiplied pixels.
    pub fn finish(mut self) -> FrameRGBA {
        self.ctx.flush();
        let mut pixmap = vello_cpu::Pixmap::new(self.width, self.height);
        self.ctx.render_to_pixmap(&mut pixmap);
        FrameRGBA {
            width: u32::from(self.width),
            height: u32::from(self.height),
            data: pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        }
    }

    fn font_data(&mut self, font: &LoadedFont) -> vello_cpu::peniko::FontData {
        self.font_cache
            .entry(font.id)
            .or_insert_with(|| {
                vello_cpu::peniko::FontData::new(
                    vello_cpu::peniko::Blob::from(font.bytes.as_ref().clone()),
                    font.index,
                )
            })
            .clone()
    }
}

impl TextMeasure for CpuCanvas {
    fn measure_text(
        &mut self,
        text: &str,
        font: &LoadedFont,
        size_px: f32,
    ) -> CoverResult<TextMetrics> {
        self.text.measure(text, font, size_px)
    }
}

impl CoverCanvas for CpuCanvas {
    fn fill_rect(&mut self, rect: Rect, color: Rgba8) -> CoverResult<()> {
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx
            .set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_paint(color_to_cpu(color));
        self.ctx.fill_rect(&rect_to_cpu(rect));
        Ok(())
    }

    fn draw_text(
        &mut self,
        origin: Point,
        text: &str,
        font: &LoadedFont,
        size_px: f32,
        color: Rgba8,
    ) -> CoverResult<()> {
        let layout = self.text.layout_centered(text, font, size_px, color.into())?;
        let font_data = self.font_data(font);

        self.ctx
            .set_transform(vello_cpu::kurbo::Affine::translate((origin.x, origin.y)));
        self.ctx
            .set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let brush = run.style().brush;
                self.ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.r, brush.g, brush.b, brush.a,
                ));
                let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                self.ctx
                    .glyph_run(&font_data)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
        Ok(())
    }
}

fn color_to_cpu(c: Rgba8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

fn image_premul_bytes_to_pixmap(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> CoverResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| CoverError::render("image width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| CoverError::render("image height exceeds u16"))?;
    if w == 0 || h == 0 {
        return Err(CoverError::render("image has zero width or height"));
    }
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(CoverError::render("prepared image byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let pixels = rgba8_premul
        .chunks_exact(4)
        .map(|px| {
            may_have_opacities |= px[3] != 255;
            vello_cpu::peniko::color::PremulRgba8 {
                r: px[0],
                g: px[1],
                b: px[2],
                a: px[3],
            }
        })
        .collect();
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
