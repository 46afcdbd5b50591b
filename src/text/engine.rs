use std::{borrow::Cow, collections::HashMap};

use crate::{
    assets::fonts::LoadedFont,
    foundation::{
        core::{Rgba8, TextMetrics},
        error::{CoverError, CoverResult},
    },
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGBA8 brush color used by Parley text layout.
pub struct TextBrushRgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl From<Rgba8> for TextBrushRgba8 {
    fn from(c: Rgba8) -> Self {
        Self {
            r: c.r,
            g: c.g,
            b: c.b,
            a: c.a,
        }
    }
}

/// Stateful helper for building Parley text layouts from loaded font bytes.
///
/// Each [`LoadedFont`] is registered once; later layouts reuse its family name.
pub struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    families: HashMap<u32, String>,
}

impl Default for TextLayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLayoutEngine {
    /// Construct a new layout engine with fresh Parley contexts.
    pub fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            families: HashMap::new(),
        }
    }

    /// Family name Parley resolved for `font`, registering it on first use.
    pub fn family_name(&mut self, font: &LoadedFont) -> CoverResult<String> {
        if let Some(name) = self.families.get(&font.id) {
            return Ok(name.clone());
        }

        let families = self.font_ctx.collection.register_fonts(
            parley::fontique::Blob::from(font.bytes.as_ref().clone()),
            None,
        );
        let family_id = families
            .iter()
            .find(|(_, faces)| faces.iter().any(|f| f.index() == font.index))
            .or_else(|| families.first())
            .map(|(id, _)| *id)
            .ok_or_else(|| CoverError::font("no font families registered from font bytes"))?;

        let name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| CoverError::font("registered font family has no name"))?
            .to_string();
        self.families.insert(font.id, name.clone());
        Ok(name)
    }

    /// Shape `text` (which may contain `\n`) as a center-aligned block.
    pub fn layout_centered(
        &mut self,
        text: &str,
        font: &LoadedFont,
        size_px: f32,
        brush: TextBrushRgba8,
    ) -> CoverResult<parley::Layout<TextBrushRgba8>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(CoverError::validation(
                "text size_px must be finite and > 0",
            ));
        }

        let family_name = self.family_name(font)?;

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(Cow::Owned(family_name)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);
        layout.align(
            None,
            parley::Alignment::Center,
            parley::AlignmentOptions::default(),
        );

        Ok(layout)
    }

    /// Bounding box of `text` laid out at `size_px`.
    ///
    /// The box is the union of the line boxes, so its origin coincides with the
    /// layout origin and both bearings are zero.
    pub fn measure(
        &mut self,
        text: &str,
        font: &LoadedFont,
        size_px: f32,
    ) -> CoverResult<TextMetrics> {
        let layout = self.layout_centered(text, font, size_px, TextBrushRgba8::default())?;
        Ok(TextMetrics {
            left: 0.0,
            top: 0.0,
            width: f64::from(layout.width()),
            height: f64::from(layout.height()),
        })
    }
}
