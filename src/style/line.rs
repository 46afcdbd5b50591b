use crate::{
    assets::fonts::{FamilyRoles, FontRole},
    foundation::core::Rgba8,
    render::CoverSettings,
    style::{
        color::parse_css_color,
        sheet::EffectiveLineStyle,
        values::{parse_line_height, parse_percent, parse_pixels, parse_shadow_list},
    },
};

/// Shorthand `margin` value that contributes nothing to the top margin.
const CENTERED_MARGIN: &str = "0 auto";

/// One shadow layer with its color already parsed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResolvedShadow {
    /// Horizontal offset in reference pixels.
    pub dx: f64,
    /// Vertical offset in reference pixels.
    pub dy: f64,
    /// Shadow color.
    pub color: Rgba8,
}

/// Typed view of an [`EffectiveLineStyle`], with defaults applied.
///
/// Pixel quantities are in reference-width pixels; the layout pass scales them.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedLineStyle {
    /// `font-size`.
    pub font_size_px: f64,
    /// `color`.
    pub color: Rgba8,
    /// `line-height` multiplier.
    pub line_height: f64,
    /// Role selected from `font-family`.
    pub role: FontRole,
    /// `font-style: italic`.
    pub italic: bool,
    /// `width` as a percentage of the image width; no wrapping when `None`.
    pub width_percent: Option<f64>,
    /// `margin-top` plus the first `margin` token.
    pub margin_top_px: f64,
    /// `background-color`.
    pub background: Option<Rgba8>,
    /// `text-shadow` layers in source order.
    pub shadows: Vec<ResolvedShadow>,
}

impl ResolvedLineStyle {
    /// Interpret `style` for 1-based `line_number`.
    ///
    /// Malformed values never fail the render: each one logs a warning and
    /// takes its default, leaving the rest of the line untouched.
    pub fn from_style(
        style: &EffectiveLineStyle,
        line_number: usize,
        roles: &FamilyRoles,
        settings: &CoverSettings,
    ) -> Self {
        let font_size_px = match style.get("font-size") {
            Some(v) => pixels_or(v, "font-size", line_number, settings.default_font_size_px),
            None => settings.default_font_size_px,
        };

        let default_color = parse_css_color(&settings.default_color).unwrap_or(Rgba8::WHITE);
        let color = match style.get("color") {
            Some(v) => parse_css_color(v).unwrap_or_else(|err| {
                tracing::warn!(line = line_number, %err, "using default text color");
                default_color
            }),
            None => default_color,
        };

        let line_height = match style.get("line-height") {
            Some(v) => parse_line_height(v).unwrap_or_else(|err| {
                tracing::warn!(line = line_number, %err, "using default line-height");
                settings.default_line_height
            }),
            None => settings.default_line_height,
        };

        let role = style
            .get("font-family")
            .map(|f| roles.role_for(f))
            .unwrap_or(FontRole::Main);
        let italic = style.get("font-style").is_some_and(|s| s.trim() == "italic");

        let width_percent = style.get("width").and_then(|v| {
            parse_percent(v).unwrap_or_else(|err| {
                tracing::warn!(line = line_number, %err, "ignoring width, text will not wrap");
                None
            })
        });

        let margin_top_px = margin_top_px(style, line_number);

        let background = style.get("background-color").and_then(|v| {
            parse_css_color(v)
                .map_err(|err| {
                    tracing::warn!(line = line_number, %err, "skipping background block");
                })
                .ok()
        });

        let shadows = parse_shadow_list(style.get("text-shadow"))
            .into_iter()
            .filter_map(|s| match parse_css_color(&s.color) {
                Ok(color) => Some(ResolvedShadow {
                    dx: f64::from(s.x),
                    dy: f64::from(s.y),
                    color,
                }),
                Err(err) => {
                    tracing::warn!(line = line_number, %err, "skipping shadow layer");
                    None
                }
            })
            .collect();

        Self {
            font_size_px,
            color,
            line_height,
            role,
            italic,
            width_percent,
            margin_top_px,
            background,
            shadows,
        }
    }
}

/// Unscaled top margin: `margin-top` plus, unless `margin` is `0 auto`, its first token.
pub fn margin_top_px(style: &EffectiveLineStyle, line_number: usize) -> f64 {
    let mut margin = match style.get("margin-top") {
        Some(v) => pixels_or(v, "margin-top", line_number, 0.0),
        None => 0.0,
    };
    if let Some(shorthand) = style.get("margin")
        && shorthand.trim() != CENTERED_MARGIN
        && let Some(first) = shorthand.split_whitespace().next()
    {
        margin += pixels_or(first, "margin", line_number, 0.0);
    }
    margin
}

fn pixels_or(value: &str, property: &str, line_number: usize, default: f64) -> f64 {
    match parse_pixels(value) {
        Ok(px) => f64::from(px),
        Err(_) => {
            tracing::warn!(line = line_number, property, value, default, "malformed pixel value");
            default
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/style/line.rs"]
mod tests;
