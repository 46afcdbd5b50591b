use std::sync::OnceLock;

use regex::Regex;

use crate::foundation::error::{CoverError, CoverResult};

/// One `text-shadow` layer: an offset replay of the glyphs in `color`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShadowSpec {
    /// Horizontal offset in reference pixels.
    pub x: i32,
    /// Vertical offset in reference pixels.
    pub y: i32,
    /// Raw color token.
    pub color: String,
}

/// Parse `"80px"` or `"80"` into an integer pixel count.
pub fn parse_pixels(value: &str) -> CoverResult<i32> {
    let trimmed = value.trim();
    let number = trimmed.strip_suffix("px").unwrap_or(trimmed).trim();
    number
        .parse::<i32>()
        .map_err(|_| CoverError::malformed("<pixels>", value))
}

/// Parse a comma-separated `text-shadow` list in source order.
///
/// Each layer has the shape `<x>px <y>px <blur> <color>`; the blur radius is
/// accepted but unused. Functional colors such as `rgba(0,0,0,.5)` keep their
/// inner commas. `none` (or an absent value) yields no layers.
pub fn parse_shadow_list(value: Option<&str>) -> Vec<ShadowSpec> {
    let Some(value) = value.map(str::trim) else {
        return Vec::new();
    };
    if value.is_empty() || value == "none" {
        return Vec::new();
    }

    shadow_regex()
        .captures_iter(value)
        .filter_map(|caps| {
            let x = caps[1].parse().ok()?;
            let y = caps[2].parse().ok()?;
            Some(ShadowSpec {
                x,
                y,
                color: caps[3].trim().to_string(),
            })
        })
        .collect()
}

/// Parse `"80%"` into `80.0`; `None` when the value is not a percentage.
pub fn parse_percent(value: &str) -> CoverResult<Option<f64>> {
    if !value.contains('%') {
        return Ok(None);
    }
    let number = value.replace('%', "");
    let pct: f64 = number
        .trim()
        .parse()
        .map_err(|_| CoverError::malformed("<percent>", value))?;
    if !pct.is_finite() || pct < 0.0 {
        return Err(CoverError::malformed("<percent>", value));
    }
    Ok(Some(pct))
}

/// Parse a unitless `line-height` multiplier.
pub fn parse_line_height(value: &str) -> CoverResult<f64> {
    let v: f64 = value
        .trim()
        .parse()
        .map_err(|_| CoverError::malformed("line-height", value))?;
    if !v.is_finite() {
        return Err(CoverError::malformed("line-height", value));
    }
    Ok(v)
}

fn shadow_regex() -> &'static Regex {
    static SHADOW: OnceLock<Regex> = OnceLock::new();
    SHADOW.get_or_init(|| {
        Regex::new(r"(-?\d+)px\s+(-?\d+)px\s+\d+\s+([a-zA-Z]+\([^)]*\)|[^,]+)").expect("shadow regex is valid")
    })
}

#[cfg(test)]
#[path = "../../tests/unit/style/values.rs"]
mod tests;
