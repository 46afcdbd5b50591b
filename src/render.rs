//! Cover layout, rasterization and output encoding.

use std::path::Path;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::foundation::error::{CoverError, CoverResult};

pub mod cpu;
pub mod layout;
pub mod output;
pub mod paint;
pub mod pipeline;

/// Rendered pixels, row-major RGBA8.
#[derive(Clone, Debug)]
pub struct FrameRGBA {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// `width * height * 4` bytes.
    pub data: Vec<u8>,
    /// Whether color channels are premultiplied by alpha.
    pub premultiplied: bool,
}

/// Layout constants and output options for one cover render.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoverSettings {
    /// Design width that stylesheet pixel values are authored against.
    pub reference_width: f64,
    /// Distance above the vertical center where the first line starts, in reference pixels.
    pub initial_offset_px: f64,
    /// `font-size` used when the style has none (or an unreadable one).
    pub default_font_size_px: f64,
    /// `line-height` multiplier used when the style has none.
    pub default_line_height: f64,
    /// `color` used when the style has none.
    pub default_color: String,
    /// Padding around a line's background block, in reference pixels.
    pub background_padding_px: f64,
    /// Opaque background that transparency is flattened onto for alpha-less formats.
    pub flatten_rgba: [u8; 4],
    /// JPEG encoder quality (1..=100).
    pub jpeg_quality: u8,
}

impl Default for CoverSettings {
    fn default() -> Self {
        Self {
            reference_width: 720.0,
            initial_offset_px: 150.0,
            default_font_size_px: 80.0,
            default_line_height: 1.3,
            default_color: "white".to_string(),
            background_padding_px: 20.0,
            flatten_rgba: [0, 0, 0, 255],
            jpeg_quality: 95,
        }
    }
}

impl CoverSettings {
    /// Load settings from a JSON file; missing fields keep their defaults.
    pub fn from_path(path: &Path) -> CoverResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read settings '{}'", path.display()))?;
        let settings: Self = serde_json::from_str(&text)
            .with_context(|| format!("parse settings JSON '{}'", path.display()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject values that would make layout meaningless.
    pub fn validate(&self) -> CoverResult<()> {
        if !self.reference_width.is_finite() || self.reference_width <= 0.0 {
            return Err(CoverError::validation("reference_width must be finite and > 0"));
        }
        if !self.default_font_size_px.is_finite() || self.default_font_size_px <= 0.0 {
            return Err(CoverError::validation(
                "default_font_size_px must be finite and > 0",
            ));
        }
        if !self.default_line_height.is_finite() {
            return Err(CoverError::validation("default_line_height must be finite"));
        }
        if !self.initial_offset_px.is_finite() || !self.background_padding_px.is_finite() {
            return Err(CoverError::validation(
                "initial_offset_px and background_padding_px must be finite",
            ));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(CoverError::validation("jpeg_quality must be in 1..=100"));
        }
        Ok(())
    }
}
