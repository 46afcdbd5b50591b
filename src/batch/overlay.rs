use std::{
    path::{Path, PathBuf},
    str::FromStr,
};

use anyhow::Context as _;

use crate::{
    assets::decode::from_rgba8,
    foundation::{
        error::{CoverError, CoverResult, ResourceKind},
        math::{add_sat_u8, mul_div255_u8},
    },
    render::{
        FrameRGBA,
        output::{OutputOptions, write_image},
    },
};

/// Extensions accepted as overlay backgrounds.
pub const BACKGROUND_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "gif"];
/// Extensions accepted as overlay elements.
pub const ELEMENT_EXTENSIONS: &[&str] = &["png"];

/// Fraction of the fitted size used when an element is larger than its background.
const OVERSIZE_SHRINK: f64 = 0.8;

/// Where an element is placed on its background.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OverlayPosition {
    /// Centered on both axes.
    #[default]
    Center,
    /// Flush with the top-left corner.
    TopLeft,
    /// Flush with the top-right corner.
    TopRight,
    /// Flush with the bottom-left corner.
    BottomLeft,
    /// Flush with the bottom-right corner.
    BottomRight,
    /// Top-left corner of the element at `(x, y)`; may lie partly outside.
    At(i64, i64),
}

impl FromStr for OverlayPosition {
    type Err = CoverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s {
            "center" => return Ok(Self::Center),
            "top-left" => return Ok(Self::TopLeft),
            "top-right" => return Ok(Self::TopRight),
            "bottom-left" => return Ok(Self::BottomLeft),
            "bottom-right" => return Ok(Self::BottomRight),
            _ => {}
        }
        let (x, y) = s.split_once(',').ok_or_else(|| {
            CoverError::validation(format!(
                "unknown position '{s}' (expected center, top-left, top-right, bottom-left, bottom-right or x,y)"
            ))
        })?;
        let parse = |v: &str| {
            v.trim()
                .parse::<i64>()
                .map_err(|_| CoverError::malformed("position", s))
        };
        Ok(Self::At(parse(x)?, parse(y)?))
    }
}

impl OverlayPosition {
    /// Parse `s`, falling back to [`OverlayPosition::Center`] with a warning.
    pub fn parse_or_center(s: &str) -> Self {
        s.parse().unwrap_or_else(|err| {
            tracing::warn!(%err, "using centered overlay position");
            Self::Center
        })
    }

    /// Top-left corner for an element of `elem` size on a background of `bg` size.
    pub fn resolve(self, bg: (u32, u32), elem: (u32, u32)) -> (i64, i64) {
        let (bw, bh) = (i64::from(bg.0), i64::from(bg.1));
        let (ew, eh) = (i64::from(elem.0), i64::from(elem.1));
        match self {
            Self::Center => ((bw - ew).div_euclid(2), (bh - eh).div_euclid(2)),
            Self::TopLeft => (0, 0),
            Self::TopRight => (bw - ew, 0),
            Self::BottomLeft => (0, bh - eh),
            Self::BottomRight => (bw - ew, bh - eh),
            Self::At(x, y) => (x, y),
        }
    }
}

/// Parameters shared by every overlay in a batch.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OverlayOptions {
    /// Placement of the element.
    pub position: OverlayPosition,
    /// Multiplier on the element's alpha, `0.0..=1.0`.
    pub opacity: f32,
    /// Resize factor applied to the element before fitting.
    pub scale: f64,
}

impl Default for OverlayOptions {
    fn default() -> Self {
        Self {
            position: OverlayPosition::Center,
            opacity: 1.0,
            scale: 1.0,
        }
    }
}

impl OverlayOptions {
    fn validate(&self) -> CoverResult<()> {
        if !(0.0..=1.0).contains(&self.opacity) {
            return Err(CoverError::validation("opacity must be in 0.0..=1.0"));
        }
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(CoverError::validation("scale must be finite and > 0"));
        }
        Ok(())
    }
}

/// Element size after the user scale and the oversize fit.
pub fn fitted_size(bg: (u32, u32), elem: (u32, u32), scale: f64) -> (u32, u32) {
    let scaled = |v: u32, f: f64| ((f64::from(v) * f).floor() as u32).max(1);
    let (mut w, mut h) = if scale == 1.0 {
        elem
    } else {
        (scaled(elem.0, scale), scaled(elem.1, scale))
    };
    if w > bg.0 || h > bg.1 {
        let fit = (f64::from(bg.0) / f64::from(w)).min(f64::from(bg.1) / f64::from(h));
        w = scaled(w, fit * OVERSIZE_SHRINK);
        h = scaled(h, fit * OVERSIZE_SHRINK);
    }
    (w, h)
}

/// Composite `element` onto `background`, returning premultiplied pixels.
pub fn overlay(
    background: &image::RgbaImage,
    element: &image::RgbaImage,
    opts: &OverlayOptions,
) -> CoverResult<FrameRGBA> {
    opts.validate()?;
    let bg_size = background.dimensions();
    if bg_size.0 == 0 || bg_size.1 == 0 || element.width() == 0 || element.height() == 0 {
        return Err(CoverError::validation("overlay images must be non-empty"));
    }

    let (ew, eh) = fitted_size(bg_size, element.dimensions(), opts.scale);
    let mut elem = if (ew, eh) == element.dimensions() {
        element.clone()
    } else {
        image::imageops::resize(element, ew, eh, image::imageops::FilterType::Lanczos3)
    };
    if opts.opacity < 1.0 {
        for px in elem.pixels_mut() {
            px.0[3] = (f32::from(px.0[3]) * opts.opacity) as u8;
        }
    }

    let mut dst = from_rgba8(background.clone());
    let src = from_rgba8(elem);
    let (ox, oy) = opts.position.resolve(bg_size, (ew, eh));

    let dst_data = std::sync::Arc::make_mut(&mut dst.rgba8_premul);
    let (bw, bh) = (i64::from(bg_size.0), i64::from(bg_size.1));
    for sy in 0..i64::from(eh) {
        let y = oy + sy;
        if !(0..bh).contains(&y) {
            continue;
        }
        for sx in 0..i64::from(ew) {
            let x = ox + sx;
            if !(0..bw).contains(&x) {
                continue;
            }
            let si = ((sy * i64::from(ew) + sx) * 4) as usize;
            let di = ((y * bw + x) * 4) as usize;
            let s = [
                src.rgba8_premul[si],
                src.rgba8_premul[si + 1],
                src.rgba8_premul[si + 2],
                src.rgba8_premul[si + 3],
            ];
            let d = [
                dst_data[di],
                dst_data[di + 1],
                dst_data[di + 2],
                dst_data[di + 3],
            ];
            dst_data[di..di + 4].copy_from_slice(&over(d, s));
        }
    }

    Ok(FrameRGBA {
        width: dst.width,
        height: dst.height,
        data: dst.rgba8_premul.as_ref().clone(),
        premultiplied: true,
    })
}

/// Premultiplied source-over.
fn over(dst: [u8; 4], src: [u8; 4]) -> [u8; 4] {
    if src[3] == 0 {
        return dst;
    }
    let inv = 255u16 - u16::from(src[3]);
    let mut out = [0u8; 4];
    for i in 0..4 {
        out[i] = add_sat_u8(src[i], mul_div255_u8(u16::from(dst[i]), inv));
    }
    out
}

/// Outcome of [`overlay_directory`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OverlaySummary {
    /// Background x element pairs attempted.
    pub total: usize,
    /// Files written.
    pub written: Vec<PathBuf>,
    /// Pairs that failed, with the error message.
    pub failed: Vec<(PathBuf, String)>,
}

/// Overlay every element onto every background, writing `{bg}_with_{element}.jpg`.
///
/// A pair that fails is logged and counted; the batch keeps going.
#[tracing::instrument(skip(opts))]
pub fn overlay_directory(
    background_dir: &Path,
    element_dir: &Path,
    output_dir: &Path,
    opts: &OverlayOptions,
) -> CoverResult<OverlaySummary> {
    opts.validate()?;
    let backgrounds = list_with_extensions(background_dir, BACKGROUND_EXTENSIONS)?;
    let elements = list_with_extensions(element_dir, ELEMENT_EXTENSIONS)?;
    if backgrounds.is_empty() {
        return Err(CoverError::validation(format!(
            "no background images in '{}'",
            background_dir.display()
        )));
    }
    if elements.is_empty() {
        return Err(CoverError::validation(format!(
            "no PNG elements in '{}'",
            element_dir.display()
        )));
    }
    tracing::info!(
        backgrounds = backgrounds.len(),
        elements = elements.len(),
        "overlaying"
    );

    let mut summary = OverlaySummary::default();
    for bg_path in &backgrounds {
        for elem_path in &elements {
            summary.total += 1;
            let out = output_dir.join(format!("{}_with_{}.jpg", stem(bg_path), stem(elem_path)));
            match overlay_files(bg_path, elem_path, &out, opts) {
                Ok(()) => {
                    tracing::debug!(output = %out.display(), "overlay written");
                    summary.written.push(out);
                }
                Err(err) => {
                    tracing::warn!(background = %bg_path.display(), element = %elem_path.display(), %err, "overlay failed");
                    summary.failed.push((out, err.to_string()));
                }
            }
        }
    }
    tracing::info!(
        written = summary.written.len(),
        total = summary.total,
        "overlay batch finished"
    );
    Ok(summary)
}

fn overlay_files(bg: &Path, elem: &Path, out: &Path, opts: &OverlayOptions) -> CoverResult<()> {
    let open = |p: &Path| -> CoverResult<image::RgbaImage> {
        Ok(image::open(p)
            .with_context(|| format!("decode '{}'", p.display()))?
            .to_rgba8())
    };
    let frame = overlay(&open(bg)?, &open(elem)?, opts)?;
    write_image(&frame, out, &OutputOptions::default())
}

fn list_with_extensions(dir: &Path, extensions: &[&str]) -> CoverResult<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(CoverError::not_found(ResourceKind::Directory, dir));
    }
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir).with_context(|| format!("read dir '{}'", dir.display()))? {
        let path = entry.context("read dir entry")?.path();
        let matches = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| extensions.iter().any(|x| e.eq_ignore_ascii_case(x)));
        if matches && path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

fn stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
#[path = "../../tests/unit/batch/overlay.rs"]
mod tests;
