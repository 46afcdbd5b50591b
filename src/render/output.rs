use std::{
    io::{BufWriter, Write as _},
    path::Path,
};

use anyhow::Context as _;
use image::{DynamicImage, ImageEncoder as _, ImageFormat};

use crate::{
    assets::decode::unpremultiply_rgba8_in_place,
    foundation::{
        error::{CoverError, CoverResult},
        math::mul_div255_u16,
    },
    render::{CoverSettings, FrameRGBA},
};

/// Encoding options for [`write_image`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OutputOptions {
    /// Opaque color transparency is flattened onto when the format has no alpha.
    pub flatten_rgba: [u8; 4],
    /// JPEG quality (1..=100).
    pub jpeg_quality: u8,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            flatten_rgba: [0, 0, 0, 255],
            jpeg_quality: 95,
        }
    }
}

impl From<&CoverSettings> for OutputOptions {
    fn from(s: &CoverSettings) -> Self {
        Self {
            flatten_rgba: s.flatten_rgba,
            jpeg_quality: s.jpeg_quality,
        }
    }
}

/// Image format implied by `path`'s extension.
pub fn output_format(path: &Path) -> CoverResult<ImageFormat> {
    ImageFormat::from_path(path).map_err(|e| {
        CoverError::validation(format!(
            "cannot infer image format from '{}': {e}",
            path.display()
        ))
    })
}

/// Whether `format` stores an alpha channel; others are written flattened.
pub fn format_keeps_alpha(format: ImageFormat) -> bool {
    matches!(
        format,
        ImageFormat::Png
            | ImageFormat::WebP
            | ImageFormat::Tiff
            | ImageFormat::Tga
            | ImageFormat::Ico
            | ImageFormat::Bmp
            | ImageFormat::Gif
            | ImageFormat::Qoi
            | ImageFormat::OpenExr
            | ImageFormat::Farbfeld
            | ImageFormat::Avif
    )
}

/// Create `path`'s parent directory if needed.
pub fn ensure_parent_dir(path: &Path) -> CoverResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| CoverError::write(path, e))?;
    }
    Ok(())
}

/// Encode `frame` to `path`, choosing the format from the extension.
///
/// The file is written to a temporary sibling and renamed into place, so a
/// failed write never leaves a truncated image behind.
#[tracing::instrument(skip(frame, opts), fields(width = frame.width, height = frame.height))]
pub fn write_image(frame: &FrameRGBA, path: &Path, opts: &OutputOptions) -> CoverResult<()> {
    let format = output_format(path)?;
    let expected = frame.width as usize * frame.height as usize * 4;
    if frame.data.len() != expected {
        return Err(CoverError::render("frame byte length does not match its size"));
    }
    if !(1..=100).contains(&opts.jpeg_quality) {
        return Err(CoverError::validation("jpeg_quality must be in 1..=100"));
    }

    ensure_parent_dir(path)?;
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::Builder::new()
        .prefix(".coverkit-")
        .tempfile_in(dir)
        .map_err(|e| CoverError::write(path, e))?;

    {
        let mut w = BufWriter::new(tmp.as_file_mut());
        encode(frame, format, opts, &mut w).map_err(|e| CoverError::write(path, e))?;
        w.flush().map_err(|e| CoverError::write(path, e))?;
    }

    tmp.persist(path).map_err(|e| CoverError::write(path, e.error))?;
    tracing::debug!(path = %path.display(), ?format, "image written");
    Ok(())
}

fn encode<W: std::io::Write + std::io::Seek>(
    frame: &FrameRGBA,
    format: ImageFormat,
    opts: &OutputOptions,
    w: &mut W,
) -> anyhow::Result<()> {
    if format_keeps_alpha(format) {
        let mut data = frame.data.clone();
        if frame.premultiplied {
            unpremultiply_rgba8_in_place(&mut data);
        }
        let img = image::RgbaImage::from_raw(frame.width, frame.height, data)
            .context("rgba buffer does not match frame size")?;
        native_buffer(DynamicImage::ImageRgba8(img), format)
            .write_to(w, format)
            .context("encode image")?;
        return Ok(());
    }

    let rgb = flatten_to_rgb8(&frame.data, frame.premultiplied, opts.flatten_rgba);
    let img = image::RgbImage::from_raw(frame.width, frame.height, rgb)
        .context("rgb buffer does not match frame size")?;
    if format == ImageFormat::Jpeg {
        image::codecs::jpeg::JpegEncoder::new_with_quality(w, opts.jpeg_quality)
            .write_image(
                img.as_raw(),
                img.width(),
                img.height(),
                image::ExtendedColorType::Rgb8,
            )
            .context("encode jpeg")?;
    } else {
        native_buffer(DynamicImage::ImageRgb8(img), format)
            .write_to(w, format)
            .context("encode image")?;
    }
    Ok(())
}

/// Convert 8-bit pixels for encoders that only take wider samples.
fn native_buffer(img: DynamicImage, format: ImageFormat) -> DynamicImage {
    match format {
        ImageFormat::Farbfeld => DynamicImage::ImageRgba16(img.to_rgba16()),
        ImageFormat::OpenExr if img.color().has_alpha() => {
            DynamicImage::ImageRgba32F(img.to_rgba32f())
        }
        ImageFormat::OpenExr | ImageFormat::Hdr => DynamicImage::ImageRgb32F(img.to_rgb32f()),
        _ => img,
    }
}

/// Composite RGBA8 over an opaque background, dropping alpha.
pub fn flatten_to_rgb8(src: &[u8], src_is_premul: bool, bg_rgba: [u8; 4]) -> Vec<u8> {
    let bg = [
        u16::from(bg_rgba[0]),
        u16::from(bg_rgba[1]),
        u16::from(bg_rgba[2]),
    ];

    let mut out = Vec::with_capacity(src.len() / 4 * 3);
    for s in src.chunks_exact(4) {
        let a = u16::from(s[3]);
        if a == 255 {
            out.extend_from_slice(&s[..3]);
            continue;
        }
        let inv = 255u16 - a;
        for i in 0..3 {
            let c = if src_is_premul {
                u16::from(s[i])
            } else {
                mul_div255_u16(u16::from(s[i]), a)
            };
            out.push((c + mul_div255_u16(bg[i], inv)).min(255) as u8);
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/output.rs"]
mod tests;
