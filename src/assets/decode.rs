use std::{path::Path, sync::Arc};

use anyhow::Context;

use crate::{
    assets::PreparedImage,
    foundation::error::{CoverError, CoverResult, ResourceKind},
};

/// Read and decode an image file.
///
/// A file that cannot be read is [`CoverError::ResourceNotFound`]; bytes that do
/// not decode are reported as a wrapped decode error.
pub fn load_image(path: &Path) -> CoverResult<PreparedImage> {
    let bytes = std::fs::read(path).map_err(|err| {
        tracing::debug!(path = %path.display(), %err, "image read failed");
        CoverError::not_found(ResourceKind::Image, path)
    })?;
    decode_image(&bytes).map_err(|err| match err {
        CoverError::Other(e) => CoverError::Other(e.context(format!("'{}'", path.display()))),
        other => other,
    })
}

/// Decode encoded image bytes and convert to premultiplied RGBA8.
pub fn decode_image(bytes: &[u8]) -> CoverResult<PreparedImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    Ok(from_rgba8(dyn_img.to_rgba8()))
}

/// Premultiply a straight-alpha RGBA image.
pub fn from_rgba8(rgba: image::RgbaImage) -> PreparedImage {
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    }
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

/// Convert premultiplied RGBA8 back to straight alpha, in place.
pub fn unpremultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 || a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = ((*c as u16 * 255 + a / 2) / a).min(255) as u8;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
