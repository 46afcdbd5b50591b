use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{
    assets::{
        PreparedImage,
        decode::load_image,
        fonts::{FamilyRoles, FontLibrary, FontTable},
    },
    foundation::error::{CoverError, CoverResult},
    render::{
        CoverSettings, FrameRGBA,
        cpu::CpuCanvas,
        layout::layout_cover,
        output::{OutputOptions, output_format, write_image},
        paint::paint_cover,
    },
    style::sheet::StyleSheet,
};

/// Render `texts` over `image` using `sheet`, returning premultiplied pixels.
#[tracing::instrument(
    skip_all,
    fields(width = image.width, height = image.height, lines = texts.len())
)]
pub fn render_cover<S: AsRef<str>>(
    image: &PreparedImage,
    texts: &[S],
    sheet: &StyleSheet,
    fonts: &FontLibrary,
    roles: &FamilyRoles,
    settings: &CoverSettings,
) -> CoverResult<FrameRGBA> {
    settings.validate()?;
    let mut canvas = CpuCanvas::new(image)?;
    let layout = layout_cover(
        &mut canvas,
        image.width,
        image.height,
        texts,
        sheet,
        fonts,
        roles,
        settings,
    )?;
    paint_cover(&mut canvas, &layout)?;
    Ok(canvas.finish())
}

/// Everything needed to turn one source image into one cover file.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CoverJob {
    /// Source image.
    pub image_path: PathBuf,
    /// Destination; the extension selects the format.
    pub output_path: PathBuf,
    /// One entry per line, top to bottom.
    pub texts: Vec<String>,
    /// CSS file with `.text-block p` and `p.lineN` rules.
    pub style_path: PathBuf,
    /// Font files per role.
    pub fonts: FontTable,
    /// `font-family` name to role table.
    pub roles: FamilyRoles,
    /// Layout and output settings.
    pub settings: CoverSettings,
}

impl CoverJob {
    /// Load inputs, render and write the output file.
    #[tracing::instrument(skip(self), fields(image = %self.image_path.display(), output = %self.output_path.display()))]
    pub fn run(&self) -> CoverResult<()> {
        self.settings.validate()?;
        output_format(&self.output_path)?;

        let sheet = StyleSheet::from_path(&self.style_path)?;
        if sheet.is_empty() {
            tracing::warn!(path = %self.style_path.display(), "stylesheet has no recognized rules");
        }
        let image = load_image(&self.image_path)?;
        let fonts = FontLibrary::load(&self.fonts)?;

        let frame = render_cover(
            &image,
            &self.texts,
            &sheet,
            &fonts,
            &self.roles,
            &self.settings,
        )?;
        write_image(
            &frame,
            &self.output_path,
            &OutputOptions::from(&self.settings),
        )?;
        tracing::info!(output = %self.output_path.display(), "cover written");
        Ok(())
    }
}

/// One-call form of [`CoverJob::run`] with default family roles and settings.
pub fn render_cover_to_path(
    image_path: &Path,
    output_path: &Path,
    texts: &[String],
    style_path: &Path,
    fonts: &FontTable,
) -> CoverResult<()> {
    if texts.is_empty() {
        tracing::debug!("no text lines; output is the source image re-encoded");
    }
    CoverJob {
        image_path: image_path.to_path_buf(),
        output_path: output_path.to_path_buf(),
        texts: texts.to_vec(),
        style_path: style_path.to_path_buf(),
        fonts: fonts.clone(),
        roles: FamilyRoles::default(),
        settings: CoverSettings::default(),
    }
    .run()
    .map_err(|err| match err {
        CoverError::Other(e) => CoverError::Other(e.context("render cover")),
        other => other,
    })
}
