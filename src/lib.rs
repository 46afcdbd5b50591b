//! Coverkit renders styled text covers: lines of text drawn over a source
//! image, styled by a small CSS subset.
//!
//! # Pipeline overview
//!
//! 1. **Style**: a stylesheet with a `.text-block p` base rule and `p.line1`..`p.line3`
//!    overrides is parsed into a [`StyleSheet`]; each line resolves to an
//!    [`EffectiveLineStyle`] and then to a typed [`ResolvedLineStyle`].
//! 2. **Layout**: [`layout_cover`] scales every pixel value by `image_width / 720`,
//!    wraps text one character at a time, centers each line and stacks lines
//!    vertically, producing a [`CoverLayout`].
//! 3. **Paint**: [`paint_cover`] draws each line's background block, its shadows and
//!    then the text onto a [`CoverCanvas`]; [`CpuCanvas`] is the vello_cpu backend.
//! 4. **Write**: [`write_image`] picks the format from the file extension, flattening
//!    transparency for formats without alpha, and replaces the target atomically.
//!
//! [`CoverJob`] runs all four steps from file paths. The `batch` helpers overlay
//! element images onto backgrounds ([`overlay_directory`]) and group output files
//! by name ([`scan_directory`]).
//!
//! Malformed style values never fail a render: they log a `tracing` warning and
//! fall back to defaults. Missing inputs and write failures are [`CoverError`]s.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod batch;
mod foundation;
mod render;
mod style;
mod text;

pub use assets::PreparedImage;
pub use assets::decode::{decode_image, from_rgba8, load_image, unpremultiply_rgba8_in_place};
pub use assets::fonts::{
    FamilyRoles, FontLibrary, FontOrigin, FontRole, FontTable, LoadedFont, system_default_font,
};
pub use batch::grouping::{
    DEFAULT_MARKER, Groups, group_by_marker, scan_directory, write_groups_json,
};
pub use batch::overlay::{
    BACKGROUND_EXTENSIONS, ELEMENT_EXTENSIONS, OverlayOptions, OverlayPosition, OverlaySummary,
    fitted_size, overlay, overlay_directory,
};
pub use foundation::core::{Point, Rect, Rgba8, TextMetrics, Vec2};
pub use foundation::error::{CoverError, CoverResult, ResourceKind};
pub use render::cpu::CpuCanvas;
pub use render::layout::{
    Backdrop, CoverLayout, FrameGeometry, LayoutCursor, PlacedLine, ShadowDraw, TextMeasure,
    layout_cover, place_line, wrap_chars,
};
pub use render::output::{
    OutputOptions, ensure_parent_dir, flatten_to_rgb8, format_keeps_alpha, output_format,
    write_image,
};
pub use render::paint::{CoverCanvas, paint_cover};
pub use render::pipeline::{CoverJob, render_cover, render_cover_to_path};
pub use render::{CoverSettings, FrameRGBA};
pub use style::color::parse_css_color;
pub use style::line::{ResolvedLineStyle, ResolvedShadow, margin_top_px};
pub use style::sheet::{
    BASE_SELECTOR, EffectiveLineStyle, LINE_SELECTOR_COUNT, StyleRule, StyleSheet,
    strip_comments,
};
pub use style::values::{
    ShadowSpec, parse_line_height, parse_percent, parse_pixels, parse_shadow_list,
};
pub use text::engine::{TextBrushRgba8, TextLayoutEngine};
