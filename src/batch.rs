//! Directory-level helpers that sit around cover rendering: overlaying
//! element images onto backgrounds and grouping output files by name.

pub mod grouping;
pub mod overlay;
