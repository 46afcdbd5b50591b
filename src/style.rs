//! Cover stylesheet parsing and per-line cascade.

pub mod color;
pub mod line;
pub mod sheet;
pub mod values;
