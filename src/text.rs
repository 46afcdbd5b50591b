//! Text shaping and measurement on top of Parley.

pub mod engine;
