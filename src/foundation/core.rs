use serde::{Deserialize, Serialize};

pub use kurbo::{Point, Rect, Vec2};

/// Straight (non-premultiplied) RGBA8 color as written in stylesheets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8 {
    /// Opaque white, the default text color.
    pub const WHITE: Self = Self::opaque(255, 255, 255);
    /// Opaque black.
    pub const BLACK: Self = Self::opaque(0, 0, 0);

    /// Construct a color from all four channels.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Construct a fully opaque color.
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Channels as an array, `[r, g, b, a]`.
    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Measured bounding box of a (possibly multi-line) text run.
///
/// `left`/`top` are the bearing offsets of the box relative to the nominal
/// draw origin; drawing at `(x - left, y - top)` puts the box at `(x, y)`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TextMetrics {
    /// Horizontal inset of the box from the draw origin.
    pub left: f64,
    /// Vertical inset of the box from the draw origin.
    pub top: f64,
    /// Box width in pixels.
    pub width: f64,
    /// Box height in pixels.
    pub height: f64,
}

impl TextMetrics {
    /// Right edge of the box relative to the draw origin.
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    /// Bottom edge of the box relative to the draw origin.
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}
