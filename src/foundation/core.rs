pub use kurbo::{Point, Rect, Size};

/// Pixel layouts a decoder may hand to the pipeline.
///
/// Only [`PixelFormat::Bgra8`] can be presented; the others exist so decoders can report what
/// they produced and be rejected at construction instead of at draw time.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum PixelFormat {
    /// 32-bit B,G,R,A byte order, straight alpha.
    #[default]
    Bgra8,
    /// 32-bit R,G,B,A byte order, straight alpha.
    Rgba8,
    /// 8-bit luminance.
    Gray8,
}

impl PixelFormat {
    /// Bytes per pixel for this format.
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Bgra8 | Self::Rgba8 => 4,
            Self::Gray8 => 1,
        }
    }
}

/// Straight-alpha 8-bit color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Color {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);

    /// Build a color from straight-alpha components.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Build an opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    /// Read a color from 4 bytes in B,G,R,A order.
    pub fn from_bgra(px: [u8; 4]) -> Self {
        Self::rgba(px[2], px[1], px[0], px[3])
    }

    /// Bytes in B,G,R,A order.
    pub fn to_bgra(self) -> [u8; 4] {
        [self.b, self.g, self.r, self.a]
    }
}

/// Build a rectangle from origin and size, the way layout code describes boxes.
pub fn rect_xywh(x: f64, y: f64, w: f64, h: f64) -> Rect {
    Rect::new(x, y, x + w, y + h)
}

/// `true` when both dimensions are strictly positive.
///
/// NaN dimensions count as empty.
pub fn has_area(r: Rect) -> bool {
    r.width() > 0.0 && r.height() > 0.0
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
