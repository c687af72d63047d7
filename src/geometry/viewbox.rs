use crate::foundation::core::{Rect, rect_xywh};

/// Units a [`ViewBox`] rectangle is expressed in.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum ViewBoxUnits {
    /// Source pixels.
    #[default]
    Pixels,
    /// Fractions of the image's native size (`0..1`).
    RelativeToBoundingBox,
}

/// Sub-rectangle of the source image to present.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ViewBox {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
    /// Units of the four components above.
    #[serde(default)]
    pub units: ViewBoxUnits,
}

impl ViewBox {
    /// Viewbox in source pixels.
    pub fn pixels(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            units: ViewBoxUnits::Pixels,
        }
    }

    /// Viewbox in fractions of the native size.
    pub fn relative(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            units: ViewBoxUnits::RelativeToBoundingBox,
        }
    }

    fn is_finite(&self) -> bool {
        [self.x, self.y, self.width, self.height]
            .iter()
            .all(|v| v.is_finite())
    }
}

/// Effective source rectangle for `viewbox` over a `pixel_width x pixel_height` image.
///
/// - No viewbox, non-finite components, or non-positive size: the full native rect.
/// - A negative origin is pulled in to 0 and the size shrinks by the same amount.
/// - An origin past the native bounds, or nothing left after trimming: an empty rect at
///   the origin. Callers must draw nothing for it, which is different from "no viewbox".
pub fn resolve_viewbox(viewbox: Option<&ViewBox>, pixel_width: u32, pixel_height: u32) -> Rect {
    let iw = f64::from(pixel_width);
    let ih = f64::from(pixel_height);
    let full = rect_xywh(0.0, 0.0, iw, ih);

    let Some(vb) = viewbox else {
        return full;
    };
    if !vb.is_finite() {
        return full;
    }

    let (mut x, mut y, mut w, mut h) = (vb.x, vb.y, vb.width, vb.height);
    if vb.units == ViewBoxUnits::RelativeToBoundingBox {
        x *= iw;
        y *= ih;
        w *= iw;
        h *= ih;
    }

    if w <= 0.0 || h <= 0.0 {
        return full;
    }

    if x < 0.0 {
        w += x;
        x = 0.0;
    }
    if y < 0.0 {
        h += y;
        y = 0.0;
    }

    if x > iw || y > ih {
        return Rect::ZERO;
    }

    if x + w > iw {
        w = iw - x;
    }
    if y + h > ih {
        h = ih - y;
    }

    if w <= 0.0 || h <= 0.0 {
        return Rect::ZERO;
    }

    rect_xywh(x, y, w, h)
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/viewbox.rs"]
mod tests;
