use crate::foundation::core::{Rect, has_area, rect_xywh};

/// How the source rectangle is mapped into the destination bounds.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum Stretch {
    /// Stretch to the bounds, ignoring aspect ratio.
    Fill,
    /// Largest aspect-preserving fit inside the bounds.
    #[default]
    Uniform,
    /// Cover the bounds, cropping the source to keep its aspect ratio.
    UniformToFill,
    /// Native size, anchored by the alignment.
    None,
}

/// Horizontal anchor within the bounds.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum AlignX {
    /// Left edge.
    Start,
    /// Centered.
    #[default]
    Center,
    /// Right edge.
    End,
}

/// Vertical anchor within the bounds.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum AlignY {
    /// Top edge.
    Start,
    /// Centered.
    #[default]
    Center,
    /// Bottom edge.
    End,
}

impl AlignX {
    /// Fraction of the free space placed before the image.
    pub fn anchor(self) -> f64 {
        match self {
            Self::Start => 0.0,
            Self::Center => 0.5,
            Self::End => 1.0,
        }
    }
}

impl AlignY {
    /// Fraction of the free space placed above the image.
    pub fn anchor(self) -> f64 {
        match self {
            Self::Start => 0.0,
            Self::Center => 0.5,
            Self::End => 1.0,
        }
    }
}

/// Destination and source rectangles for one draw.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeometryFit {
    /// Where the image lands, in bounds coordinates.
    pub dest: Rect,
    /// Which part of the source is sampled, in source pixels.
    pub src: Rect,
}

impl GeometryFit {
    /// `true` when either rectangle has no area; such fits draw and hit nothing.
    pub fn is_empty(&self) -> bool {
        !(has_area(self.dest) && has_area(self.src))
    }
}

/// Map `source` into `bounds` under `stretch` and the alignment anchors.
///
/// Degenerate inputs produce a zero-area `dest` at the bounds origin. `None` may overflow the
/// bounds; clipping is the caller's job.
pub fn resolve(
    source: Rect,
    bounds: Rect,
    stretch: Stretch,
    align_x: AlignX,
    align_y: AlignY,
) -> GeometryFit {
    let sw = source.width().max(0.0);
    let sh = source.height().max(0.0);
    let (bw, bh) = (bounds.width(), bounds.height());

    if !(sw > 0.0 && sh > 0.0 && bw > 0.0 && bh > 0.0) {
        return GeometryFit {
            dest: rect_xywh(bounds.x0, bounds.y0, 0.0, 0.0),
            src: source,
        };
    }

    let anchored = |dw: f64, dh: f64| {
        rect_xywh(
            bounds.x0 + (bw - dw) * align_x.anchor(),
            bounds.y0 + (bh - dh) * align_y.anchor(),
            dw,
            dh,
        )
    };

    match stretch {
        Stretch::Fill => GeometryFit {
            dest: bounds,
            src: source,
        },
        Stretch::Uniform => {
            let scale = (bw / sw).min(bh / sh);
            GeometryFit {
                dest: anchored(sw * scale, sh * scale),
                src: source,
            }
        }
        Stretch::UniformToFill => {
            let bounds_aspect = bw / bh;
            let src_aspect = sw / sh;
            let src = if bounds_aspect > src_aspect {
                let crop_h = sw / bounds_aspect;
                rect_xywh(source.x0, source.y0 + (sh - crop_h) / 2.0, sw, crop_h)
            } else if bounds_aspect < src_aspect {
                let crop_w = sh * bounds_aspect;
                rect_xywh(source.x0 + (sw - crop_w) / 2.0, source.y0, crop_w, sh)
            } else {
                source
            };
            GeometryFit { dest: bounds, src }
        }
        Stretch::None => GeometryFit {
            dest: anchored(sw, sh),
            src: source,
        },
    }
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/fit.rs"]
mod tests;
