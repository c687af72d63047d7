use crate::foundation::core::{Rect, has_area};
use crate::foundation::math::mip_extent;
use crate::mip::MAX_MIP_LEVELS;

/// Sampling quality requested for a draw.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum ImageScaleQuality {
    /// Backend default.
    #[default]
    Default,
    /// Nearest neighbour.
    Fast,
    /// Bilinear.
    Normal,
    /// Bilinear over a minified mip level.
    HighQuality,
}

/// Pick the mip level to sample for drawing `src` (source pixels) into `dest`.
///
/// Only [`ImageScaleQuality::HighQuality`] minifies; the level is
/// `floor(log2(min(src.w / dest.w, src.h / dest.h)))` once that ratio reaches 2.
pub fn select_mip_level(
    src: Rect,
    dest: Rect,
    quality: ImageScaleQuality,
    pixel_width: u32,
    pixel_height: u32,
) -> u8 {
    if quality != ImageScaleQuality::HighQuality || !has_area(src) || !has_area(dest) {
        return 0;
    }

    let ratio = (src.width() / dest.width()).min(src.height() / dest.height());
    if !(ratio >= 2.0) || !ratio.is_finite() {
        return 0;
    }

    let wanted = ratio.log2().floor() as u32;
    wanted.min(u32::from(max_useful_level(pixel_width, pixel_height))) as u8
}

/// Last level whose longer axis is still wider than one pixel.
fn max_useful_level(pixel_width: u32, pixel_height: u32) -> u8 {
    let longer = pixel_width.max(pixel_height);
    let mut level = 0u8;
    while usize::from(level) + 1 < MAX_MIP_LEVELS && mip_extent(longer, level + 1) > 1 {
        level += 1;
    }
    level
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/level.rs"]
mod tests;
