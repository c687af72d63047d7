//! Lazily built chain of box-filtered minification levels.
//!
//! Level 0 is a tightly packed, premultiplied snapshot of the source. Level `L` is derived
//! from level `L - 1` by averaging 2x2 blocks; edge blocks of odd-sized levels average the
//! 1 or 2 samples that exist instead of padding.

use rayon::prelude::*;
use smallvec::SmallVec;

use crate::blend::Blender;
use crate::foundation::error::{PresentError, PresentResult};
use crate::foundation::math::{checked_buffer_len, mip_extent};
use crate::pixels::bitmap::PixelView;
use crate::pixels::source::PixelBufferSource;

/// Upper bound on levels per chain; a 65536-pixel axis reaches 1 pixel at level 16.
pub const MAX_MIP_LEVELS: usize = 16;

const PARALLEL_MIN_PIXELS: usize = 64 * 1024;

/// One premultiplied BGRA level, rows tightly packed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MipBuffer {
    width: u32,
    height: u32,
    bytes: Vec<u8>,
}

impl MipBuffer {
    fn empty() -> Self {
        Self {
            width: 0,
            height: 0,
            bytes: Vec::new(),
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row stride in bytes.
    pub fn stride(&self) -> usize {
        self.width as usize * 4
    }

    /// Premultiplied BGRA bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// `true` when the level has no pixels.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.bytes.is_empty()
    }

    /// Borrow as a [`PixelView`].
    pub fn view(&self) -> PixelView<'_> {
        PixelView {
            width: self.width,
            height: self.height,
            stride: self.stride(),
            bytes: &self.bytes,
        }
    }
}

/// Dimensions of `level` for a `width x height` source: `ceil(w / 2^L) x ceil(h / 2^L)`.
pub fn mip_dimensions(width: u32, height: u32, level: u8) -> (u32, u32) {
    (mip_extent(width, level), mip_extent(height, level))
}

/// Mip levels owned by one logical image. Levels are appended, never rebuilt in place.
#[derive(Debug, Default)]
pub struct MipChain {
    levels: SmallVec<[MipBuffer; 4]>,
}

impl MipChain {
    /// Empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of levels currently built.
    pub fn built_levels(&self) -> usize {
        self.levels.len()
    }

    /// A level, if already built.
    pub fn level(&self, level: u8) -> Option<&MipBuffer> {
        self.levels.get(usize::from(level))
    }

    /// Drop every level; the next `ensure_level` snapshots the source again.
    pub fn clear(&mut self) {
        self.levels.clear();
    }

    /// Build levels up to `target` and return it.
    ///
    /// Returns `None` when the source has no pixels. The source lock is held only while its
    /// rows are copied into level 0.
    #[tracing::instrument(level = "debug", skip(self, source, blender), fields(built = self.levels.len()))]
    pub fn ensure_level(
        &mut self,
        source: &dyn PixelBufferSource,
        blender: &Blender,
        target: u8,
    ) -> PresentResult<Option<&MipBuffer>> {
        if usize::from(target) >= MAX_MIP_LEVELS {
            return Err(PresentError::validation(format!(
                "mip level {target} exceeds the maximum of {}",
                MAX_MIP_LEVELS - 1
            )));
        }

        if self.levels.is_empty() {
            let base = {
                let lock = source.lock();
                snapshot_premultiplied(lock.view(), blender)?
            };
            self.levels.push(base);
        }

        if self.levels[0].is_empty() {
            return Ok(None);
        }

        while self.levels.len() <= usize::from(target) {
            let prev = &self.levels[self.levels.len() - 1];
            let next = downsample_2x(prev);
            tracing::debug!(
                level = self.levels.len(),
                width = next.width,
                height = next.height,
                "built mip level"
            );
            self.levels.push(next);
        }

        Ok(self.levels.get(usize::from(target)))
    }
}

/// Copy `view` into a packed buffer, premultiplying only if some pixel is not opaque.
pub(crate) fn snapshot_premultiplied(
    view: PixelView<'_>,
    blender: &Blender,
) -> PresentResult<MipBuffer> {
    if view.is_empty() {
        return Ok(MipBuffer::empty());
    }
    let len = checked_buffer_len(view.width, view.height, 4)
        .ok_or_else(|| PresentError::validation("mip level size overflow"))?;
    let row_bytes = view.width as usize * 4;
    let opaque = view.is_opaque();

    let mut bytes = vec![0u8; len];
    for (y, dst) in bytes.chunks_exact_mut(row_bytes).enumerate() {
        let src = view.row(y as u32).ok_or_else(|| {
            PresentError::validation(format!(
                "pixel source row {y} is shorter than its declared width"
            ))
        })?;
        if opaque {
            dst.copy_from_slice(src);
        } else {
            blender.premultiply_into(src, dst);
        }
    }

    Ok(MipBuffer {
        width: view.width,
        height: view.height,
        bytes,
    })
}

/// Average 2x2 blocks of `src` into a level of `ceil(w/2) x ceil(h/2)`.
pub(crate) fn downsample_2x(src: &MipBuffer) -> MipBuffer {
    let (dst_w, dst_h) = mip_dimensions(src.width, src.height, 1);
    let dst_row = dst_w as usize * 4;
    let mut bytes = vec![0u8; dst_row * dst_h as usize];

    let fill = |(y, row): (usize, &mut [u8])| downsample_row(src, y, row);
    if (dst_w as usize) * (dst_h as usize) >= PARALLEL_MIN_PIXELS {
        bytes.par_chunks_exact_mut(dst_row).enumerate().for_each(fill);
    } else {
        bytes.chunks_exact_mut(dst_row).enumerate().for_each(fill);
    }

    MipBuffer {
        width: dst_w,
        height: dst_h,
        bytes,
    }
}

fn downsample_row(src: &MipBuffer, y: usize, out: &mut [u8]) {
    let src_w = src.width as usize;
    let src_h = src.height as usize;
    let sy = y * 2;
    let has_y1 = sy + 1 < src_h;

    for (x, px) in out.chunks_exact_mut(4).enumerate() {
        let sx = x * 2;
        let has_x1 = sx + 1 < src_w;

        let mut sum = [0u32; 4];
        let mut count = 0u32;
        let mut add = |xx: usize, yy: usize| {
            let i = (yy * src_w + xx) * 4;
            for (ch, acc) in sum.iter_mut().enumerate() {
                *acc += u32::from(src.bytes[i + ch]);
            }
            count += 1;
        };

        add(sx, sy);
        if has_x1 {
            add(sx + 1, sy);
        }
        if has_y1 {
            add(sx, sy + 1);
            if has_x1 {
                add(sx + 1, sy + 1);
            }
        }

        for (c, s) in px.iter_mut().zip(sum) {
            *c = ((s + count / 2) / count) as u8;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/mip/mod.rs"]
mod tests;
