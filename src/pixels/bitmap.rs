use std::sync::Arc;

use crate::foundation::core::{Color, PixelFormat};
use crate::foundation::error::{PresentError, PresentResult};
use crate::foundation::math::checked_buffer_len;

/// Borrowed, read-only view of a pixel buffer.
#[derive(Clone, Copy, Debug)]
pub struct PixelView<'a> {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Distance in bytes between the starts of consecutive rows.
    pub stride: usize,
    /// Row-major pixel bytes.
    pub bytes: &'a [u8],
}

impl<'a> PixelView<'a> {
    /// `true` when the view has no pixels.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.bytes.is_empty()
    }

    /// The first `width * 4` bytes of row `y`, if the buffer holds them.
    pub fn row(&self, y: u32) -> Option<&'a [u8]> {
        if y >= self.height {
            return None;
        }
        let start = (y as usize).checked_mul(self.stride)?;
        let end = start.checked_add((self.width as usize).checked_mul(4)?)?;
        self.bytes.get(start..end)
    }

    /// Read the BGRA pixel at `(x, y)`.
    ///
    /// Out-of-range coordinates and short buffers yield `None`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize)
            .checked_mul(self.stride)?
            .checked_add((x as usize).checked_mul(4)?)?;
        let px = self.bytes.get(idx..idx.checked_add(4)?)?;
        Some(Color::from_bgra([px[0], px[1], px[2], px[3]]))
    }

    /// `true` when every alpha byte is 255.
    pub fn is_opaque(&self) -> bool {
        (0..self.height).all(|y| {
            self.row(y)
                .is_none_or(|row| row.chunks_exact(4).all(|px| px[3] == 0xFF))
        })
    }
}

/// Immutable decoder output.
///
/// Produced once by an external decoder and never mutated; pixel bytes are shared, so cloning
/// is cheap.
#[derive(Clone, Debug)]
pub struct DecodedBitmap {
    width: u32,
    height: u32,
    format: PixelFormat,
    stride: usize,
    data: Arc<[u8]>,
}

impl DecodedBitmap {
    /// Wrap decoded bytes with a tightly packed stride (`width * bytes_per_pixel`).
    pub fn new(
        width: u32,
        height: u32,
        format: PixelFormat,
        data: impl Into<Arc<[u8]>>,
    ) -> PresentResult<Self> {
        let stride = (width as usize)
            .checked_mul(format.bytes_per_pixel())
            .ok_or_else(|| PresentError::validation("bitmap stride overflow"))?;
        Self::with_stride(width, height, format, stride, data)
    }

    /// Wrap decoded bytes with an explicit row stride.
    pub fn with_stride(
        width: u32,
        height: u32,
        format: PixelFormat,
        stride: usize,
        data: impl Into<Arc<[u8]>>,
    ) -> PresentResult<Self> {
        let data = data.into();
        let row_bytes = checked_buffer_len(width, 1, format.bytes_per_pixel())
            .ok_or_else(|| PresentError::validation("bitmap row size overflow"))?;
        if stride < row_bytes {
            return Err(PresentError::validation(format!(
                "bitmap stride {stride} is smaller than a row ({row_bytes} bytes)"
            )));
        }
        let needed = if height == 0 {
            0
        } else {
            stride
                .checked_mul(height as usize - 1)
                .and_then(|v| v.checked_add(row_bytes))
                .ok_or_else(|| PresentError::validation("bitmap size overflow"))?
        };
        if data.len() < needed {
            return Err(PresentError::validation(format!(
                "bitmap data holds {} bytes, {width}x{height} needs {needed}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            format,
            stride,
            data,
        })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Pixel format reported by the decoder.
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Row stride in bytes.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Raw bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Borrow the bitmap as a [`PixelView`].
    pub fn view(&self) -> PixelView<'_> {
        PixelView {
            width: self.width,
            height: self.height,
            stride: self.stride,
            bytes: &self.data,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pixels/bitmap.rs"]
mod tests;
