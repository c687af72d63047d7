use std::ops::Deref;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};

use crate::foundation::core::PixelFormat;
use crate::foundation::error::{PresentError, PresentResult};
use crate::foundation::math::checked_buffer_len;
use crate::pixels::bitmap::{DecodedBitmap, PixelView};

/// Single source of truth for what an image's pixels currently look like.
///
/// Dimensions and format are fixed at construction. Content may change, and every change
/// bumps [`PixelBufferSource::version`]. Consumers poll the version once per frame and compare
/// it with the value they last observed.
pub trait PixelBufferSource: Send + Sync {
    /// Width in pixels.
    fn pixel_width(&self) -> u32;
    /// Height in pixels.
    fn pixel_height(&self) -> u32;
    /// Format of the bytes yielded by [`PixelBufferSource::lock`].
    fn pixel_format(&self) -> PixelFormat;
    /// Content version. Never decreases; readable without taking the content lock.
    fn version(&self) -> u64;
    /// Take a short-lived read lock and return a stable snapshot view.
    fn lock(&self) -> PixelLock<'_>;
}

enum LockedBytes<'a> {
    Borrowed(&'a [u8]),
    Guarded(RwLockReadGuard<'a, Vec<u8>>),
}

/// Scoped read lock over a source's pixels. The lock is released when this value drops.
pub struct PixelLock<'a> {
    width: u32,
    height: u32,
    stride: usize,
    bytes: LockedBytes<'a>,
}

impl PixelLock<'_> {
    /// Snapshot view for the duration of the lock.
    pub fn view(&self) -> PixelView<'_> {
        let bytes: &[u8] = match &self.bytes {
            LockedBytes::Borrowed(b) => b,
            LockedBytes::Guarded(g) => g.as_slice(),
        };
        PixelView {
            width: self.width,
            height: self.height,
            stride: self.stride,
            bytes,
        }
    }
}

impl std::fmt::Debug for PixelLock<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelLock")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("stride", &self.stride)
            .finish()
    }
}

/// Pixel source backed by an immutable [`DecodedBitmap`]. Its version is always 0.
#[derive(Clone, Debug)]
pub struct StaticPixelSource {
    bitmap: DecodedBitmap,
}

impl StaticPixelSource {
    /// Wrap a decoded bitmap.
    pub fn new(bitmap: DecodedBitmap) -> Self {
        Self { bitmap }
    }

    /// The wrapped bitmap.
    pub fn bitmap(&self) -> &DecodedBitmap {
        &self.bitmap
    }
}

impl PixelBufferSource for StaticPixelSource {
    fn pixel_width(&self) -> u32 {
        self.bitmap.width()
    }

    fn pixel_height(&self) -> u32 {
        self.bitmap.height()
    }

    fn pixel_format(&self) -> PixelFormat {
        self.bitmap.format()
    }

    fn version(&self) -> u64 {
        0
    }

    fn lock(&self) -> PixelLock<'_> {
        PixelLock {
            width: self.bitmap.width(),
            height: self.bitmap.height(),
            stride: self.bitmap.stride(),
            bytes: LockedBytes::Borrowed(self.bitmap.data()),
        }
    }
}

/// Mutable view handed to [`LivePixelSource::write`] callbacks.
#[derive(Debug)]
pub struct PixelViewMut<'a> {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Row stride in bytes (always `width * 4`).
    pub stride: usize,
    /// Straight-alpha BGRA bytes.
    pub bytes: &'a mut [u8],
}

/// Writeable BGRA8 bitmap that a producer thread may update while frames are rendered.
///
/// The version is bumped while the write lock is still held, so a reader that observes a
/// version and then locks never sees content older than that version.
#[derive(Debug)]
pub struct LivePixelSource {
    width: u32,
    height: u32,
    pixels: RwLock<Vec<u8>>,
    version: AtomicU64,
}

impl LivePixelSource {
    /// Allocate a transparent `width x height` buffer at version 0.
    pub fn new(width: u32, height: u32) -> PresentResult<Self> {
        let len = checked_buffer_len(width, height, 4)
            .ok_or_else(|| PresentError::validation("live bitmap size overflow"))?;
        Ok(Self {
            width,
            height,
            pixels: RwLock::new(vec![0; len]),
            version: AtomicU64::new(0),
        })
    }

    /// Seed a live source with a decoded BGRA8 bitmap's content.
    pub fn from_bitmap(bitmap: &DecodedBitmap) -> PresentResult<Self> {
        if bitmap.format() != PixelFormat::Bgra8 {
            return Err(PresentError::UnsupportedFormat(bitmap.format()));
        }
        let out = Self::new(bitmap.width(), bitmap.height())?;
        out.write(|dst| {
            let src = bitmap.view();
            let row_bytes = dst.stride;
            for (y, dst_row) in dst.bytes.chunks_exact_mut(row_bytes.max(1)).enumerate() {
                if let Some(src_row) = src.row(y as u32) {
                    dst_row.copy_from_slice(src_row);
                }
            }
        });
        Ok(out)
    }

    /// Mutate the pixels under the exclusive lock, then publish a new version.
    pub fn write<R>(&self, f: impl FnOnce(PixelViewMut<'_>) -> R) -> R {
        let mut guard = self.pixels.write().unwrap_or_else(PoisonError::into_inner);
        let out = f(PixelViewMut {
            width: self.width,
            height: self.height,
            stride: self.width as usize * 4,
            bytes: guard.as_mut_slice(),
        });
        self.version.fetch_add(1, Ordering::Release);
        drop(guard);
        out
    }
}

impl PixelBufferSource for LivePixelSource {
    fn pixel_width(&self) -> u32 {
        self.width
    }

    fn pixel_height(&self) -> u32 {
        self.height
    }

    fn pixel_format(&self) -> PixelFormat {
        PixelFormat::Bgra8
    }

    fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    fn lock(&self) -> PixelLock<'_> {
        let guard = self.pixels.read().unwrap_or_else(PoisonError::into_inner);
        PixelLock {
            width: self.width,
            height: self.height,
            stride: self.width as usize * 4,
            bytes: LockedBytes::Guarded(guard),
        }
    }
}

impl<T: PixelBufferSource + ?Sized> PixelBufferSource for Arc<T> {
    fn pixel_width(&self) -> u32 {
        self.deref().pixel_width()
    }

    fn pixel_height(&self) -> u32 {
        self.deref().pixel_height()
    }

    fn pixel_format(&self) -> PixelFormat {
        self.deref().pixel_format()
    }

    fn version(&self) -> u64 {
        self.deref().version()
    }

    fn lock(&self) -> PixelLock<'_> {
        self.deref().lock()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pixels/source.rs"]
mod tests;
