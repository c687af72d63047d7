use std::collections::HashMap;
use std::sync::Arc;

use crate::blend::Blender;
use crate::cache::backend::{BackendIdentity, BackendResourceKey, ImageBackend, SurfaceBinding};
use crate::foundation::core::PixelFormat;
use crate::foundation::error::{PresentError, PresentResult};
use crate::mip::MipChain;
use crate::pixels::bitmap::DecodedBitmap;
use crate::pixels::source::{PixelBufferSource, StaticPixelSource};

/// Counters describing a cache's lifetime so far.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ImageCacheStats {
    /// Handles currently held.
    pub live_handles: usize,
    /// Handles created through the backend.
    pub created: u64,
    /// Handles released through the backend.
    pub released: u64,
    /// Version or binding changes that discarded derived state.
    pub invalidations: u64,
    /// Failed `create_bitmap` calls.
    pub create_failures: u64,
}

/// Per-image cache of mip levels and the device handles built from them.
///
/// Staleness is detected by polling: the source version on every request, and the requested
/// `(identity, generation)` against the bound pair. Old handles are released through the
/// backend before replacements are created. Call [`BackendImageCache::dispose`] before dropping;
/// a cache dropped with live handles cannot release them.
pub struct BackendImageCache<H> {
    source: Arc<dyn PixelBufferSource>,
    blender: Blender,
    mips: MipChain,
    observed_version: u64,
    bound: Option<SurfaceBinding>,
    resources: HashMap<BackendResourceKey, H>,
    stats: ImageCacheStats,
    disposed: bool,
}

impl<H> std::fmt::Debug for BackendImageCache<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendImageCache")
            .field("width", &self.source.pixel_width())
            .field("height", &self.source.pixel_height())
            .field("observed_version", &self.observed_version)
            .field("bound", &self.bound)
            .field("built_levels", &self.mips.built_levels())
            .field("live_handles", &self.resources.len())
            .field("disposed", &self.disposed)
            .finish()
    }
}

impl<H: Copy + Eq + std::fmt::Debug> BackendImageCache<H> {
    /// Cache over an immutable decoded bitmap. Only BGRA8 is accepted.
    pub fn from_bitmap(bitmap: DecodedBitmap) -> PresentResult<Self> {
        Self::from_source(Arc::new(StaticPixelSource::new(bitmap)))
    }

    /// Cache over any pixel source. Only BGRA8 is accepted.
    pub fn from_source(source: Arc<dyn PixelBufferSource>) -> PresentResult<Self> {
        let format = source.pixel_format();
        if format != PixelFormat::Bgra8 {
            return Err(PresentError::UnsupportedFormat(format));
        }
        let observed_version = source.version();
        Ok(Self {
            source,
            blender: Blender::default(),
            mips: MipChain::new(),
            observed_version,
            bound: None,
            resources: HashMap::new(),
            stats: ImageCacheStats::default(),
            disposed: false,
        })
    }

    /// Use `blender` for level 0 preparation instead of the detected one.
    pub fn with_blender(mut self, blender: Blender) -> Self {
        self.blender = blender;
        self
    }

    /// The pixel source this cache derives from.
    pub fn source(&self) -> &Arc<dyn PixelBufferSource> {
        &self.source
    }

    /// Pair the cache's handles currently belong to.
    pub fn binding(&self) -> Option<SurfaceBinding> {
        self.bound
    }

    /// `true` after [`BackendImageCache::dispose`].
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Snapshot of the cache counters.
    pub fn stats(&self) -> ImageCacheStats {
        ImageCacheStats {
            live_handles: self.resources.len(),
            ..self.stats
        }
    }

    /// Mip levels currently held.
    pub fn mip_chain(&self) -> &MipChain {
        &self.mips
    }

    /// Handle for `mip_level` on the surface in `binding`, creating it on first use.
    ///
    /// Returns `Ok(None)` when disposed, when the binding is null, or when the image is empty.
    /// A failed creation is reported as [`PresentError::Backend`] and leaves no entry behind,
    /// so the next request tries again.
    #[tracing::instrument(level = "debug", skip(self, backend))]
    pub fn get_or_create<B>(
        &mut self,
        backend: &mut B,
        binding: SurfaceBinding,
        mip_level: u8,
    ) -> PresentResult<Option<H>>
    where
        B: ImageBackend<Handle = H> + ?Sized,
    {
        if self.disposed || binding.identity.is_null() {
            return Ok(None);
        }

        let version = self.source.version();
        if version != self.observed_version {
            tracing::debug!(
                from = self.observed_version,
                to = version,
                handles = self.resources.len(),
                "source version changed; dropping derived state"
            );
            self.release_where(backend, |_| true);
            self.mips.clear();
            self.observed_version = version;
            self.stats.invalidations = self.stats.invalidations.saturating_add(1);
        }

        if self.bound != Some(binding) {
            if let Some(old) = self.bound {
                tracing::debug!(?old, new = ?binding, "surface binding changed");
                self.stats.invalidations = self.stats.invalidations.saturating_add(1);
            }
            self.release_where(backend, |key| !key.matches(binding));
            self.bound = Some(binding);
        }

        let Some(buffer) = self
            .mips
            .ensure_level(self.source.as_ref(), &self.blender, mip_level)?
        else {
            return Ok(None);
        };
        if buffer.is_empty() {
            return Ok(None);
        }

        let key = BackendResourceKey::new(binding, mip_level);
        if let Some(&handle) = self.resources.get(&key) {
            return Ok(Some(handle));
        }

        match backend.create_bitmap(binding, mip_level, buffer) {
            Ok(handle) => {
                self.resources.insert(key, handle);
                self.stats.created = self.stats.created.saturating_add(1);
                tracing::debug!(?handle, mip_level, "created backend bitmap");
                Ok(Some(handle))
            }
            Err(err) => {
                self.stats.create_failures = self.stats.create_failures.saturating_add(1);
                Err(match err {
                    PresentError::Backend(_) => err,
                    other => PresentError::backend(format!(
                        "create_bitmap failed for mip level {mip_level}: {other}"
                    )),
                })
            }
        }
    }

    /// Release every handle created for `identity`, e.g. when that surface is destroyed.
    pub fn release_backend<B>(&mut self, backend: &mut B, identity: BackendIdentity)
    where
        B: ImageBackend<Handle = H> + ?Sized,
    {
        let released = self.release_where(backend, |key| key.identity == identity);
        if self.bound.is_some_and(|b| b.identity == identity) {
            self.bound = None;
        }
        if released > 0 {
            tracing::debug!(identity = identity.0, released, "released surface resources");
        }
    }

    /// Release all handles and derived buffers. Later calls are no-ops.
    pub fn dispose<B>(&mut self, backend: &mut B)
    where
        B: ImageBackend<Handle = H> + ?Sized,
    {
        if self.disposed {
            return;
        }
        let released = self.release_where(backend, |_| true);
        self.mips.clear();
        self.bound = None;
        self.disposed = true;
        tracing::debug!(released, "disposed image cache");
    }

    fn release_where<B>(
        &mut self,
        backend: &mut B,
        mut pred: impl FnMut(&BackendResourceKey) -> bool,
    ) -> usize
    where
        B: ImageBackend<Handle = H> + ?Sized,
    {
        let mut released = 0usize;
        self.resources.retain(|key, handle| {
            if pred(key) {
                backend.release_bitmap(*handle);
                released += 1;
                false
            } else {
                true
            }
        });
        self.stats.released = self.stats.released.saturating_add(released as u64);
        released
    }
}

impl<H> Drop for BackendImageCache<H> {
    fn drop(&mut self) {
        if !self.resources.is_empty() {
            tracing::warn!(
                live = self.resources.len(),
                "image cache dropped without dispose; backend handles leaked"
            );
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/cache/image_cache.rs"]
mod tests;
