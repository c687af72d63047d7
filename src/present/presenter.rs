use std::sync::Arc;

use crate::cache::{BackendImageCache, ImageBackend, ImageCacheStats, SurfaceBinding};
use crate::foundation::core::{Color, Point, Rect, Size, has_area};
use crate::foundation::error::PresentResult;
use crate::geometry::{
    GeometryFit, ImageScaleQuality, peek, resolve, resolve_viewbox, select_mip_level,
};
use crate::mip::mip_dimensions;
use crate::pixels::bitmap::DecodedBitmap;
use crate::pixels::source::{LivePixelSource, PixelBufferSource, StaticPixelSource};
use crate::present::opts::PresentOpts;

/// Pixels an [`ImagePresenter`] shows.
#[derive(Clone, Debug)]
pub enum ImageSource {
    /// Immutable decoder output.
    Decoded(Arc<DecodedBitmap>),
    /// Writable bitmap whose content may change between frames.
    Live(Arc<LivePixelSource>),
}

impl ImageSource {
    /// Native size in pixels.
    pub fn pixel_size(&self) -> (u32, u32) {
        match self {
            Self::Decoded(b) => (b.width(), b.height()),
            Self::Live(l) => (l.pixel_width(), l.pixel_height()),
        }
    }

    fn pixel_source(&self) -> Arc<dyn PixelBufferSource> {
        match self {
            Self::Decoded(b) => Arc::new(StaticPixelSource::new(DecodedBitmap::clone(b))),
            Self::Live(l) => l.clone(),
        }
    }
}

impl From<DecodedBitmap> for ImageSource {
    fn from(bitmap: DecodedBitmap) -> Self {
        Self::Decoded(Arc::new(bitmap))
    }
}

impl From<Arc<LivePixelSource>> for ImageSource {
    fn from(source: Arc<LivePixelSource>) -> Self {
        Self::Live(source)
    }
}

/// Everything a backend needs to issue one image draw.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawImage<H> {
    /// Handle of the selected mip level.
    pub handle: H,
    /// Level `handle` holds.
    pub mip_level: u8,
    /// Destination rectangle in bounds coordinates.
    pub dest: Rect,
    /// Source rectangle in the pixel space of `mip_level`.
    pub src: Rect,
    /// Layout bounds; nothing outside them may be painted.
    pub clip: Rect,
    /// Sampling quality the draw was prepared for.
    pub quality: ImageScaleQuality,
}

/// Presents one image source into layout bounds on any [`ImageBackend`].
///
/// Owns the per-image cache. Replacing the source or disposing the presenter releases every
/// handle through the backend passed in.
pub struct ImagePresenter<H> {
    opts: PresentOpts,
    source: Option<ImageSource>,
    cache: Option<BackendImageCache<H>>,
}

impl<H> std::fmt::Debug for ImagePresenter<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImagePresenter")
            .field("opts", &self.opts)
            .field("source", &self.source)
            .field("cache", &self.cache)
            .finish()
    }
}

impl<H: Copy + Eq + std::fmt::Debug> ImagePresenter<H> {
    /// Presenter with no source.
    pub fn new(opts: PresentOpts) -> Self {
        Self {
            opts,
            source: None,
            cache: None,
        }
    }

    /// Current options.
    pub fn opts(&self) -> &PresentOpts {
        &self.opts
    }

    /// Replace the options. Cached handles stay valid; only geometry changes.
    pub fn set_opts(&mut self, opts: PresentOpts) {
        self.opts = opts;
    }

    /// Current source, if any.
    pub fn source(&self) -> Option<&ImageSource> {
        self.source.as_ref()
    }

    /// Swap the source, disposing the previous cache first.
    ///
    /// Fails with `UnsupportedFormat` for non-BGRA bitmaps; the presenter is left empty then.
    pub fn set_source<B>(&mut self, backend: &mut B, source: Option<ImageSource>) -> PresentResult<()>
    where
        B: ImageBackend<Handle = H> + ?Sized,
    {
        self.dispose(backend);
        let Some(source) = source else {
            return Ok(());
        };
        self.cache = Some(BackendImageCache::from_source(source.pixel_source())?);
        self.source = Some(source);
        Ok(())
    }

    /// Size the image wants in layout: the effective viewbox size, zero without a source.
    pub fn natural_size(&self) -> Size {
        match &self.source {
            Some(source) => self.source_rect(source).size(),
            None => Size::ZERO,
        }
    }

    /// Resolved geometry for `bounds`, or `None` when there is nothing to draw.
    pub fn fit(&self, bounds: Rect) -> Option<GeometryFit> {
        let source = self.source.as_ref()?;
        let src = self.source_rect(source);
        if !has_area(src) {
            return None;
        }
        let fit = resolve(
            src,
            bounds,
            self.opts.stretch,
            self.opts.align_x,
            self.opts.align_y,
        );
        (!fit.is_empty()).then_some(fit)
    }

    /// Resolve geometry and fetch the backend handle for drawing into `bounds`.
    ///
    /// `Ok(None)` means nothing should be drawn: no source, empty geometry, null identity,
    /// or an empty image.
    pub fn prepare_draw<B>(
        &mut self,
        backend: &mut B,
        binding: SurfaceBinding,
        bounds: Rect,
    ) -> PresentResult<Option<DrawImage<H>>>
    where
        B: ImageBackend<Handle = H> + ?Sized,
    {
        let Some(fit) = self.fit(bounds) else {
            return Ok(None);
        };
        let (Some(source), Some(cache)) = (&self.source, &mut self.cache) else {
            return Ok(None);
        };

        let (pw, ph) = source.pixel_size();
        let quality = self.opts.quality;
        let mip_level = select_mip_level(fit.src, fit.dest, quality, pw, ph);
        let Some(handle) = cache.get_or_create(backend, binding, mip_level)? else {
            return Ok(None);
        };

        let (mw, mh) = mip_dimensions(pw, ph, mip_level);
        let sx = f64::from(mw) / f64::from(pw);
        let sy = f64::from(mh) / f64::from(ph);
        let src = Rect::new(
            fit.src.x0 * sx,
            fit.src.y0 * sy,
            fit.src.x1 * sx,
            fit.src.y1 * sy,
        );

        Ok(Some(DrawImage {
            handle,
            mip_level,
            dest: fit.dest,
            src,
            clip: bounds,
            quality,
        }))
    }

    /// Color of the source pixel under `point` when drawn into `bounds`.
    ///
    /// Reads straight-alpha source pixels; never touches the cache.
    pub fn try_peek_color(&self, bounds: Rect, point: Point) -> Option<Color> {
        let fit = self.fit(bounds)?;
        match self.source.as_ref()? {
            ImageSource::Decoded(bitmap) => peek(Some(bitmap.view()), &fit, point),
            ImageSource::Live(live) => {
                let lock = live.lock();
                peek(Some(lock.view()), &fit, point)
            }
        }
    }

    /// Counters of the current cache.
    pub fn cache_stats(&self) -> Option<ImageCacheStats> {
        self.cache.as_ref().map(BackendImageCache::stats)
    }

    /// Release every handle and forget the source. Safe to call repeatedly.
    pub fn dispose<B>(&mut self, backend: &mut B)
    where
        B: ImageBackend<Handle = H> + ?Sized,
    {
        if let Some(mut cache) = self.cache.take() {
            cache.dispose(backend);
        }
        self.source = None;
    }

    fn source_rect(&self, source: &ImageSource) -> Rect {
        let (w, h) = source.pixel_size();
        resolve_viewbox(self.opts.viewbox.as_ref(), w, h)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/present/presenter.rs"]
mod tests;
