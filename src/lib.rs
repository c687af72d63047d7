//! pixel-present turns decoded bitmaps into device-ready images and places them in layout.
//!
//! The pipeline runs on demand while a frame is drawn:
//!
//! - A [`PixelBufferSource`] holds straight-alpha BGRA pixels and a content version
//! - A [`MipChain`] snapshots and premultiplies them, then box-filters smaller levels lazily
//! - A [`BackendImageCache`] turns levels into backend handles keyed by surface identity,
//!   generation and level, and discards them when the version or surface changes
//! - The [`geometry`] module fits the (viewbox-clamped) source into layout bounds and maps
//!   pointer positions back to source pixels
//!
//! [`ImagePresenter`] wires these together for a single image; [`CpuPixmapBackend`] is a
//! `vello_cpu` reference backend.
#![deny(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Premultiplication row kernels with runtime SIMD dispatch.
pub mod blend;
/// Backend handle caching.
pub mod cache;
/// Fitting, viewbox clamping, mip level selection and hit testing.
pub mod geometry;
/// Lazily built box-filtered mip levels.
pub mod mip;
/// Pixel buffers, sources and decoding.
pub mod pixels;
/// Single-image presentation facade.
pub mod present;

pub use crate::foundation::core::{Color, PixelFormat, Point, Rect, Size, has_area, rect_xywh};
pub use crate::foundation::error::{PresentError, PresentResult};

pub use crate::blend::{Blender, PremulTable, SimdLevel, build_premultiplied_table};
pub use crate::cache::{
    BackendIdentity, BackendImageCache, BackendResourceKey, CpuPixmapBackend,
    CpuPixmapBackendOpts, ImageBackend, ImageCacheStats, PixmapHandle, SurfaceBinding,
};
pub use crate::geometry::{
    AlignX, AlignY, GeometryFit, ImageScaleQuality, Stretch, ViewBox, ViewBoxUnits, peek,
    resolve, resolve_viewbox, select_mip_level,
};
pub use crate::mip::{MAX_MIP_LEVELS, MipBuffer, MipChain, mip_dimensions};
pub use crate::pixels::bitmap::{DecodedBitmap, PixelView};
pub use crate::pixels::decode::{ImageCrateDecoder, ImageDecoder};
pub use crate::pixels::source::{
    LivePixelSource, PixelBufferSource, PixelLock, PixelViewMut, StaticPixelSource,
};
pub use crate::present::{DrawImage, ImagePresenter, ImageSource, PresentOpts};
