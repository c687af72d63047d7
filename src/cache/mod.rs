//! Device resource caching keyed by surface identity, generation and mip level.

/// Backend contract and resource keys.
pub mod backend;
/// `vello_cpu` reference backend.
pub mod cpu;
/// Per-image handle cache.
pub mod image_cache;

pub use backend::{BackendIdentity, BackendResourceKey, ImageBackend, SurfaceBinding};
pub use cpu::{CpuPixmapBackend, CpuPixmapBackendOpts, PixmapHandle};
pub use image_cache::{BackendImageCache, ImageCacheStats};
