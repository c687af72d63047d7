//! Layout math: viewbox clamping, stretch/alignment fitting, mip level choice and hit testing.
//!
//! Everything here is pure and allocation-free. Degenerate input never errors; it produces
//! zero-area rectangles that callers skip.

/// Stretch and alignment fitting.
pub mod fit;
/// Sampling quality and mip level choice.
pub mod level;
/// Viewbox clamping against native bounds.
pub mod viewbox;

pub use fit::{AlignX, AlignY, GeometryFit, Stretch, resolve};
pub use hit_test::peek;
pub use level::{ImageScaleQuality, select_mip_level};
pub use viewbox::{ViewBox, ViewBoxUnits, resolve_viewbox};
