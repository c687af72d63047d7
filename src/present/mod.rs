//! High-level presentation: options, source ownership and per-draw preparation.

/// Presentation options.
pub mod opts;
/// Source ownership and draw preparation.
pub mod presenter;

pub use opts::PresentOpts;
pub use presenter::{DrawImage, ImagePresenter, ImageSource};
