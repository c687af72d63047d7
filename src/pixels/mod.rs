//! Pixel sources: decoder output, static and live buffers.

/// Immutable decoded bitmaps and borrowed views.
pub mod bitmap;
/// Decoder contract and the `image`-crate adapter.
pub mod decode;
/// Versioned pixel buffer sources.
pub mod source;
