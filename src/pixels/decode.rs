use anyhow::Context;

use crate::foundation::core::PixelFormat;
use crate::foundation::error::PresentResult;
use crate::pixels::bitmap::DecodedBitmap;

/// External decoder contract: encoded bytes in, straight-alpha [`DecodedBitmap`] out.
pub trait ImageDecoder {
    /// Short name of the container format(s) this decoder handles.
    fn format_name(&self) -> &str;

    /// Cheap sniff of whether `encoded` looks like something this decoder accepts.
    fn can_decode(&self, encoded: &[u8]) -> bool;

    /// Decode into a bitmap.
    fn decode(&self, encoded: &[u8]) -> PresentResult<DecodedBitmap>;
}

/// [`ImageDecoder`] backed by the `image` crate; always produces BGRA8.
#[derive(Clone, Copy, Debug, Default)]
pub struct ImageCrateDecoder;

impl ImageDecoder for ImageCrateDecoder {
    fn format_name(&self) -> &str {
        "image"
    }

    fn can_decode(&self, encoded: &[u8]) -> bool {
        image::guess_format(encoded).is_ok()
    }

    fn decode(&self, encoded: &[u8]) -> PresentResult<DecodedBitmap> {
        let dyn_img = image::load_from_memory(encoded).context("decode image from memory")?;
        let rgba = dyn_img.to_rgba8();
        let (width, height) = rgba.dimensions();

        let mut bgra = rgba.into_raw();
        for px in bgra.chunks_exact_mut(4) {
            px.swap(0, 2);
        }

        DecodedBitmap::new(width, height, PixelFormat::Bgra8, bgra)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pixels/decode.rs"]
mod tests;
