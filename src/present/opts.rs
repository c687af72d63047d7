use crate::foundation::error::{PresentError, PresentResult};
use crate::geometry::{AlignX, AlignY, ImageScaleQuality, Stretch, ViewBox};

/// How an image is placed into its bounds.
///
/// Every field has a default, so partial JSON documents are accepted.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct PresentOpts {
    /// Stretch mode; `Uniform` unless set.
    pub stretch: Stretch,
    /// Horizontal anchor; `Center` unless set.
    pub align_x: AlignX,
    /// Vertical anchor; `Center` unless set.
    pub align_y: AlignY,
    /// Part of the source to present; the whole image when `None`.
    pub viewbox: Option<ViewBox>,
    /// Sampling quality; only `HighQuality` samples from minified mip levels.
    pub quality: ImageScaleQuality,
}

impl PresentOpts {
    /// Parse options from a JSON document.
    pub fn from_json_str(s: &str) -> PresentResult<Self> {
        serde_json::from_str(s).map_err(|e| PresentError::serde(e.to_string()))
    }

    /// Serialize to compact JSON.
    pub fn to_json_string(&self) -> PresentResult<String> {
        serde_json::to_string(self).map_err(|e| PresentError::serde(e.to_string()))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/present/opts.rs"]
mod tests;
