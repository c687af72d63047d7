use crate::foundation::core::PixelFormat;

/// Convenience result type used across the crate.
pub type PresentResult<T> = Result<T, PresentError>;

/// Top-level error taxonomy used by pipeline APIs.
#[derive(thiserror::Error, Debug)]
pub enum PresentError {
    /// Invalid caller-provided data (buffer sizes, mip levels, dimensions).
    #[error("validation error: {0}")]
    Validation(String),

    /// Pixel format the pipeline cannot present.
    #[error("unsupported pixel format: {0:?}")]
    UnsupportedFormat(PixelFormat),

    /// A backend refused or failed to create a device resource.
    #[error("backend error: {0}")]
    Backend(String),

    /// Errors when serializing or deserializing options.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PresentError {
    /// Build a [`PresentError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`PresentError::Backend`] value.
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    /// Build a [`PresentError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
