/// Convenience result type used across the compositor.
pub type ComposeResult<T> = Result<T, ComposeError>;

/// Hard errors that abort an operation.
///
/// Per-layer problems (a missing raster, a malformed side-car, an unknown blend mode) are not
/// errors: they are recorded as [`crate::Diagnostic`] values and composition continues.
#[derive(thiserror::Error, Debug)]
pub enum ComposeError {
    /// Invalid caller input, including a missing or zero document size.
    #[error("validation error: {0}")]
    Validation(String),

    /// A document-level metadata file could not be interpreted at all.
    #[error("metadata error: {0}")]
    Metadata(String),

    /// A raster payload could not be decoded.
    #[error("asset error: {0}")]
    Asset(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ComposeError {
    /// Build a [`ComposeError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ComposeError::Metadata`] value.
    pub fn metadata(msg: impl Into<String>) -> Self {
        Self::Metadata(msg.into())
    }

    /// Build a [`ComposeError::Asset`] value.
    pub fn asset(msg: impl Into<String>) -> Self {
        Self::Asset(msg.into())
    }

    /// Build a [`ComposeError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
