/// Convenience result type used across scrollseq.
pub type ScrollSeqResult<T> = Result<T, ScrollSeqError>;

/// Top-level error taxonomy used by public APIs.
///
/// Per-frame decode failures never show up here; they are recorded as
/// [`DecodeError`](crate::DecodeError) slots inside a [`FrameStore`](crate::FrameStore).
#[derive(thiserror::Error, Debug)]
pub enum ScrollSeqError {
    /// Invalid user-provided configuration or geometry.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors while driving a preload (worker pool, channel teardown).
    #[error("load error: {0}")]
    Load(String),

    /// Errors while preparing or drawing onto a surface.
    #[error("render error: {0}")]
    Render(String),

    /// Errors when serializing or deserializing configuration.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ScrollSeqError {
    /// Build a [`ScrollSeqError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ScrollSeqError::Load`] value.
    pub fn load(msg: impl Into<String>) -> Self {
        Self::Load(msg.into())
    }

    /// Build a [`ScrollSeqError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`ScrollSeqError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
