/// Convenience result type used across codereel.
pub type CodeReelResult<T> = Result<T, CodeReelError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum CodeReelError {
    /// Script rejected before any frame is computed (empty field, unsupported cursor style,
    /// content that does not fit the canvas).
    #[error("invalid script: {0}")]
    InvalidScript(String),

    /// Configuration values that cannot produce a valid render.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// Internal timeline invariant violation. Fatal, never retried.
    #[error("timeline arithmetic error: {0}")]
    TimelineArithmetic(String),

    /// Optional asset could not be loaded. Callers degrade to a synthesized fallback.
    #[error("asset missing: {0}")]
    AssetMissing(String),

    /// Errors while rasterizing a frame or running the render pipeline.
    #[error("render error: {0}")]
    Render(String),

    /// Failure reported by the encoder sink. Surfaced unchanged.
    #[error("encoding failure: {0}")]
    Encoding(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CodeReelError {
    /// Build a [`CodeReelError::InvalidScript`] value.
    pub fn invalid_script(msg: impl Into<String>) -> Self {
        Self::InvalidScript(msg.into())
    }

    /// Build a [`CodeReelError::InvalidConfig`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Build a [`CodeReelError::TimelineArithmetic`] value.
    pub fn timeline(msg: impl Into<String>) -> Self {
        Self::TimelineArithmetic(msg.into())
    }

    /// Build a [`CodeReelError::AssetMissing`] value.
    pub fn asset_missing(msg: impl Into<String>) -> Self {
        Self::AssetMissing(msg.into())
    }

    /// Build a [`CodeReelError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`CodeReelError::Encoding`] value.
    pub fn encoding(msg: impl Into<String>) -> Self {
        Self::Encoding(msg.into())
    }

    /// Build a [`CodeReelError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
