/// Convenience result type used across the accumulator.
pub type AccumResult<T> = Result<T, AccumError>;

/// Error taxonomy for the accumulator stage and its render hosts.
#[derive(thiserror::Error, Debug)]
pub enum AccumError {
    /// Invalid inputs: non-finite opacity, zero-sized surfaces, missing source, size mismatches.
    #[error("validation error: {0}")]
    Validation(String),

    /// An operation was invoked out of lifecycle order (programmer misuse).
    #[error("lifecycle error: {0}")]
    Lifecycle(String),

    /// The host failed to compile a generated program.
    #[error("compilation error: {0}")]
    Compilation(String),

    /// Surface allocation, resize, upload or readback failed.
    #[error("resource error: {0}")]
    Resource(String),

    /// Errors when serializing or deserializing configuration.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AccumError {
    /// Build an [`AccumError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build an [`AccumError::Lifecycle`] value.
    pub fn lifecycle(msg: impl Into<String>) -> Self {
        Self::Lifecycle(msg.into())
    }

    /// Build an [`AccumError::Compilation`] value.
    pub fn compilation(msg: impl Into<String>) -> Self {
        Self::Compilation(msg.into())
    }

    /// Build an [`AccumError::Resource`] value.
    pub fn resource(msg: impl Into<String>) -> Self {
        Self::Resource(msg.into())
    }

    /// Build an [`AccumError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for AccumError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serde(e.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
