/// Convenience result type used across mediafilter.
pub type MediaResult<T> = Result<T, MediaFilterError>;

/// Top-level error taxonomy used by the stylization and job APIs.
#[derive(thiserror::Error, Debug)]
pub enum MediaFilterError {
    /// Invalid user-provided configuration or arguments.
    #[error("validation error: {0}")]
    Validation(String),

    /// The source could not be read, probed, or yielded no frames.
    #[error("decode error: {0}")]
    Decode(String),

    /// The encoder failed to start, rejected a frame, or exited unsuccessfully.
    #[error("encode error: {0}")]
    Encode(String),

    /// The job was aborted through its cancellation flag.
    #[error("job cancelled")]
    Cancelled,

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MediaFilterError {
    /// Build a [`MediaFilterError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`MediaFilterError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`MediaFilterError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
