//! Height field error types.

/// Errors that can occur when building, generating, or loading a height field.
#[derive(Debug, thiserror::Error)]
pub enum HeightFieldError {
    /// A height field needs at least one sample on each axis.
    #[error("height field must not be empty (got {width}x{length})")]
    EmptyField {
        /// Requested width in samples.
        width: u32,
        /// Requested length in samples.
        length: u32,
    },

    /// The sample buffer does not match the requested dimensions.
    #[error("expected {expected} height samples, got {actual}")]
    SampleCount {
        /// `width * length`.
        expected: usize,
        /// Length of the supplied buffer.
        actual: usize,
    },

    /// Fault-formation parameters are out of range.
    #[error("invalid fault parameters: {0}")]
    InvalidFault(String),

    /// Failed to read or write a height map image.
    #[error("height map image error: {0}")]
    Image(#[from] image::ImageError),
}
