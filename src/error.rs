//! Error types for the encoder crate.

use thiserror::Error;

/// Result type alias for encoder operations
pub type EncoderResult<T> = Result<T, EncoderError>;

/// Encoder errors
#[derive(Error, Debug)]
pub enum EncoderError {
    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input tensors disagree on a dimension
    #[error("Shape mismatch in {what}: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        /// Which input was rejected
        what: &'static str,
        /// Expected shape
        expected: Vec<usize>,
        /// Actual shape
        actual: Vec<usize>,
    },

    /// Id outside of an embedding table
    #[error("Index {index} out of range for {table} table of size {size}")]
    IndexOutOfRange {
        /// Table name
        table: &'static str,
        /// Offending id
        index: usize,
        /// Number of rows in the table
        size: usize,
    },

    /// Reshape or concatenation failure
    #[error("Tensor shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl EncoderError {
    /// Create a configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        EncoderError::Config(msg.into())
    }

    /// Create a shape mismatch error
    pub fn shape_mismatch(what: &'static str, expected: &[usize], actual: &[usize]) -> Self {
        EncoderError::ShapeMismatch {
            what,
            expected: expected.to_vec(),
            actual: actual.to_vec(),
        }
    }
}

/// Returns `ShapeMismatch` unless `actual == expected`.
pub(crate) fn ensure_shape(
    what: &'static str,
    expected: &[usize],
    actual: &[usize],
) -> EncoderResult<()> {
    if expected != actual {
        return Err(EncoderError::shape_mismatch(what, expected, actual));
    }
    Ok(())
}
