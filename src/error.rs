// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Error types for the pose decoder.

use std::fmt;

/// Result type alias for decode operations.
pub type Result<T> = std::result::Result<T, DecodeError>;

/// Main error type for the pose decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Tensor data does not satisfy the decoder's shape contract.
    InvalidInput(String),
    /// Invalid configuration provided (stride, thresholds, pose cap).
    ConfigError(String),
    /// Malformed skeleton topology.
    SkeletonError(String),
    /// Flat buffer could not be viewed with the requested shape.
    ShapeError(String),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInput(msg) => write!(f, "Invalid input: {msg}"),
            Self::ConfigError(msg) => write!(f, "Config error: {msg}"),
            Self::SkeletonError(msg) => write!(f, "Skeleton error: {msg}"),
            Self::ShapeError(msg) => write!(f, "Shape error: {msg}"),
        }
    }
}

impl std::error::Error for DecodeError {}

impl From<ndarray::ShapeError> for DecodeError {
    fn from(err: ndarray::ShapeError) -> Self {
        Self::ShapeError(err.to_string())
    }
}
