// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Decoder configuration.
//!
//! This module defines the [`DecodeConfig`] struct, which controls how raw network
//! outputs are turned into poses: single or multi-person estimation, the candidate
//! score threshold, the non-maximum suppression radius and the pose cap.

use crate::error::{DecodeError, Result};
use crate::estimation::EstimationType;

/// Upper bound accepted for [`DecodeConfig::max_poses`].
pub const MAX_POSES_LIMIT: usize = 20;

/// Configuration for pose decoding.
///
/// Uses a builder pattern for convenient construction.
///
/// # Example
///
/// ```rust
/// use posenet_decode::{DecodeConfig, EstimationType};
///
/// let config = DecodeConfig::new()
///     .with_estimation_type(EstimationType::MultiPose)
///     .with_max_poses(10)
///     .with_score_threshold(0.4)
///     .with_nms_radius(30.0);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DecodeConfig {
    /// Single or multi-person decoding.
    pub estimation_type: EstimationType,
    /// Maximum number of poses to return (0 to [`MAX_POSES_LIMIT`]).
    pub max_poses: usize,
    /// Minimum heatmap score for a cell to become a root candidate (0.0 to 1.0).
    /// Only used by multi-pose decoding.
    pub score_threshold: f32,
    /// Image-space radius in pixels within which a new root is suppressed by an
    /// existing pose's keypoint of the same part.
    pub nms_radius: f32,
    /// Half-width of the window a candidate must dominate in its heatmap channel.
    pub local_maximum_radius: usize,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            estimation_type: EstimationType::MultiPose,
            max_poses: 5,
            score_threshold: 0.5,
            nms_radius: 20.0,
            local_maximum_radius: 1,
        }
    }
}

impl DecodeConfig {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the estimation type.
    #[must_use]
    pub const fn with_estimation_type(mut self, estimation_type: EstimationType) -> Self {
        self.estimation_type = estimation_type;
        self
    }

    /// Set the maximum number of poses to decode.
    ///
    /// # Arguments
    ///
    /// * `max` - Pose cap. `0` is accepted and yields an empty result.
    #[must_use]
    pub const fn with_max_poses(mut self, max: usize) -> Self {
        self.max_poses = max;
        self
    }

    /// Set the candidate score threshold.
    ///
    /// # Arguments
    ///
    /// * `threshold` - The minimum heatmap score (0.0 to 1.0).
    #[must_use]
    pub const fn with_score_threshold(mut self, threshold: f32) -> Self {
        self.score_threshold = threshold;
        self
    }

    /// Set the non-maximum suppression radius in image pixels.
    #[must_use]
    pub const fn with_nms_radius(mut self, radius: f32) -> Self {
        self.nms_radius = radius;
        self
    }

    /// Set the local-maximum window radius in grid cells.
    #[must_use]
    pub const fn with_local_maximum_radius(mut self, radius: usize) -> Self {
        self.local_maximum_radius = radius;
        self
    }

    /// Check every field against its accepted range.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::ConfigError`] when the pose cap exceeds
    /// [`MAX_POSES_LIMIT`], the score threshold is outside `[0, 1]`, or the
    /// NMS radius is not a positive finite number.
    pub fn validate(&self) -> Result<()> {
        if self.max_poses > MAX_POSES_LIMIT {
            return Err(DecodeError::ConfigError(format!(
                "max_poses must be at most {MAX_POSES_LIMIT}, got {}",
                self.max_poses
            )));
        }
        if !(0.0..=1.0).contains(&self.score_threshold) {
            return Err(DecodeError::ConfigError(format!(
                "score_threshold must be within [0, 1], got {}",
                self.score_threshold
            )));
        }
        if !self.nms_radius.is_finite() || self.nms_radius <= 0.0 {
            return Err(DecodeError::ConfigError(format!(
                "nms_radius must be positive, got {}",
                self.nms_radius
            )));
        }
        Ok(())
    }
}
