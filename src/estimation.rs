// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Estimation modes for pose decoding.

use std::fmt;
use std::str::FromStr;

/// How many people the decoder should look for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EstimationType {
    /// One pose built from the per-part global maxima.
    SinglePose,
    /// Up to `max_poses` poses grown from local-maximum roots.
    #[default]
    MultiPose,
}

impl EstimationType {
    /// Returns the canonical lowercase name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::SinglePose => "single",
            Self::MultiPose => "multi",
        }
    }
}

impl fmt::Display for EstimationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EstimationType {
    type Err = EstimationParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "single" | "singlepose" | "single-pose" | "single_pose" => Ok(Self::SinglePose),
            "multi" | "multipose" | "multi-pose" | "multi_pose" | "multiple" => {
                Ok(Self::MultiPose)
            }
            _ => Err(EstimationParseError(s.to_string())),
        }
    }
}

/// Error returned when parsing an invalid estimation type string.
#[derive(Debug, Clone)]
pub struct EstimationParseError(String);

impl fmt::Display for EstimationParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid estimation type '{}', expected one of: single, multi",
            self.0
        )
    }
}

impl std::error::Error for EstimationParseError {}
