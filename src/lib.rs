// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

#![cfg_attr(docsrs, feature(doc_cfg))]

//! # PoseNet Pose Decoding Library
//!
//! Turns the raw outputs of a PoseNet-style network into skeletons in image
//! coordinates. The network is expected to have produced four tensors on a
//! shared `H x W` grid:
//!
//! | Tensor | Shape | Content |
//! |--------|-------|---------|
//! | heatmaps | `[1, H, W, K]` | per-part confidence |
//! | offsets | `[1, H, W, 2K]` | sub-cell correction, `y` block then `x` block |
//! | forward displacements | `[1, H, W, 2E]` | parent to child vectors |
//! | backward displacements | `[1, H, W, 2E]` | child to parent vectors |
//!
//! `K` is the number of body parts and `E` the number of skeleton edges
//! (17 and 16 for the reference skeleton in [`skeleton`]).
//!
//! ## Quick Start
//!
//! ```no_run
//! use posenet_decode::{DecodeConfig, ModelOutputs, PoseDecoder, TensorView};
//!
//! fn decode(
//!     heatmaps: &[f32],
//!     offsets: &[f32],
//!     fwd: &[f32],
//!     bwd: &[f32],
//! ) -> posenet_decode::Result<()> {
//!     let outputs = ModelOutputs::new(
//!         TensorView::from_slice(&[1, 33, 33, 17], heatmaps)?,
//!         TensorView::from_slice(&[1, 33, 33, 34], offsets)?,
//!         TensorView::from_slice(&[1, 33, 33, 32], fwd)?,
//!         TensorView::from_slice(&[1, 33, 33, 32], bwd)?,
//!     )?;
//!
//!     let stride = posenet_decode::output_stride(513, 33)?;
//!     let decoder = PoseDecoder::new(
//!         DecodeConfig::new()
//!             .with_max_poses(10)
//!             .with_score_threshold(0.5)
//!             .with_nms_radius(20.0),
//!     )?;
//!
//!     for pose in decoder.decode(&outputs, stride)? {
//!         println!("pose score {:.2}", pose.score());
//!         for kp in pose.visible(0.3) {
//!             println!("  part {} at ({:.1}, {:.1})", kp.part, kp.position.x, kp.position.y);
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`tensor`] | [`TensorView`] and [`ModelOutputs`] with shape validation |
//! | [`sampler`] | Grid/image coordinate mapping, offset and displacement lookups |
//! | [`scanner`] | Heatmap argmax and local-maximum candidate search |
//! | [`decoder`] | Single and multi-pose assembly, [`PoseDecoder`] |
//! | [`skeleton`] | Part names and the parent/child edge list |
//! | [`results`] | [`Keypoint`], [`Pose`] and array export |
//! | [`config`] | [`DecodeConfig`] builder |
//! | [`logging`] | Process-wide [`LogLevel`] and console macros |
//! | [`error`] | Error types ([`DecodeError`], [`Result`]) |
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `parallel` | Scan heatmap channels in parallel with rayon (default) |
//! | `serde` | `Serialize`/`Deserialize` for output types |

// Modules
pub mod config;
pub mod decoder;
pub mod error;
pub mod estimation;
pub mod logging;
pub mod results;
pub mod sampler;
pub mod scanner;
pub mod skeleton;
pub mod tensor;
pub mod utils;

// Re-export main types for convenience
pub use config::{DecodeConfig, MAX_POSES_LIMIT};
pub use decoder::{PoseDecoder, decode_multiple_poses, decode_single_pose};
pub use error::{DecodeError, Result};
pub use estimation::EstimationType;
pub use logging::{LogLevel, set_log_level};
pub use results::{Keypoint, Point2, Pose, PoseSet, poses_to_array};
pub use sampler::output_stride;
pub use skeleton::{PART_NAMES, POSE_CHAIN, Skeleton, SkeletonEdge};
pub use tensor::{ModelOutputs, TensorView};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(VERSION.contains('.'));
    }

    #[test]
    fn test_name() {
        assert_eq!(NAME, "posenet-decode");
    }
}
