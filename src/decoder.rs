// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Pose assembly.
//!
//! Single-person decoding takes the global maximum of every heatmap channel.
//! Multi-person decoding ranks local maxima, discards roots that fall within the
//! NMS radius of an existing pose, and grows each surviving root into a full pose
//! by walking the skeleton: first backwards over the edge list (child to parent)
//! so that parts above the root are recovered, then forwards (parent to child).

use crate::config::DecodeConfig;
use crate::error::{DecodeError, Result};
use crate::estimation::EstimationType;
use crate::results::{Keypoint, Pose, PoseSet};
use crate::sampler::{
    check_stride, displacement_vector, grid_cell, image_coords, nearest_grid_index,
};
use crate::scanner::{argmax_per_channel, local_maxima_candidates, sort_candidates};
use crate::skeleton::Skeleton;
use crate::tensor::{ModelOutputs, TensorView, check_heatmaps_and_offsets};
use crate::utils::within_nms_radius;
use crate::verbose;

/// Decode one pose from the per-part global maxima.
///
/// Every slot of the returned pose is filled, even when the best score of a
/// channel is zero.
///
/// # Errors
///
/// Returns [`DecodeError::ConfigError`] for a zero stride and
/// [`DecodeError::InvalidInput`] if `offsets` does not match `heatmaps`.
pub fn decode_single_pose(
    heatmaps: &TensorView<'_>,
    offsets: &TensorView<'_>,
    stride: u32,
) -> Result<Pose> {
    check_stride(stride)?;
    let num_parts = check_heatmaps_and_offsets(heatmaps, offsets)?;

    let mut pose = Pose::new(num_parts);
    for kp in argmax_per_channel(heatmaps) {
        let (row, col) = grid_cell(kp.position);
        pose.fill(Keypoint::new(
            kp.score,
            image_coords(row, col, kp.part, stride, offsets),
            kp.part,
        ));
    }
    Ok(pose)
}

/// Decode up to `config.max_poses` poses, strongest root first.
///
/// # Errors
///
/// Returns [`DecodeError::ConfigError`] for a zero stride or an invalid
/// configuration, and [`DecodeError::SkeletonError`] if the skeleton does not
/// match the tensors' part and edge counts.
pub fn decode_multiple_poses(
    outputs: &ModelOutputs<'_>,
    skeleton: &Skeleton,
    stride: u32,
    config: &DecodeConfig,
) -> Result<PoseSet> {
    check_stride(stride)?;
    config.validate()?;
    check_skeleton(outputs, skeleton)?;

    if config.max_poses == 0 {
        return Ok(Vec::new());
    }

    let mut candidates = local_maxima_candidates(
        &outputs.heatmaps,
        config.score_threshold,
        config.local_maximum_radius,
    );
    sort_candidates(&mut candidates);
    verbose!(
        "{} root candidates at score >= {}",
        candidates.len(),
        config.score_threshold
    );

    let squared_radius = config.nms_radius * config.nms_radius;
    let mut poses = Vec::with_capacity(config.max_poses);
    let mut suppressed = 0_usize;
    for candidate in candidates {
        if poses.len() >= config.max_poses {
            break;
        }
        let (row, col) = grid_cell(candidate.position);
        let root = Keypoint::new(
            candidate.score,
            image_coords(row, col, candidate.part, stride, &outputs.offsets),
            candidate.part,
        );
        if within_nms_radius(&poses, &root, squared_radius) {
            suppressed += 1;
            continue;
        }
        poses.push(grow_pose(&root, outputs, skeleton, stride));
    }

    verbose!("{} poses decoded, {suppressed} roots suppressed", poses.len());
    Ok(poses)
}

fn check_skeleton(outputs: &ModelOutputs<'_>, skeleton: &Skeleton) -> Result<()> {
    if skeleton.num_parts() != outputs.num_parts() {
        return Err(DecodeError::SkeletonError(format!(
            "skeleton spans {} parts but heatmaps have {} channels",
            skeleton.num_parts(),
            outputs.num_parts()
        )));
    }
    if skeleton.num_edges() != outputs.num_edges() {
        return Err(DecodeError::SkeletonError(format!(
            "skeleton has {} edges but displacements encode {}",
            skeleton.num_edges(),
            outputs.num_edges()
        )));
    }
    Ok(())
}

/// Grow a root keypoint, already in image coordinates, into a full pose.
///
/// Parts with no filled neighbour along the edge list stay empty.
///
/// # Errors
///
/// Returns [`DecodeError::ConfigError`] for a zero stride,
/// [`DecodeError::SkeletonError`] if the skeleton does not match the tensors,
/// and [`DecodeError::InvalidInput`] if the root's part id is not below `K`.
pub fn expand_pose(
    root: &Keypoint,
    outputs: &ModelOutputs<'_>,
    skeleton: &Skeleton,
    stride: u32,
) -> Result<Pose> {
    check_stride(stride)?;
    check_skeleton(outputs, skeleton)?;
    if root.part >= outputs.num_parts() {
        return Err(DecodeError::InvalidInput(format!(
            "root part {} is out of range for {} parts",
            root.part,
            outputs.num_parts()
        )));
    }
    Ok(grow_pose(root, outputs, skeleton, stride))
}

fn grow_pose(
    root: &Keypoint,
    outputs: &ModelOutputs<'_>,
    skeleton: &Skeleton,
    stride: u32,
) -> Pose {
    let mut pose = Pose::new(skeleton.num_parts());
    pose.fill(*root);

    for (edge_id, edge) in skeleton.edges().iter().enumerate().rev() {
        propagate(
            &mut pose,
            edge_id,
            edge.child,
            edge.parent,
            outputs,
            &outputs.displacement_bwd,
            stride,
        );
    }
    for (edge_id, edge) in skeleton.edges().iter().enumerate() {
        propagate(
            &mut pose,
            edge_id,
            edge.parent,
            edge.child,
            outputs,
            &outputs.displacement_fwd,
            stride,
        );
    }
    pose
}

fn propagate(
    pose: &mut Pose,
    edge_id: usize,
    source: usize,
    target: usize,
    outputs: &ModelOutputs<'_>,
    displacements: &TensorView<'_>,
    stride: u32,
) {
    if pose.is_filled(target) {
        return;
    }
    let Some(&source_kp) = pose.get(source) else {
        return;
    };
    pose.fill(step_along_edge(
        edge_id,
        &source_kp,
        target,
        &outputs.heatmaps,
        &outputs.offsets,
        stride,
        displacements,
    ));
}

/// Predict the keypoint at the far end of an edge.
///
/// The displacement sampled at the source's nearest grid cell moves the source
/// position to an approximate target position; the target is then placed at
/// that cell's image coordinates and scored with the raw heatmap value there,
/// without any threshold.
///
/// # Errors
///
/// Returns [`DecodeError::ConfigError`] for a zero stride and
/// [`DecodeError::InvalidInput`] if the tensors disagree on grid or channel
/// counts, or if `edge_id` or `target` is out of range for them.
pub fn traverse_edge(
    edge_id: usize,
    source: &Keypoint,
    target: usize,
    heatmaps: &TensorView<'_>,
    offsets: &TensorView<'_>,
    stride: u32,
    displacements: &TensorView<'_>,
) -> Result<Keypoint> {
    check_stride(stride)?;
    let num_parts = check_heatmaps_and_offsets(heatmaps, offsets)?;
    if displacements.height() != heatmaps.height() || displacements.width() != heatmaps.width()
    {
        return Err(DecodeError::InvalidInput(format!(
            "displacement grid {}x{} does not match heatmap grid {}x{}",
            displacements.height(),
            displacements.width(),
            heatmaps.height(),
            heatmaps.width()
        )));
    }
    if target >= num_parts {
        return Err(DecodeError::InvalidInput(format!(
            "target part {target} is out of range for {num_parts} parts"
        )));
    }
    let num_edges = displacements.channels() / 2;
    if edge_id >= num_edges {
        return Err(DecodeError::InvalidInput(format!(
            "edge {edge_id} is out of range for {num_edges} displacement edges"
        )));
    }
    Ok(step_along_edge(
        edge_id,
        source,
        target,
        heatmaps,
        offsets,
        stride,
        displacements,
    ))
}

fn step_along_edge(
    edge_id: usize,
    source: &Keypoint,
    target: usize,
    heatmaps: &TensorView<'_>,
    offsets: &TensorView<'_>,
    stride: u32,
    displacements: &TensorView<'_>,
) -> Keypoint {
    let (height, width) = (heatmaps.height(), heatmaps.width());

    let (row, col) = nearest_grid_index(source.position, stride, height, width);
    let displaced = source.position + displacement_vector(edge_id, row, col, displacements);

    let (row, col) = nearest_grid_index(displaced, stride, height, width);
    Keypoint::new(
        heatmaps.get(row, col, target),
        image_coords(row, col, target, stride, offsets),
        target,
    )
}

/// Decoder bundling a configuration with a skeleton topology.
///
/// # Example
///
/// ```rust
/// use ndarray::Array4;
/// use posenet_decode::{DecodeConfig, EstimationType, ModelOutputs, PoseDecoder, TensorView};
///
/// # fn main() -> posenet_decode::Result<()> {
/// let heatmaps = Array4::<f32>::zeros((1, 9, 9, 17));
/// let offsets = Array4::<f32>::zeros((1, 9, 9, 34));
/// let displacements = Array4::<f32>::zeros((1, 9, 9, 32));
/// let outputs = ModelOutputs::new(
///     TensorView::from_array(&heatmaps)?,
///     TensorView::from_array(&offsets)?,
///     TensorView::from_array(&displacements)?,
///     TensorView::from_array(&displacements)?,
/// )?;
///
/// let decoder = PoseDecoder::new(DecodeConfig::new().with_estimation_type(EstimationType::SinglePose))?;
/// let poses = decoder.decode(&outputs, 16)?;
/// assert_eq!(poses.len(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct PoseDecoder {
    config: DecodeConfig,
    skeleton: Skeleton,
}

impl PoseDecoder {
    /// Create a decoder for the reference 17-part skeleton.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::ConfigError`] if the configuration is invalid.
    pub fn new(config: DecodeConfig) -> Result<Self> {
        Self::with_skeleton(config, Skeleton::reference())
    }

    /// Create a decoder for a custom skeleton.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::ConfigError`] if the configuration is invalid.
    pub fn with_skeleton(config: DecodeConfig, skeleton: Skeleton) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, skeleton })
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &DecodeConfig {
        &self.config
    }

    /// The active skeleton.
    #[must_use]
    pub const fn skeleton(&self) -> &Skeleton {
        &self.skeleton
    }

    /// Decode poses according to the configured estimation type.
    ///
    /// Single-pose decoding always yields exactly one pose; multi-pose
    /// decoding yields at most `max_poses`.
    ///
    /// # Errors
    ///
    /// See [`decode_single_pose`] and [`decode_multiple_poses`].
    pub fn decode(&self, outputs: &ModelOutputs<'_>, stride: u32) -> Result<PoseSet> {
        match self.config.estimation_type {
            EstimationType::SinglePose => Ok(vec![decode_single_pose(
                &outputs.heatmaps,
                &outputs.offsets,
                stride,
            )?]),
            EstimationType::MultiPose => {
                decode_multiple_poses(outputs, &self.skeleton, stride, &self.config)
            }
        }
    }
}
