// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Integration tests for the pose decoder

use ndarray::Array4;
use posenet_decode::{
    DecodeConfig, DecodeError, EstimationType, ModelOutputs, Point2, PoseDecoder, Skeleton,
    SkeletonEdge, TensorView, decode_multiple_poses, decode_single_pose, poses_to_array,
};

struct Tensors {
    heat: Array4<f32>,
    off: Array4<f32>,
    fwd: Array4<f32>,
    bwd: Array4<f32>,
}

impl Tensors {
    fn zeros(height: usize, width: usize, parts: usize, edges: usize) -> Self {
        Self {
            heat: Array4::zeros((1, height, width, parts)),
            off: Array4::zeros((1, height, width, 2 * parts)),
            fwd: Array4::zeros((1, height, width, 2 * edges)),
            bwd: Array4::zeros((1, height, width, 2 * edges)),
        }
    }

    fn outputs(&self) -> ModelOutputs<'_> {
        ModelOutputs::new(
            TensorView::from_array(&self.heat).unwrap(),
            TensorView::from_array(&self.off).unwrap(),
            TensorView::from_array(&self.fwd).unwrap(),
            TensorView::from_array(&self.bwd).unwrap(),
        )
        .unwrap()
    }
}

#[test]
fn test_three_part_scenario() {
    // K = 3, one edge (0, 1); part 2 is not connected.
    let mut t = Tensors::zeros(4, 4, 3, 1);
    t.heat[[0, 1, 1, 0]] = 0.9;
    t.heat[[0, 2, 2, 1]] = 0.8;
    // Forward displacement from part 0 at (1, 1) points one cell down-right.
    t.fwd[[0, 1, 1, 0]] = 8.0;
    t.fwd[[0, 1, 1, 1]] = 8.0;
    let outputs = t.outputs();

    let skeleton = Skeleton::new(3, vec![SkeletonEdge::new(0, 1)]).unwrap();
    let config = DecodeConfig::new()
        .with_score_threshold(0.5)
        .with_max_poses(5)
        .with_nms_radius(20.0);
    let poses = decode_multiple_poses(&outputs, &skeleton, 8, &config).unwrap();

    // The part-1 candidate lands on the first pose's part 1 and is suppressed.
    assert_eq!(poses.len(), 1);
    let pose = &poses[0];
    assert_eq!(pose.len(), 3);
    assert!((pose.get(0).unwrap().score - 0.9).abs() < f32::EPSILON);
    assert!((pose.get(1).unwrap().score - 0.8).abs() < f32::EPSILON);
    assert_eq!(pose.get(1).unwrap().position, Point2::new(16.0, 16.0));
    assert!(pose.get(2).is_none());
}

#[test]
fn test_single_pose_round_trip() {
    let mut t = Tensors::zeros(6, 7, 4, 3);
    // Spike for part 2 at (row 4, col 5) with offset (x 3.25, y -1.5).
    t.heat[[0, 4, 5, 2]] = 0.95;
    t.off[[0, 4, 5, 2]] = -1.5;
    t.off[[0, 4, 5, 2 + 4]] = 3.25;
    let outputs = t.outputs();

    let pose = decode_single_pose(&outputs.heatmaps, &outputs.offsets, 16).unwrap();
    let kp = pose.get(2).unwrap();
    assert_eq!(kp.position, Point2::new(5.0 * 16.0 + 3.25, 4.0 * 16.0 - 1.5));
    assert!((kp.score - 0.95).abs() < f32::EPSILON);
    assert_eq!(pose.num_filled(), 4);
}

#[test]
fn test_reference_skeleton_full_expansion() {
    // Every heatmap peaks on one cell and all displacements are zero, so a
    // single root reaches all 17 parts at the same location.
    let mut t = Tensors::zeros(9, 9, 17, 16);
    for part in 0..17 {
        t.heat[[0, 4, 4, part]] = 0.6;
    }
    // Make the left ankle the strongest root to force the backward pass.
    t.heat[[0, 4, 4, 15]] = 0.99;
    let outputs = t.outputs();

    let decoder = PoseDecoder::new(DecodeConfig::new().with_max_poses(20)).unwrap();
    let poses = decoder.decode(&outputs, 8).unwrap();

    assert_eq!(poses.len(), 1);
    let pose = &poses[0];
    assert_eq!(pose.num_filled(), 17);
    assert!((pose.get(15).unwrap().score - 0.99).abs() < f32::EPSILON);
    assert!(pose.iter().all(|kp| kp.position == Point2::new(32.0, 32.0)));
    assert_eq!(pose.bounding_box(), Some([32.0, 32.0, 32.0, 32.0]));
}

#[test]
fn test_multi_pose_order_and_cap() {
    let mut t = Tensors::zeros(10, 10, 2, 1);
    let peaks = [(0, 0, 0.55), (0, 5, 0.95), (5, 0, 0.75), (5, 5, 0.85), (9, 9, 0.65)];
    for &(row, col, score) in &peaks {
        t.heat[[0, row, col, 0]] = score;
    }
    let outputs = t.outputs();
    let skeleton = Skeleton::new(2, vec![SkeletonEdge::new(0, 1)]).unwrap();

    for cap in 1..=6 {
        let config = DecodeConfig::new().with_max_poses(cap).with_nms_radius(8.0);
        let poses = decode_multiple_poses(&outputs, &skeleton, 8, &config).unwrap();
        assert_eq!(poses.len(), cap.min(peaks.len()));
        let roots: Vec<f32> = poses.iter().map(|p| p.get(0).unwrap().score).collect();
        assert!(roots.windows(2).all(|w| w[0] >= w[1]));
    }

    let config = DecodeConfig::new().with_max_poses(3).with_nms_radius(8.0);
    let poses = decode_multiple_poses(&outputs, &skeleton, 8, &config).unwrap();
    let array = poses_to_array(&poses);
    assert_eq!(array.shape(), &[3, 2, 3]);
    assert_eq!(array[[0, 0, 0]], 40.0);
    assert_eq!(array[[0, 0, 1]], 0.0);
}

#[test]
fn test_equal_roots_resolve_in_channel_order() {
    // Parts 0 and 1 peak at the same score in opposite corners.
    let mut t = Tensors::zeros(4, 4, 2, 1);
    t.heat[[0, 3, 3, 0]] = 0.8;
    t.heat[[0, 0, 0, 1]] = 0.8;
    let outputs = t.outputs();
    let skeleton = Skeleton::new(2, vec![SkeletonEdge::new(0, 1)]).unwrap();

    let config = DecodeConfig::new().with_max_poses(1);
    let poses = decode_multiple_poses(&outputs, &skeleton, 8, &config).unwrap();
    assert_eq!(poses.len(), 1);
    let root = poses[0].get(0).unwrap();
    assert_eq!(root.position, Point2::new(24.0, 24.0));
    assert!((root.score - 0.8).abs() < f32::EPSILON);
    // Zero displacement keeps part 1 on the root cell, where its heatmap is 0.
    assert_eq!(poses[0].get(1).unwrap().score, 0.0);

    let config = DecodeConfig::new().with_max_poses(2);
    let poses = decode_multiple_poses(&outputs, &skeleton, 8, &config).unwrap();
    assert_eq!(poses.len(), 2);
    let second = poses[1].get(1).unwrap();
    assert_eq!(second.position, Point2::new(0.0, 0.0));
    assert!((second.score - 0.8).abs() < f32::EPSILON);
}

#[test]
fn test_mismatched_tensors_fail_fast() {
    let heat = Array4::<f32>::zeros((1, 4, 4, 3));
    let off = Array4::<f32>::zeros((1, 4, 5, 6));
    let disp = Array4::<f32>::zeros((1, 4, 4, 2));
    let result = ModelOutputs::new(
        TensorView::from_array(&heat).unwrap(),
        TensorView::from_array(&off).unwrap(),
        TensorView::from_array(&disp).unwrap(),
        TensorView::from_array(&disp).unwrap(),
    );
    assert!(matches!(result, Err(DecodeError::InvalidInput(_))));
}

#[test]
fn test_single_pose_via_decoder_ignores_threshold() {
    let t = Tensors::zeros(5, 5, 17, 16);
    let outputs = t.outputs();
    let decoder = PoseDecoder::new(
        DecodeConfig::new()
            .with_estimation_type(EstimationType::SinglePose)
            .with_score_threshold(0.9),
    )
    .unwrap();
    let poses = decoder.decode(&outputs, 8).unwrap();
    assert_eq!(poses.len(), 1);
    assert_eq!(poses[0].num_filled(), 17);
    assert_eq!(poses[0].score(), 0.0);
}
