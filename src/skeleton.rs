// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Skeleton topology used to walk from one keypoint to the next.

use crate::error::{DecodeError, Result};

/// Body-part names in heatmap channel order.
pub const PART_NAMES: [&str; 17] = [
    "nose",
    "leftEye",
    "rightEye",
    "leftEar",
    "rightEar",
    "leftShoulder",
    "rightShoulder",
    "leftElbow",
    "rightElbow",
    "leftWrist",
    "rightWrist",
    "leftHip",
    "rightHip",
    "leftKnee",
    "rightKnee",
    "leftAnkle",
    "rightAnkle",
];

/// Parent/child pairs of the reference skeleton, rooted at the nose.
/// Index `i` selects displacement channels `i` and `i + 16`.
pub const POSE_CHAIN: [SkeletonEdge; 16] = [
    SkeletonEdge::new(0, 1),   // nose -> left eye
    SkeletonEdge::new(1, 3),   // left eye -> left ear
    SkeletonEdge::new(0, 2),   // nose -> right eye
    SkeletonEdge::new(2, 4),   // right eye -> right ear
    SkeletonEdge::new(0, 5),   // nose -> left shoulder
    SkeletonEdge::new(5, 7),   // left shoulder -> left elbow
    SkeletonEdge::new(7, 9),   // left elbow -> left wrist
    SkeletonEdge::new(5, 11),  // left shoulder -> left hip
    SkeletonEdge::new(11, 13), // left hip -> left knee
    SkeletonEdge::new(13, 15), // left knee -> left ankle
    SkeletonEdge::new(0, 6),   // nose -> right shoulder
    SkeletonEdge::new(6, 8),   // right shoulder -> right elbow
    SkeletonEdge::new(8, 10),  // right elbow -> right wrist
    SkeletonEdge::new(6, 12),  // right shoulder -> right hip
    SkeletonEdge::new(12, 14), // right hip -> right knee
    SkeletonEdge::new(14, 16), // right knee -> right ankle
];

/// A directed parent-to-child edge between two part ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SkeletonEdge {
    /// Part closer to the root.
    pub parent: usize,
    /// Part further from the root.
    pub child: usize,
}

impl SkeletonEdge {
    /// Create a new edge.
    #[must_use]
    pub const fn new(parent: usize, child: usize) -> Self {
        Self { parent, child }
    }
}

/// Ordered edge list over `num_parts` part ids.
///
/// Edge order is the traversal order of pose expansion and also the channel
/// order of the displacement tensors, so it must match the network exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skeleton {
    num_parts: usize,
    edges: Vec<SkeletonEdge>,
}

impl Skeleton {
    /// Build a custom topology.
    ///
    /// Parts need not all be reachable; an unreachable part is simply never
    /// filled during expansion.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::SkeletonError`] if an id is out of range, an edge
    /// is a self-loop, or a child has more than one parent.
    pub fn new(num_parts: usize, edges: Vec<SkeletonEdge>) -> Result<Self> {
        let mut has_parent = vec![false; num_parts];
        for (id, edge) in edges.iter().enumerate() {
            if edge.parent >= num_parts || edge.child >= num_parts {
                return Err(DecodeError::SkeletonError(format!(
                    "edge {id} ({} -> {}) references a part outside 0..{num_parts}",
                    edge.parent, edge.child
                )));
            }
            if edge.parent == edge.child {
                return Err(DecodeError::SkeletonError(format!(
                    "edge {id} is a self-loop on part {}",
                    edge.parent
                )));
            }
            if std::mem::replace(&mut has_parent[edge.child], true) {
                return Err(DecodeError::SkeletonError(format!(
                    "part {} has more than one parent (edge {id})",
                    edge.child
                )));
            }
        }
        Ok(Self { num_parts, edges })
    }

    /// The 17-part, 16-edge reference skeleton.
    #[must_use]
    pub fn reference() -> Self {
        Self {
            num_parts: PART_NAMES.len(),
            edges: POSE_CHAIN.to_vec(),
        }
    }

    /// Number of part ids the topology spans.
    #[must_use]
    pub const fn num_parts(&self) -> usize {
        self.num_parts
    }

    /// Edges in traversal order.
    #[must_use]
    pub fn edges(&self) -> &[SkeletonEdge] {
        &self.edges
    }

    /// Number of edges (`E`).
    #[must_use]
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }
}

impl Default for Skeleton {
    fn default() -> Self {
        Self::reference()
    }
}

/// Reference name of a part id.
#[must_use]
pub fn part_name(part: usize) -> Option<&'static str> {
    PART_NAMES.get(part).copied()
}

/// Part id for a reference part name.
#[must_use]
pub fn part_id(name: &str) -> Option<usize> {
    PART_NAMES.iter().position(|&n| n == name)
}
