// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Decoded pose types.
//!
//! A [`Pose`] holds exactly one slot per body part. Slots start empty and are
//! filled at most once during decoding; an empty slot means the part was never
//! reached, which is distinct from a part that was reached with a zero score.

use std::ops::{Add, Mul, Sub};

use ndarray::{Array2, Array3, Axis};

/// A 2-D point or vector, `x` horizontal and `y` vertical.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point2 {
    /// Horizontal component.
    pub x: f32,
    /// Vertical component.
    pub y: f32,
}

impl Point2 {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to `other`.
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f32 {
        let d = self - other;
        d.x.mul_add(d.x, d.y * d.y)
    }
}

impl Add for Point2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Point2 {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

/// A scored body-part location.
///
/// `position` is in heatmap-grid units while scanning and in image pixels once
/// refined through the offset field.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Keypoint {
    /// Raw heatmap score.
    pub score: f32,
    /// Location, grid or image space depending on the decode stage.
    pub position: Point2,
    /// Body-part index in `[0, K)`.
    pub part: usize,
}

impl Keypoint {
    /// Create a new keypoint.
    #[must_use]
    pub const fn new(score: f32, position: Point2, part: usize) -> Self {
        Self {
            score,
            position,
            part,
        }
    }
}

/// One person's skeleton, one optional keypoint per body part.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pose {
    keypoints: Vec<Option<Keypoint>>,
}

/// Poses in decode order.
pub type PoseSet = Vec<Pose>;

impl Pose {
    /// Create a pose with `num_parts` empty slots.
    #[must_use]
    pub fn new(num_parts: usize) -> Self {
        Self {
            keypoints: vec![None; num_parts],
        }
    }

    /// Number of slots (`K`).
    #[must_use]
    pub fn len(&self) -> usize {
        self.keypoints.len()
    }

    /// Whether the pose has no slots at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keypoints.is_empty()
    }

    /// All slots, indexed by part id.
    #[must_use]
    pub fn keypoints(&self) -> &[Option<Keypoint>] {
        &self.keypoints
    }

    /// The keypoint for `part`, if it has been filled.
    #[must_use]
    pub fn get(&self, part: usize) -> Option<&Keypoint> {
        self.keypoints.get(part).and_then(Option::as_ref)
    }

    /// Whether the slot for `part` has been filled.
    #[must_use]
    pub fn is_filled(&self, part: usize) -> bool {
        self.get(part).is_some()
    }

    /// Fill the slot named by `keypoint.part`.
    ///
    /// Returns `false` and leaves the pose unchanged if the slot is already
    /// filled or the part id is out of range.
    pub fn fill(&mut self, keypoint: Keypoint) -> bool {
        match self.keypoints.get_mut(keypoint.part) {
            Some(slot) if slot.is_none() => {
                *slot = Some(keypoint);
                true
            }
            _ => false,
        }
    }

    /// Iterate over the filled keypoints in part order.
    pub fn iter(&self) -> impl Iterator<Item = &Keypoint> {
        self.keypoints.iter().flatten()
    }

    /// Number of filled slots.
    #[must_use]
    pub fn num_filled(&self) -> usize {
        self.iter().count()
    }

    /// Instance score: the sum of filled keypoint scores divided by `K`.
    #[must_use]
    pub fn score(&self) -> f32 {
        if self.keypoints.is_empty() {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let k = self.keypoints.len() as f32;
        self.iter().map(|kp| kp.score).sum::<f32>() / k
    }

    /// Filled keypoints whose score is at least `min_score`.
    pub fn visible(&self, min_score: f32) -> impl Iterator<Item = &Keypoint> {
        self.iter().filter(move |kp| kp.score >= min_score)
    }

    /// Axis-aligned box `[x1, y1, x2, y2]` around the filled keypoints.
    #[must_use]
    pub fn bounding_box(&self) -> Option<[f32; 4]> {
        self.iter().fold(None, |acc, kp| {
            let p = kp.position;
            Some(match acc {
                None => [p.x, p.y, p.x, p.y],
                Some([x1, y1, x2, y2]) => [x1.min(p.x), y1.min(p.y), x2.max(p.x), y2.max(p.y)],
            })
        })
    }

    /// Map positions into another image frame: `y * scale_y + offset_y`,
    /// `x * scale_x + offset_x`. Scores and empty slots are kept as is.
    #[must_use]
    pub fn scaled(&self, scale_y: f32, scale_x: f32, offset_y: f32, offset_x: f32) -> Self {
        let keypoints = self
            .keypoints
            .iter()
            .map(|slot| {
                slot.map(|kp| Keypoint {
                    position: Point2::new(
                        kp.position.x.mul_add(scale_x, offset_x),
                        kp.position.y.mul_add(scale_y, offset_y),
                    ),
                    ..kp
                })
            })
            .collect();
        Self { keypoints }
    }

    /// Rows of `[x, y, score]` per part; empty slots are all zero.
    #[must_use]
    pub fn to_array(&self) -> Array2<f32> {
        let mut data = Array2::zeros((self.keypoints.len(), 3));
        for (row, kp) in self.keypoints.iter().enumerate() {
            if let Some(kp) = kp {
                data[[row, 0]] = kp.position.x;
                data[[row, 1]] = kp.position.y;
                data[[row, 2]] = kp.score;
            }
        }
        data
    }
}

/// Stack poses into an `(N, K, 3)` array of `[x, y, score]`.
///
/// `K` is taken from the first pose and every pose must have the same length,
/// which holds for poses from a single decode. An empty slice yields shape
/// `(0, 0, 3)`.
#[must_use]
pub fn poses_to_array(poses: &[Pose]) -> Array3<f32> {
    let num_parts = poses.first().map_or(0, Pose::len);
    let mut data = Array3::zeros((poses.len(), num_parts, 3));
    for (i, pose) in poses.iter().enumerate() {
        data.index_axis_mut(Axis(0), i).assign(&pose.to_array());
    }
    data
}
