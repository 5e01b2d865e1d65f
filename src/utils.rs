// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Utility functions for pose suppression.

use crate::results::{Keypoint, Pose};

/// Check whether a candidate root lies within the suppression radius of any
/// already-decoded pose.
///
/// Only the keypoint of the candidate's own part is compared; poses that never
/// filled that part cannot suppress it.
///
/// # Arguments
///
/// * `poses` - Poses accepted so far.
/// * `candidate` - Root keypoint in image coordinates.
/// * `squared_radius` - Square of the NMS radius in pixels.
///
/// # Returns
///
/// `true` if some pose's same-part keypoint is at squared distance
/// `<= squared_radius`.
#[must_use]
pub fn within_nms_radius(poses: &[Pose], candidate: &Keypoint, squared_radius: f32) -> bool {
    poses.iter().any(|pose| {
        pose.get(candidate.part).is_some_and(|kp| {
            kp.position.distance_squared(candidate.position) <= squared_radius
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::Point2;

    fn pose_with(part: usize, x: f32, y: f32) -> Pose {
        let mut pose = Pose::new(3);
        pose.fill(Keypoint::new(0.9, Point2::new(x, y), part));
        pose
    }

    #[test]
    fn test_within_radius_same_part() {
        let poses = vec![pose_with(0, 10.0, 10.0)];
        let near = Keypoint::new(0.8, Point2::new(13.0, 14.0), 0);
        // Squared distance is exactly 25; the boundary is inclusive.
        assert!(within_nms_radius(&poses, &near, 25.0));
        assert!(!within_nms_radius(&poses, &near, 24.9));
    }

    #[test]
    fn test_outside_radius_or_other_part() {
        let poses = vec![pose_with(0, 10.0, 10.0)];
        let far = Keypoint::new(0.8, Point2::new(30.0, 10.0), 0);
        assert!(!within_nms_radius(&poses, &far, 100.0));
        let other = Keypoint::new(0.8, Point2::new(10.0, 10.0), 1);
        assert!(!within_nms_radius(&poses, &other, 100.0));
        assert!(!within_nms_radius(&[], &far, 100.0));
    }
}
