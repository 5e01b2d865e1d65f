// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Heatmap scanning.
//!
//! Two entry points: a per-channel global argmax for single-person decoding, and
//! a thresholded local-maximum search that produces root candidates for
//! multi-person decoding. Both emit keypoints in grid coordinates; refinement
//! through the offset field is left to the caller.

#![allow(clippy::cast_precision_loss)]

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::results::{Keypoint, Point2};
use crate::tensor::TensorView;

/// Highest-scoring cell of every heatmap channel.
///
/// Cells are visited row by row, column by column; a later cell replaces the
/// current best only with a strictly greater score, so ties keep the first cell
/// in that order. The result has one keypoint per channel, indexed by part id.
#[must_use]
pub fn argmax_per_channel(heatmaps: &TensorView<'_>) -> Vec<Keypoint> {
    let parts = 0..heatmaps.channels();
    #[cfg(feature = "parallel")]
    let parts = parts.into_par_iter();
    parts.map(|part| channel_argmax(heatmaps, part)).collect()
}

fn channel_argmax(heatmaps: &TensorView<'_>, part: usize) -> Keypoint {
    let plane = heatmaps.channel(part);
    let mut best = (0, 0, plane[[0, 0]]);
    for ((row, col), &score) in plane.indexed_iter() {
        if score > best.2 {
            best = (row, col, score);
        }
    }
    let (row, col, score) = best;
    Keypoint::new(score, Point2::new(col as f32, row as f32), part)
}

/// Every cell that scores at least `score_threshold` and is not beaten by any
/// cell in the surrounding `(2 * radius + 1)²` window of its own channel.
///
/// The window is clipped at the grid border. Equal neighbours do not
/// disqualify a cell, so a flat plateau yields one candidate per cell.
/// Candidates come out channel by channel, each channel scanned row by row;
/// use [`sort_candidates`] to rank them.
#[must_use]
pub fn local_maxima_candidates(
    heatmaps: &TensorView<'_>,
    score_threshold: f32,
    radius: usize,
) -> Vec<Keypoint> {
    let parts = 0..heatmaps.channels();
    #[cfg(feature = "parallel")]
    let parts = parts.into_par_iter();
    let per_channel: Vec<Vec<Keypoint>> = parts
        .map(|part| channel_candidates(heatmaps, part, score_threshold, radius))
        .collect();
    per_channel.into_iter().flatten().collect()
}

fn channel_candidates(
    heatmaps: &TensorView<'_>,
    part: usize,
    score_threshold: f32,
    radius: usize,
) -> Vec<Keypoint> {
    let plane = heatmaps.channel(part);
    let mut found = Vec::new();
    for ((row, col), &score) in plane.indexed_iter() {
        if score.is_nan() || score < score_threshold {
            continue;
        }
        if is_local_maximum(heatmaps, row, col, part, score, radius) {
            found.push(Keypoint::new(score, Point2::new(col as f32, row as f32), part));
        }
    }
    found
}

fn is_local_maximum(
    heatmaps: &TensorView<'_>,
    row: usize,
    col: usize,
    part: usize,
    score: f32,
    radius: usize,
) -> bool {
    let row_end = (row + radius).min(heatmaps.height() - 1);
    let col_end = (col + radius).min(heatmaps.width() - 1);
    for r in row.saturating_sub(radius)..=row_end {
        for c in col.saturating_sub(radius)..=col_end {
            if heatmaps.get(r, c, part) > score {
                return false;
            }
        }
    }
    true
}

/// Sort candidates by descending score. The sort is stable, so equal scores
/// keep their discovery order.
pub fn sort_candidates(candidates: &mut [Keypoint]) {
    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
}
