// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Conversions between heatmap-grid and image space, and vector lookups in the
//! offset and displacement fields.
//!
//! Offsets are stored as a vertical block of `K` channels followed by a
//! horizontal block of `K` channels; displacements follow the same layout with
//! `E` channels per block. All functions here return `(x, y)` ordered points.

#![allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]

use crate::error::{DecodeError, Result};
use crate::results::Point2;
use crate::tensor::TensorView;
use crate::warn;

/// Sub-cell offset for `part` at a grid cell.
#[must_use]
pub fn offset_vector(row: usize, col: usize, part: usize, offsets: &TensorView<'_>) -> Point2 {
    let num_parts = offsets.channels() / 2;
    Point2::new(
        offsets.get(row, col, part + num_parts),
        offsets.get(row, col, part),
    )
}

/// Image-space position of `part` at a grid cell: `cell * stride + offset`.
#[must_use]
pub fn image_coords(
    row: usize,
    col: usize,
    part: usize,
    stride: u32,
    offsets: &TensorView<'_>,
) -> Point2 {
    let s = stride as f32;
    Point2::new(col as f32 * s, row as f32 * s) + offset_vector(row, col, part, offsets)
}

/// Grid cell `(row, col)` nearest to an image-space point, clamped per axis to
/// `[0, height - 1]` and `[0, width - 1]`.
///
/// Rounding uses [`f32::round`], so a point exactly halfway between two cells
/// goes to the cell farther from zero (`0.5 -> 1`, `1.5 -> 2`, `2.5 -> 3`)
/// rather than to the even one. A NaN coordinate maps to cell 0.
#[must_use]
pub fn nearest_grid_index(
    point: Point2,
    stride: u32,
    height: usize,
    width: usize,
) -> (usize, usize) {
    let s = stride as f32;
    (
        clamp_index(point.y / s, height),
        clamp_index(point.x / s, width),
    )
}

fn clamp_index(value: f32, dim: usize) -> usize {
    let rounded = value.round();
    if rounded.is_nan() || rounded <= 0.0 {
        return 0;
    }
    (rounded as usize).min(dim.saturating_sub(1))
}

/// Grid cell of a keypoint still in grid coordinates.
#[must_use]
pub fn grid_cell(position: Point2) -> (usize, usize) {
    (position.y.max(0.0) as usize, position.x.max(0.0) as usize)
}

/// Displacement along `edge` sampled at a grid cell.
#[must_use]
pub fn displacement_vector(
    edge: usize,
    row: usize,
    col: usize,
    displacements: &TensorView<'_>,
) -> Point2 {
    let num_edges = displacements.channels() / 2;
    Point2::new(
        displacements.get(row, col, edge + num_edges),
        displacements.get(row, col, edge),
    )
}

/// Reject a zero stride.
///
/// # Errors
///
/// Returns [`DecodeError::ConfigError`] if `stride` is 0.
pub fn check_stride(stride: u32) -> Result<()> {
    if stride == 0 {
        return Err(DecodeError::ConfigError(
            "stride must be a positive integer".to_string(),
        ));
    }
    Ok(())
}

/// Derive the output stride from the network input size and the heatmap size:
/// `(image_size - 1) / (grid_size - 1)`, rounded down to a multiple of 8.
///
/// # Errors
///
/// Returns [`DecodeError::InvalidInput`] if `grid_size < 2` and
/// [`DecodeError::ConfigError`] if the derived stride is 0.
pub fn output_stride(image_size: u32, grid_size: u32) -> Result<u32> {
    if grid_size < 2 {
        return Err(DecodeError::InvalidInput(format!(
            "heatmap dimension must be at least 2 to derive a stride, got {grid_size}"
        )));
    }
    let raw = image_size.saturating_sub(1) / (grid_size - 1);
    let stride = raw - raw % 8;
    check_stride(stride)?;
    if image_size.saturating_sub(1) % (grid_size - 1) != 0 || stride != raw {
        warn!(
            "input size {image_size} does not map exactly onto a {grid_size}-cell grid, using stride {stride}"
        );
    }
    Ok(stride)
}

#[cfg(test)]
mod tests {
    use ndarray::Array4;

    use super::*;

    #[test]
    fn test_offset_vector_layout() {
        // K = 2: channel 1 is part 1's y, channel 3 is part 1's x.
        let mut off = Array4::<f32>::zeros((1, 2, 2, 4));
        off[[0, 1, 0, 1]] = 3.0;
        off[[0, 1, 0, 3]] = -2.0;
        let view = TensorView::from_array(&off).unwrap();
        assert_eq!(offset_vector(1, 0, 1, &view), Point2::new(-2.0, 3.0));
        assert_eq!(offset_vector(1, 0, 0, &view), Point2::new(0.0, 0.0));
    }

    #[test]
    fn test_image_coords() {
        let mut off = Array4::<f32>::zeros((1, 4, 4, 2));
        off[[0, 2, 3, 0]] = 1.5;
        off[[0, 2, 3, 1]] = -0.5;
        let view = TensorView::from_array(&off).unwrap();
        assert_eq!(image_coords(2, 3, 0, 16, &view), Point2::new(47.5, 33.5));
    }

    #[test]
    fn test_nearest_grid_index_rounds() {
        assert_eq!(nearest_grid_index(Point2::new(11.0, 21.0), 8, 4, 4), (3, 1));
        assert_eq!(nearest_grid_index(Point2::new(3.9, 4.1), 8, 4, 4), (1, 0));
    }

    #[test]
    fn test_nearest_grid_index_rounds_halves_up() {
        // 4 / 8 = 0.5, 12 / 8 = 1.5, 20 / 8 = 2.5
        assert_eq!(nearest_grid_index(Point2::new(12.0, 4.0), 8, 4, 4), (1, 2));
        assert_eq!(nearest_grid_index(Point2::new(20.0, 20.0), 8, 4, 4), (3, 3));
    }

    #[test]
    fn test_nearest_grid_index_clamps() {
        assert_eq!(nearest_grid_index(Point2::new(-30.0, -0.1), 8, 4, 5), (0, 0));
        assert_eq!(nearest_grid_index(Point2::new(40.0, 32.0), 8, 4, 5), (3, 4));
        assert_eq!(nearest_grid_index(Point2::new(1e9, 1e9), 8, 4, 5), (3, 4));
        assert_eq!(nearest_grid_index(Point2::new(f32::NAN, 8.0), 8, 4, 5), (1, 0));
    }

    #[test]
    fn test_displacement_vector_layout() {
        // E = 3: channel 2 is edge 2's y, channel 5 is edge 2's x.
        let mut disp = Array4::<f32>::zeros((1, 3, 3, 6));
        disp[[0, 2, 1, 2]] = 7.0;
        disp[[0, 2, 1, 5]] = -4.0;
        let view = TensorView::from_array(&disp).unwrap();
        assert_eq!(displacement_vector(2, 2, 1, &view), Point2::new(-4.0, 7.0));
    }

    #[test]
    fn test_grid_cell() {
        assert_eq!(grid_cell(Point2::new(3.0, 2.0)), (2, 3));
    }

    #[test]
    fn test_output_stride() {
        assert_eq!(output_stride(257, 33).unwrap(), 8);
        assert_eq!(output_stride(513, 33).unwrap(), 16);
        // 300 - 1 = 299, 299 / 18 = 16
        assert_eq!(output_stride(300, 19).unwrap(), 16);
        // 23 / 2 = 11 -> 8
        assert_eq!(output_stride(24, 3).unwrap(), 8);
        assert!(matches!(output_stride(257, 1), Err(DecodeError::InvalidInput(_))));
        assert!(matches!(output_stride(33, 9), Err(DecodeError::ConfigError(_))));
    }

    #[test]
    fn test_check_stride() {
        assert!(check_stride(0).is_err());
        assert!(check_stride(8).is_ok());
    }
}
