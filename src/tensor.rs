// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Read-only access to the network's output tensors.
//!
//! Every tensor is laid out as `[batch, row, col, channel]` with a batch of one.
//! [`ModelOutputs`] checks that the heatmap, offset and displacement tensors agree
//! on grid size and channel counts before any decoding touches them, so the
//! samplers and scanners downstream can index without bounds surprises.

use ndarray::{Array4, ArrayView2, ArrayView4, Axis};

use crate::error::{DecodeError, Result};

/// Borrowed view over a `[1, H, W, C]` float tensor.
#[derive(Debug, Clone, Copy)]
pub struct TensorView<'a> {
    view: ArrayView4<'a, f32>,
}

impl<'a> TensorView<'a> {
    /// Wrap an existing 4-D view.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::InvalidInput`] if the batch dimension is not 1 or
    /// the grid or channel dimension is empty.
    pub fn new(view: ArrayView4<'a, f32>) -> Result<Self> {
        let shape = view.shape();
        if shape[0] != 1 {
            return Err(DecodeError::InvalidInput(format!(
                "expected batch size 1, got {}",
                shape[0]
            )));
        }
        if shape[1] == 0 || shape[2] == 0 || shape[3] == 0 {
            return Err(DecodeError::InvalidInput(format!(
                "tensor has an empty dimension: {shape:?}"
            )));
        }
        Ok(Self { view })
    }

    /// View an owned array.
    ///
    /// # Errors
    ///
    /// Same conditions as [`TensorView::new`].
    pub fn from_array(array: &'a Array4<f32>) -> Result<Self> {
        Self::new(array.view())
    }

    /// View a flat, row-major NHWC buffer such as an inference runtime returns.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::InvalidInput`] if `shape` is not rank 4,
    /// [`DecodeError::ShapeError`] if the buffer length does not match it, and
    /// the [`TensorView::new`] errors otherwise.
    pub fn from_slice(shape: &[usize], data: &'a [f32]) -> Result<Self> {
        let &[n, h, w, c] = shape else {
            return Err(DecodeError::InvalidInput(format!(
                "expected a rank-4 shape, got {shape:?}"
            )));
        };
        Self::new(ArrayView4::from_shape((n, h, w, c), data)?)
    }

    /// Grid rows.
    #[must_use]
    pub fn height(&self) -> usize {
        self.view.shape()[1]
    }

    /// Grid columns.
    #[must_use]
    pub fn width(&self) -> usize {
        self.view.shape()[2]
    }

    /// Channel count.
    #[must_use]
    pub fn channels(&self) -> usize {
        self.view.shape()[3]
    }

    /// Read one scalar. Callers are expected to pass in-range indices.
    #[must_use]
    pub fn get(&self, row: usize, col: usize, channel: usize) -> f32 {
        self.view[[0, row, col, channel]]
    }

    /// The `(H, W)` plane of a single channel.
    #[must_use]
    pub fn channel(&self, channel: usize) -> ArrayView2<'a, f32> {
        self.view
            .index_axis_move(Axis(0), 0)
            .index_axis_move(Axis(2), channel)
    }

    fn same_grid(&self, other: &TensorView<'_>) -> bool {
        self.height() == other.height() && self.width() == other.width()
    }
}

/// Check that an offset tensor matches a heatmap tensor.
///
/// # Returns
///
/// The number of body parts `K`.
///
/// # Errors
///
/// Returns [`DecodeError::InvalidInput`] if the grids differ or the offset
/// tensor does not carry exactly `2K` channels.
pub fn check_heatmaps_and_offsets(
    heatmaps: &TensorView<'_>,
    offsets: &TensorView<'_>,
) -> Result<usize> {
    if !heatmaps.same_grid(offsets) {
        return Err(DecodeError::InvalidInput(format!(
            "offset grid {}x{} does not match heatmap grid {}x{}",
            offsets.height(),
            offsets.width(),
            heatmaps.height(),
            heatmaps.width()
        )));
    }
    let num_parts = heatmaps.channels();
    if offsets.channels() != 2 * num_parts {
        return Err(DecodeError::InvalidInput(format!(
            "expected {} offset channels for {num_parts} parts, got {}",
            2 * num_parts,
            offsets.channels()
        )));
    }
    Ok(num_parts)
}

/// The four tensors produced by one inference pass.
#[derive(Debug, Clone, Copy)]
pub struct ModelOutputs<'a> {
    /// Part confidence heatmaps, `[1, H, W, K]`.
    pub heatmaps: TensorView<'a>,
    /// Sub-cell offsets, `[1, H, W, 2K]` (vertical block then horizontal block).
    pub offsets: TensorView<'a>,
    /// Parent-to-child displacements, `[1, H, W, 2E]`.
    pub displacement_fwd: TensorView<'a>,
    /// Child-to-parent displacements, `[1, H, W, 2E]`.
    pub displacement_bwd: TensorView<'a>,
}

impl<'a> ModelOutputs<'a> {
    /// Bundle the four tensors after checking they agree with each other.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::InvalidInput`] on any grid or channel mismatch.
    pub fn new(
        heatmaps: TensorView<'a>,
        offsets: TensorView<'a>,
        displacement_fwd: TensorView<'a>,
        displacement_bwd: TensorView<'a>,
    ) -> Result<Self> {
        check_heatmaps_and_offsets(&heatmaps, &offsets)?;
        for (name, disp) in [("forward", &displacement_fwd), ("backward", &displacement_bwd)] {
            if !heatmaps.same_grid(disp) {
                return Err(DecodeError::InvalidInput(format!(
                    "{name} displacement grid {}x{} does not match heatmap grid {}x{}",
                    disp.height(),
                    disp.width(),
                    heatmaps.height(),
                    heatmaps.width()
                )));
            }
            if disp.channels() % 2 != 0 {
                return Err(DecodeError::InvalidInput(format!(
                    "{name} displacement channel count {} is not even",
                    disp.channels()
                )));
            }
        }
        if displacement_fwd.channels() != displacement_bwd.channels() {
            return Err(DecodeError::InvalidInput(format!(
                "forward and backward displacements disagree: {} vs {} channels",
                displacement_fwd.channels(),
                displacement_bwd.channels()
            )));
        }
        Ok(Self {
            heatmaps,
            offsets,
            displacement_fwd,
            displacement_bwd,
        })
    }

    /// Number of body parts `K`.
    #[must_use]
    pub fn num_parts(&self) -> usize {
        self.heatmaps.channels()
    }

    /// Number of skeleton edges `E`.
    #[must_use]
    pub fn num_edges(&self) -> usize {
        self.displacement_fwd.channels() / 2
    }
}
