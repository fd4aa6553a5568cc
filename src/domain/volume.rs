// ============================================================
// Layer 3 — Volume Domain Types
// ============================================================
// A Volume is a dense (height, width, depth) stack of u8 slices.
// A VolumePair is one HR volume plus one LR volume per scale,
// all with the same depth so slice i means the same physical
// cross-section in every member.
//
// Volumes are immutable once loaded and shared behind Arc, so
// many data-loader workers can read them at once.

use std::sync::Arc;

use ndarray::{Array3, ArrayView2, ArrayView3, Axis};

use crate::domain::subject::VolumeDims;
use crate::error::{DataError, Result};

/// A single HWC image (height, width, channel).
pub type Image<A> = Array3<A>;

/// One loaded scan volume.
#[derive(Debug, Clone)]
pub struct Volume {
    data: Arc<Array3<u8>>,
}

impl Volume {
    /// Wrap a flat row-major buffer as a (nx, ny, nz) volume.
    /// The length must match exactly; nothing is resized.
    pub fn from_raw(bytes: Vec<u8>, dims: VolumeDims) -> Result<Self> {
        let expected = dims.voxel_count();
        let actual   = bytes.len();
        let data = Array3::from_shape_vec((dims.nx, dims.ny, dims.nz), bytes).map_err(|_| {
            DataError::config(format!(
                "buffer of {actual} bytes cannot be reshaped to {dims} ({expected} voxels)"
            ))
        })?;
        Ok(Self { data: Arc::new(data) })
    }

    #[cfg(test)]
    pub fn from_array(data: Array3<u8>) -> Self {
        Self { data: Arc::new(data) }
    }

    pub fn dims(&self) -> VolumeDims {
        let (nx, ny, nz) = self.data.dim();
        VolumeDims::new(nx, ny, nz)
    }

    /// Number of independent 2D slices (the depth axis).
    pub fn num_slices(&self) -> usize {
        self.data.len_of(Axis(2))
    }

    /// Borrow slice `z` as a (height, width) view.
    pub fn slice(&self, z: usize) -> Result<ArrayView2<'_, u8>> {
        let len = self.num_slices();
        if z >= len {
            return Err(DataError::Index { index: z, len });
        }
        Ok(self.data.index_axis(Axis(2), z))
    }

    /// Borrow slice `z` with a trailing channel axis of size 1.
    pub fn slice_hwc(&self, z: usize) -> Result<ArrayView3<'_, u8>> {
        Ok(self.slice(z)?.insert_axis(Axis(2)))
    }

    #[cfg(test)]
    pub fn as_array(&self) -> &Array3<u8> {
        &self.data
    }
}

/// HR volume plus one LR volume per scale factor.
#[derive(Debug, Clone)]
pub struct VolumePair {
    pub hr:     Volume,
    pub lr:     Vec<Volume>,
    pub scales: Vec<usize>,
}

impl VolumePair {
    /// Assemble a pair, checking that every LR volume shares the HR depth
    /// and matches `hr / scale` in-plane.
    pub fn new(hr: Volume, lr: Vec<Volume>, scales: Vec<usize>) -> Result<Self> {
        if lr.len() != scales.len() {
            return Err(DataError::config(format!(
                "{} LR volumes for {} scales",
                lr.len(),
                scales.len()
            )));
        }

        let hr_dims = hr.dims();
        for (volume, &scale) in lr.iter().zip(&scales) {
            let want = hr_dims.downscaled(scale);
            let got  = volume.dims();
            if got != want {
                return Err(DataError::config(format!(
                    "LR volume at x{scale} is {got}, expected {want} for HR {hr_dims}"
                )));
            }
        }

        Ok(Self { hr, lr, scales })
    }

    pub fn num_slices(&self) -> usize {
        self.hr.num_slices()
    }

    pub fn lr_at(&self, scale_index: usize) -> Result<&Volume> {
        self.lr.get(scale_index).ok_or_else(|| {
            DataError::config(format!(
                "scale index {scale_index} out of range for {} scales",
                self.scales.len()
            ))
        })
    }
}
