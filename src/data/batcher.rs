// ============================================================
// Layer 4 — SR Batcher
// ============================================================
// Implements Burn's Batcher trait to stack SrSamples into
// [batch, channel, height, width] tensors.
//
//   Input:  N samples, lr (C, h, w), hr (C, H, W)
//   Output: SrBatch { lr: [N, C, h, w], hr: [N, C, H, W] }
//
// Samples are already standard-layout CHW arrays, so each one is
// appended to a flat Vec in order and the result reshaped once.
// Every sample in a batch must share one shape: the training
// phase guarantees it (fixed patch size), the evaluation phase
// does too because all slices of a volume have the same size.

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};
use ndarray::Array3;

use crate::data::dataset::SrSample;

#[derive(Debug, Clone)]
pub struct SrBatch<B: Backend> {
    /// Low-resolution input — [batch, channels, h, w]
    pub lr: Tensor<B, 4>,

    /// High-resolution target — [batch, channels, H, W]
    pub hr: Tensor<B, 4>,

    /// Logical dataset index of every row
    pub indices: Vec<usize>,
}

#[derive(Clone, Debug)]
pub struct SrBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> SrBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }

    fn stack(&self, images: Vec<&Array3<f32>>) -> Tensor<B, 4> {
        let n = images.len();
        let (c, h, w) = images.first().map(|a| a.dim()).unwrap_or((0, 0, 0));

        let mut flat = Vec::with_capacity(n * c * h * w);
        for img in images {
            debug_assert_eq!(img.dim(), (c, h, w), "mixed sample shapes in one batch");
            flat.extend(img.iter().copied());
        }

        Tensor::<B, 1>::from_floats(flat.as_slice(), &self.device).reshape([n, c, h, w])
    }
}

impl<B: Backend> Batcher<SrSample, SrBatch<B>> for SrBatcher<B> {
    fn batch(&self, items: Vec<SrSample>) -> SrBatch<B> {
        let lr = self.stack(items.iter().map(|s| &s.lr).collect());
        let hr = self.stack(items.iter().map(|s| &s.hr).collect());
        let indices = items.iter().map(|s| s.index).collect();

        SrBatch { lr, hr, indices }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    fn sample(index: usize, fill: f32) -> SrSample {
        SrSample {
            lr: Array3::from_elem((1, 2, 3), fill),
            hr: Array3::from_shape_fn((1, 4, 6), |(_, y, x)| fill + (y * 6 + x) as f32),
            index,
        }
    }

    #[test]
    fn test_batch_shapes_and_order() {
        let batcher = SrBatcher::<TestBackend>::new(Default::default());
        let batch   = batcher.batch(vec![sample(7, 1.0), sample(3, 2.0)]);

        assert_eq!(batch.lr.dims(), [2, 1, 2, 3]);
        assert_eq!(batch.hr.dims(), [2, 1, 4, 6]);
        assert_eq!(batch.indices, vec![7, 3]);

        let hr: Vec<f32> = batch.hr.into_data().to_vec().unwrap();
        // second sample, row 1, col 2 → 2.0 + 8
        assert_eq!(hr[24 + 6 + 2], 10.0);
    }
}
