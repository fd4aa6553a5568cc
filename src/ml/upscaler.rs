// ============================================================
// Layer 5 — Super-Resolvers
// ============================================================
// Anything that turns an LR batch into an SR batch at a given
// scale. The evaluator only sees this trait, so a learned model
// can replace the nearest-neighbour baseline without touching
// the evaluation code.

use burn::prelude::*;

pub trait SuperResolver<B: Backend> {
    /// lr: [batch, channels, h, w] → [batch, channels, h*scale, w*scale]
    fn upscale(&self, lr: Tensor<B, 4>, scale: usize) -> Tensor<B, 4>;

    /// Short name used in logs and metric rows
    fn name(&self) -> &str;
}

/// Pixel replication: every LR pixel becomes a scale x scale block.
#[derive(Debug, Clone, Copy, Default)]
pub struct NearestUpscaler;

impl<B: Backend> SuperResolver<B> for NearestUpscaler {
    fn upscale(&self, lr: Tensor<B, 4>, scale: usize) -> Tensor<B, 4> {
        if scale <= 1 {
            return lr;
        }
        let [n, c, h, w] = lr.dims();

        // [n, c, h, 1, w, 1] → broadcast → [n, c, h, s, w, s] → merge
        lr.reshape([n, c, h, 1, w, 1])
            .expand([n, c, h, scale, w, scale])
            .reshape([n, c, h * scale, w * scale])
    }

    fn name(&self) -> &str {
        "nearest"
    }
}
