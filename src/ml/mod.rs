// ============================================================
// Layer 5 — ML Layer (Burn)
// ============================================================
// Tensor-level consumers of the data pipeline:
//
//   upscaler.rs  — SuperResolver trait + nearest-neighbour baseline
//   psnr.rs      — PSNR with border shaving, 8-bit quantisation
//   evaluator.rs — per-slice evaluation loop over a dataset
//
// The backend is NdArray (CPU) unless the `backend-wgpu`
// feature is enabled.

/// SuperResolver trait and the nearest-neighbour baseline
pub mod upscaler;

/// PSNR metric and quantisation
pub mod psnr;

/// Evaluation loop over an evaluation-phase dataset
pub mod evaluator;

#[cfg(feature = "backend-wgpu")]
pub type EvalBackend = burn::backend::Wgpu;
#[cfg(not(feature = "backend-wgpu"))]
pub type EvalBackend = burn::backend::NdArray;

/// Default device of the selected backend.
pub fn default_device() -> <EvalBackend as burn::tensor::backend::Backend>::Device {
    Default::default()
}
