// ============================================================
// Layer 5 — Evaluation Loop
// ============================================================
// Runs a SuperResolver over every slice of an evaluation dataset
// at one scale and averages the PSNR against the HR slices.
// Slices are read one by one with `get_item`, in order, so the
// SR output can be written back at its own depth index.
//
// Per slice:
//   SrSample ─► SrBatcher (batch of 1) ─► upscale ─► quantize
//            ─► calc_psnr vs HR crop
//
// The upscale always uses the dataset's scale: the HR crop is
// `scale` times the LR slice in both sampling modes.
//
// Optionally the quantised SR slices are reassembled into a u8
// volume (height, width, depth) so they can be written back out
// in the same raw layout as the inputs.

use anyhow::{Context, Result};
use burn::{data::dataloader::batcher::Batcher, prelude::*};
use ndarray::{Array2, Array3, Axis};

use crate::data::batcher::SrBatcher;
use crate::data::dataset::VolumetricPairDataset;
use crate::ml::psnr::{calc_psnr, quantize};
use crate::infra::timer::Timer;
use crate::ml::upscaler::SuperResolver;

/// Result of evaluating one dataset at one scale.
#[derive(Debug, Clone)]
pub struct EvalReport {
    pub dataset:   String,
    pub scale:     usize,
    pub psnr:      f64,
    pub slices:    usize,
    /// Seconds spent inside the model, data loading excluded
    pub model_seconds: f64,
    /// Quantised SR output, present when results are kept
    pub sr_volume: Option<Array3<u8>>,
}

pub struct Evaluator<B: Backend, M> {
    model:        M,
    batcher:      SrBatcher<B>,
    rgb_range:    f64,
    benchmark:    bool,
    keep_results: bool,
}

impl<B: Backend, M: SuperResolver<B>> Evaluator<B, M> {
    pub fn new(model: M, device: B::Device, rgb_range: f64) -> Self {
        Self {
            model,
            batcher: SrBatcher::new(device),
            rgb_range,
            benchmark: false,
            keep_results: false,
        }
    }

    /// Shave `scale` instead of `scale + 6` and compare on luma.
    pub fn with_benchmark(mut self, benchmark: bool) -> Self {
        self.benchmark = benchmark;
        self
    }

    /// Reassemble and return the SR volume.
    pub fn with_keep_results(mut self, keep: bool) -> Self {
        self.keep_results = keep;
        self
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    pub fn evaluate(
        &self,
        dataset:     &mut VolumetricPairDataset,
        scale_index: usize,
    ) -> Result<EvalReport> {
        dataset.set_active_scale(scale_index)?;
        let scale = dataset.active_scale();
        let total = dataset.length();

        tracing::info!(
            "Evaluating '{}' x{} with {} ({} slices)",
            dataset.name(), scale, self.model.name(), total
        );

        let mut rng      = rand::thread_rng();
        let mut psnr_sum = 0.0f64;
        let mut volume: Option<Array3<u8>> = None;
        let mut timer    = Timer::new();

        for idx in 0..total {
            let sample = dataset
                .get_item(idx, &mut rng)
                .with_context(|| format!("Cannot load slice {idx} of '{}'", dataset.name()))?;
            let z = dataset.resolve_physical_index(idx)?;

            let batch = self.batcher.batch(vec![sample]);
            timer.tic();
            let sr = self.model.upscale(batch.lr, scale);
            timer.hold();
            let sr = quantize(sr, self.rgb_range);

            let psnr = calc_psnr(sr.clone(), batch.hr, scale, self.rgb_range, self.benchmark)?;
            tracing::debug!("'{}' x{} slice {}: {:.3} dB", dataset.name(), scale, z, psnr);
            psnr_sum += psnr;

            if self.keep_results {
                store_slice(&mut volume, sr, z, dataset.num_slices(), self.rgb_range)?;
            }
        }

        let psnr          = if total > 0 { psnr_sum / total as f64 } else { f64::NAN };
        let model_seconds = timer.release();
        tracing::info!("[{} x{}]\tPSNR: {:.3} (model {:.2}s)", dataset.name(), scale, psnr, model_seconds);

        Ok(EvalReport {
            dataset: dataset.name().to_string(),
            scale,
            psnr,
            slices: total,
            model_seconds,
            sr_volume: volume,
        })
    }
}

/// Write the first channel of a [1, C, H, W] SR batch into slice `z`.
fn store_slice<B: Backend>(
    volume:    &mut Option<Array3<u8>>,
    sr:        Tensor<B, 4>,
    z:         usize,
    depth:     usize,
    rgb_range: f64,
) -> Result<()> {
    let [_, _, h, w] = sr.dims();
    let values: Vec<f32> = sr
        .slice([0..1, 0..1, 0..h, 0..w])
        .into_data()
        .to_vec()
        .map_err(|e| anyhow::anyhow!("Cannot read SR tensor: {e:?}"))?;

    let to_byte = 255.0 / rgb_range as f32;
    let bytes: Vec<u8> = values
        .iter()
        .map(|&v| (v * to_byte).round().clamp(0.0, 255.0) as u8)
        .collect();
    let plane = Array2::from_shape_vec((h, w), bytes)?;

    let vol = volume.get_or_insert_with(|| Array3::zeros((h, w, depth)));
    if vol.dim().0 != h || vol.dim().1 != w {
        anyhow::bail!("SR slice {z} is {h}x{w}, volume is {}x{}", vol.dim().0, vol.dim().1);
    }
    vol.index_axis_mut(Axis(2), z).assign(&plane);
    Ok(())
}
