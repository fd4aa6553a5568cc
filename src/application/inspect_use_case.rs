// ============================================================
// Layer 2 — InspectUseCase
// ============================================================
// Dry run of the training data pipeline, without a model:
//
//   Step 1: Load every training pair once   (Layer 4 - data)
//   Step 2: Per scale, build the datasets   (Layer 4 - data)
//           and chain them in a collection
//   Step 3: Wrap in Burn's DataLoader       (Layer 4 - data)
//   Step 4: Pull a few batches and report
//           shapes and value ranges
//
// Useful to check patch geometry, repeat and normalisation on
// real volumes before committing to a long training run.

use anyhow::{Context, Result};
use burn::{data::dataloader::DataLoaderBuilder, prelude::*};

use crate::application::config::SrConfig;
use crate::data::{
    batcher::SrBatcher,
    collection::PairDatasetCollection,
    dataset::{Phase, VolumetricPairDataset},
};
use crate::domain::{subject::DatasetName, traits::VolumeSource, volume::VolumePair};
use crate::ml::{default_device, EvalBackend};

/// Min / max / mean of one tensor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueRange {
    pub min:  f64,
    pub max:  f64,
    pub mean: f64,
}

impl ValueRange {
    fn of<B: Backend>(t: &Tensor<B, 4>) -> Self {
        Self {
            min:  t.clone().min().into_scalar().elem::<f64>(),
            max:  t.clone().max().into_scalar().elem::<f64>(),
            mean: t.clone().mean().into_scalar().elem::<f64>(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BatchSummary {
    pub scale:    usize,
    pub lr_dims:  [usize; 4],
    pub hr_dims:  [usize; 4],
    pub lr_range: ValueRange,
    pub hr_range: ValueRange,
}

#[derive(Debug, Clone)]
pub struct DatasetSummary {
    pub name:   String,
    pub slices: usize,
    pub repeat: usize,
    pub length: usize,
}

#[derive(Debug, Clone, Default)]
pub struct InspectReport {
    pub datasets: Vec<DatasetSummary>,
    pub batches:  Vec<BatchSummary>,
}

pub struct InspectUseCase<S> {
    config:  SrConfig,
    source:  S,
    batches: usize,
}

impl<S: VolumeSource> InspectUseCase<S> {
    pub fn new(config: SrConfig, source: S, batches: usize) -> Self {
        Self { config, source, batches }
    }

    pub fn execute(&self) -> Result<InspectReport> {
        let cfg = &self.config;
        cfg.validate()?;

        // ── Step 1: Load all training volumes once ───────────────────────────
        let mut pairs: Vec<(String, VolumePair)> = Vec::with_capacity(cfg.data_train.len());
        for name in &cfg.data_train {
            let parsed = DatasetName::parse(name)?;
            let pair   = self
                .source
                .load_pair(&parsed, &cfg.scale)
                .with_context(|| format!("Cannot load training data '{name}'"))?;
            pairs.push((name.clone(), pair));
        }

        let opts       = cfg.dataset_options(Phase::Train);
        let mut report = InspectReport::default();

        for (scale_index, &scale) in cfg.scale.iter().enumerate() {
            // ── Step 2: Datasets for this scale ──────────────────────────────
            let mut members = Vec::with_capacity(pairs.len());
            for (name, pair) in &pairs {
                let mut ds = VolumetricPairDataset::new(name.clone(), pair.clone(), &opts)?;
                ds.set_active_scale(scale_index)?;
                if scale_index == 0 {
                    report.datasets.push(DatasetSummary {
                        name:   name.clone(),
                        slices: ds.num_slices(),
                        repeat: ds.repeat(),
                        length: ds.length(),
                    });
                }
                members.push(ds);
            }
            let collection = PairDatasetCollection::new(members);
            tracing::info!("x{}: {} training samples", scale, collection.length());

            // ── Step 3: Burn DataLoader ──────────────────────────────────────
            let batcher = SrBatcher::<EvalBackend>::new(default_device());
            let loader  = DataLoaderBuilder::new(batcher)
                .batch_size(cfg.batch_size)
                .shuffle(cfg.seed)
                .num_workers(cfg.num_workers.max(1))
                .build(collection);

            // ── Step 4: Summarise a few batches ──────────────────────────────
            for (i, batch) in loader.iter().take(self.batches).enumerate() {
                let summary = BatchSummary {
                    scale,
                    lr_dims:  batch.lr.dims(),
                    hr_dims:  batch.hr.dims(),
                    lr_range: ValueRange::of(&batch.lr),
                    hr_range: ValueRange::of(&batch.hr),
                };
                tracing::info!(
                    "x{} batch {}: LR {:?} [{:.2}, {:.2}] mean {:.2} | HR {:?} [{:.2}, {:.2}] mean {:.2}",
                    scale, i,
                    summary.lr_dims, summary.lr_range.min, summary.lr_range.max, summary.lr_range.mean,
                    summary.hr_dims, summary.hr_range.min, summary.hr_range.max, summary.hr_range.mean,
                );
                tracing::debug!("x{} batch {} drew samples {:?}", scale, i, batch.indices);
                report.batches.push(summary);
            }
        }

        Ok(report)
    }
}
