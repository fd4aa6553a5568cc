// ============================================================
// Layer 2 — BaselineUseCase
// ============================================================
// Scores the nearest-neighbour upscaler on every test dataset at
// every scale, giving the PSNR floor a learned model has to beat:
//
//   Step 1: Prepare experiment directory   (Layer 6 - infra)
//   Step 2: Save config                    (Layer 6 - infra)
//   Step 3: Per test dataset, load the
//           volumes and build an eval set  (Layer 4 - data)
//   Step 4: Per scale, run the evaluator   (Layer 5 - ml)
//   Step 5: Log PSNR to log.txt and CSV,
//           optionally write the SR volume (Layer 6 - infra)

use anyhow::{Context, Result};

use crate::application::config::SrConfig;
use crate::data::dataset::{Phase, VolumetricPairDataset};
use crate::domain::traits::VolumeSource;
use crate::infra::{
    experiment::{save_results_dat, ExperimentDir},
    metrics::{MetricsLogger, PsnrRecord},
    timer::Timer,
};
use crate::ml::{
    default_device,
    evaluator::Evaluator,
    upscaler::NearestUpscaler,
    EvalBackend,
};

pub struct BaselineUseCase<S> {
    config: SrConfig,
    source: S,
}

impl<S: VolumeSource> BaselineUseCase<S> {
    pub fn new(config: SrConfig, source: S) -> Self {
        Self { config, source }
    }

    /// Run the evaluation and return one record per (dataset, scale).
    pub fn execute(&self) -> Result<Vec<PsnrRecord>> {
        let cfg = &self.config;
        cfg.validate()?;

        // ── Step 1 + 2: Experiment directory and config ──────────────────────
        let exp = ExperimentDir::new(&cfg.experiment_dir, &cfg.data_test)?;
        exp.save_config(cfg)?;
        let metrics = MetricsLogger::new(exp.path())?;
        let run     = metrics.next_run()?;

        let evaluator = Evaluator::<EvalBackend, _>::new(NearestUpscaler, default_device(), f64::from(cfg.rgb_range))
            .with_benchmark(cfg.benchmark)
            .with_keep_results(cfg.save_results);
        let model = evaluator.model_name().to_string();

        exp.write_log(&format!("Evaluation (run {run}, model {model}):"))?;

        let opts        = cfg.dataset_options(Phase::Eval);
        let mut records = Vec::with_capacity(cfg.data_test.len() * cfg.scale.len());
        let mut timer   = Timer::new();

        for name in &cfg.data_test {
            // ── Step 3: Evaluation dataset ───────────────────────────────────
            let mut dataset = VolumetricPairDataset::from_source(&self.source, name, &cfg.scale, &opts)
                .with_context(|| format!("Cannot load test data '{name}'"))?;

            for scale_index in 0..cfg.scale.len() {
                // ── Step 4: Evaluate ─────────────────────────────────────────
                timer.tic();
                let report = evaluator.evaluate(&mut dataset, scale_index)?;
                let seconds = timer.toc(false);

                // ── Step 5: Record ───────────────────────────────────────────
                exp.write_log(&format!(
                    "[{} x{}]\tPSNR: {:.3} ({} slices, {:.2}s, model {:.2}s)",
                    report.dataset, report.scale, report.psnr, report.slices, seconds, report.model_seconds
                ))?;

                let record = PsnrRecord {
                    run,
                    model:   model.clone(),
                    dataset: report.dataset.clone(),
                    scale:   report.scale,
                    psnr:    report.psnr,
                    slices:  report.slices,
                    seconds,
                };
                metrics.log(&record)?;

                if let Some(volume) = &report.sr_volume {
                    let path = exp.results_path(&report.dataset, report.scale);
                    save_results_dat(&path, volume)?;
                    exp.write_log(&format!("Saved SR volume to '{}'", path.display()))?;
                }

                records.push(record);
            }
        }

        Ok(records)
    }
}
