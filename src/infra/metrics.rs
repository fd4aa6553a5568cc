// ============================================================
// Layer 6 — Metrics Logger
// ============================================================
// Records one PSNR row per (dataset, scale) evaluation to a CSV
// file so runs can be compared and plotted later.
//
// Output file: <experiment>/metrics.csv
//
//   run,model,dataset,scale,psnr,slices,seconds
//   1,nearest,OABreast_07_test,2,31.204511,400,12.530000
//   ...
//
// The file is appended to, never truncated, so repeated runs in
// the same experiment directory build up a history.

use anyhow::{Context, Result};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};
use serde::{Deserialize, Serialize};

const HEADER: &str = "run,model,dataset,scale,psnr,slices,seconds";

/// One row of metrics for a single (dataset, scale) evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PsnrRecord {
    /// Run counter within the experiment (starts at 1)
    pub run: usize,

    /// Name of the super-resolver that produced the SR output
    pub model: String,

    pub dataset: String,

    pub scale: usize,

    /// Mean PSNR over all slices, in dB. Higher is better.
    pub psnr: f64,

    pub slices: usize,

    /// Wall-clock time spent on this evaluation
    pub seconds: f64,
}

/// Appends PSNR rows to a CSV file.
pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Create the logger, writing the CSV header if the file is new.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)
            .with_context(|| format!("Cannot create metrics directory '{}'", dir.display()))?;

        let csv_path = dir.join("metrics.csv");
        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)
                .with_context(|| format!("Cannot create '{}'", csv_path.display()))?;
            writeln!(f, "{HEADER}")?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    /// Append one row.
    pub fn log(&self, m: &PsnrRecord) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)
            .with_context(|| format!("Cannot open '{}'", self.csv_path.display()))?;

        writeln!(
            f,
            "{},{},{},{},{:.6},{},{:.6}",
            m.run, m.model, m.dataset, m.scale, m.psnr, m.slices, m.seconds,
        )?;

        tracing::debug!("Logged {} x{}: psnr={:.4}", m.dataset, m.scale, m.psnr);
        Ok(())
    }

    /// Number of the next run: one past the highest run already logged.
    pub fn next_run(&self) -> Result<usize> {
        let text = fs::read_to_string(&self.csv_path)
            .with_context(|| format!("Cannot read '{}'", self.csv_path.display()))?;
        let last = text
            .lines()
            .skip(1)
            .filter_map(|line| line.split(',').next()?.parse::<usize>().ok())
            .max()
            .unwrap_or(0);
        Ok(last + 1)
    }
}
