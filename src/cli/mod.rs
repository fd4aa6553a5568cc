// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Entry point for all user interaction, parsed with clap.
// All work is delegated to Layer 2 (application).
//
// Two commands are supported:
//   1. `inspect`  — runs the training data loader for a few
//                   batches and prints what it produces
//   2. `baseline` — scores nearest-neighbour upscaling on the
//                   test datasets and records PSNR

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{BaselineArgs, Commands, InspectArgs};

use crate::data::loader::RawVolumeLoader;

#[derive(Parser, Debug)]
#[command(
    name = "oabreast-sr",
    version = "0.1.0",
    about = "Volumetric super-resolution data pipeline for OA breast scans."
)]
pub struct Cli {
    /// The subcommand to run (inspect or baseline)
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Match on the subcommand and dispatch to the correct use case.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Inspect(args)  => run_inspect(args),
            Commands::Baseline(args) => run_baseline(args),
        }
    }
}

/// Handles the `inspect` subcommand.
fn run_inspect(args: InspectArgs) -> Result<()> {
    use crate::application::inspect_use_case::InspectUseCase;

    let config = args.run.into_config()?;
    let source = RawVolumeLoader::new(&config.dir_data);
    tracing::info!("Inspecting training data in: {}", config.dir_data);

    let report = InspectUseCase::new(config, source, args.batches).execute()?;

    println!("\nDatasets:");
    for d in &report.datasets {
        println!(
            "  {:<20} slices={:<5} repeat={:<4} samples={}",
            d.name, d.slices, d.repeat, d.length
        );
    }
    println!("\nBatches:");
    for b in &report.batches {
        println!(
            "  x{} LR {:?} [{:.2}, {:.2}]  HR {:?} [{:.2}, {:.2}]",
            b.scale, b.lr_dims, b.lr_range.min, b.lr_range.max,
            b.hr_dims, b.hr_range.min, b.hr_range.max
        );
    }
    Ok(())
}

/// Handles the `baseline` subcommand.
fn run_baseline(args: BaselineArgs) -> Result<()> {
    use crate::application::baseline_use_case::BaselineUseCase;

    let config = args.run.into_config()?;
    let source = RawVolumeLoader::new(&config.dir_data);
    let exp    = config.experiment_dir.clone();

    let records = BaselineUseCase::new(config, source).execute()?;

    println!();
    for r in &records {
        println!("[{} x{}]\tPSNR: {:.3} dB", r.dataset, r.scale, r.psnr);
    }
    println!("Results written to '{exp}'.");
    Ok(())
}
